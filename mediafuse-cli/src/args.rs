//! Command argument definitions

use clap::Args;
use mediafuse::fusion::FusionStrategy;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct RankArgs {
    /// Score stream with one JSON score update per line ("-" for stdin)
    #[arg(long, short, default_value = "-")]
    pub input: String,

    /// Ordered query container ids, comma separated (e.g. 1,2,3)
    #[arg(long, short, value_delimiter = ',', required = true)]
    pub containers: Vec<i64>,

    /// Fusion strategy (overrides the configuration)
    #[arg(long, short, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Category weight as category=weight, may be repeated
    #[arg(long = "weight", short = 'w', value_name = "CATEGORY=WEIGHT")]
    pub weights: Vec<String>,

    /// Maximum number of ranked entries
    #[arg(long, short)]
    pub limit: Option<usize>,

    /// Rank segments instead of objects
    #[arg(long)]
    pub segments: bool,

    /// Include entries without score data
    #[arg(long)]
    pub include_unscored: bool,

    /// Show the matched temporal path of each ranked object
    #[arg(long, conflicts_with = "segments")]
    pub paths: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Score stream with one JSON score update per line ("-" for stdin)
    #[arg(long, short, default_value = "-")]
    pub input: String,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Write the effective configuration to this file instead of stdout
    #[arg(long)]
    pub write: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct CompletionsArgs {
    /// Shell type
    #[arg(value_enum)]
    pub shell: Shell,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    #[clap(name = "powershell")]
    Power,
    Elvish,
}

impl From<Shell> for clap_complete::Shell {
    fn from(shell: Shell) -> Self {
        match shell {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::Power => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyArg {
    Default,
    Temporal,
}

impl From<StrategyArg> for FusionStrategy {
    fn from(strategy: StrategyArg) -> Self {
        match strategy {
            StrategyArg::Default => FusionStrategy::Default,
            StrategyArg::Temporal => FusionStrategy::Temporal,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}
