use clap::{CommandFactory, Parser};
use is_terminal::IsTerminal;
use mediafuse_cli::args::OutputFormat;
use mediafuse_cli::commands::Commands;
use mediafuse_cli::handlers::*;
use mediafuse_cli::{MediaFuseCliContext, output_error_json};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

#[derive(Parser)]
#[command(name = "mediafuse-cli")]
#[command(about = "Fuse and rank multimedia retrieval scores", long_about = None)]
#[command(version = mediafuse::VERSION)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format - use json for tool integration
    #[arg(long, short, value_enum, default_value_t = OutputFormat::Table, global = true)]
    output: OutputFormat,

    /// Verbose output (debug level logging)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Quiet mode (suppress all logging output)
    #[arg(long, short, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    let cli_args = Cli::parse();
    let output_format = cli_args.output;

    // JSON output stays machine readable, so logging drops to errors only
    let log_level = if cli_args.quiet || output_format == OutputFormat::Json {
        Level::ERROR
    } else if cli_args.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    match run(cli_args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output_error_json(&e, output_format);
            ExitCode::FAILURE
        }
    }
}

fn run(cli_args: Cli) -> mediafuse::Result<()> {
    let output_format = cli_args.output;

    match cli_args.command {
        Commands::Version => {
            println!("mediafuse CLI v{}", mediafuse::VERSION);
        }

        Commands::Completions(args) => {
            let mut cmd = Cli::command();
            let shell: clap_complete::Shell = args.shell.into();
            clap_complete::generate(shell, &mut cmd, "mediafuse-cli", &mut std::io::stdout());
        }

        Commands::Rank(args) => {
            let ctx = MediaFuseCliContext::new(cli_args.config.as_deref())?;
            handle_rank_command(args, &ctx, output_format)?;
        }

        Commands::Validate(args) => {
            let ctx = MediaFuseCliContext::new(cli_args.config.as_deref())?;
            handle_validate_command(args, &ctx, output_format)?;
        }

        Commands::Config(args) => {
            let ctx = MediaFuseCliContext::new(cli_args.config.as_deref())?;
            handle_config_command(args, &ctx, output_format)?;
        }
    }

    Ok(())
}
