//! Command handlers for the mediafuse CLI

pub mod config;
pub mod rank;
pub mod replay;
pub mod validate;

pub use config::handle_config_command;
pub use rank::{RankReport, build_ranking, handle_rank_command};
pub use replay::{ReplaySummary, StreamIssue, replay_stream};
pub use validate::handle_validate_command;
