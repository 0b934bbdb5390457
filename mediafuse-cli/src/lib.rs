pub mod args;
pub mod commands;
pub mod context;
pub mod handlers;
pub mod output;
pub mod utils;

pub use context::MediaFuseCliContext;
pub use output::{
    CliColors, error_code, error_json, format_error, format_info, format_score, format_success,
    format_warning, output_error_json, print_config, print_object_ranking, print_paths,
    print_rank_report, print_replay_summary, print_segment_ranking,
};
pub use utils::{check_containers, open_input, parse_weight};
