//! Command enum definitions

use crate::args::*;
use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Display version information
    Version,

    /// Replay a score stream and print the fused ranking
    #[command(
        long_about = r#"
Replay a recorded score stream through the fusion engine and print the ranking.

The stream holds one JSON object per line:
  {"object_id":"v1","segment_id":"v1_3","container_id":2,"category":"color",
   "value":0.75,"startabs":4.0,"endabs":6.5}

With the temporal strategy, an object is scored by the best sequence of its
segments that matches the query containers in order, with at most 30 seconds
(configurable) between consecutive segments.

EXAMPLES:
  # Rank objects for a three-part query
  mediafuse-cli rank --input scores.jsonl --containers 1,2,3

  # Per-segment ranking, edge features weighted twice as much
  mediafuse-cli rank -i scores.jsonl -c 1,2 --weight edge=2 --segments

  # Score each segment on its own
  mediafuse-cli rank -i scores.jsonl -c 1 --strategy default --output json
"#
    )]
    Rank(RankArgs),

    /// Ingest a score stream and report problems without ranking
    Validate(ValidateArgs),

    /// Print the effective configuration
    Config(ConfigArgs),

    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}
