//! Validate command handler

use crate::args::{OutputFormat, ValidateArgs};
use crate::context::MediaFuseCliContext;
use crate::handlers::replay::replay_stream;
use crate::output::*;
use crate::utils::open_input;
use mediafuse::FusionError;
use mediafuse::prelude::QuerySession;
use serde_json::json;

pub fn handle_validate_command(
    args: ValidateArgs,
    ctx: &MediaFuseCliContext,
    output_format: OutputFormat,
) -> mediafuse::Result<()> {
    let reader = open_input(&args.input)?;

    // Container ids play no part in ingestion
    let mut session = QuerySession::new(&ctx.config, vec![1])?;
    let summary = replay_stream(&mut session, reader, false)?;
    let categories: Vec<&str> = session.results().categories_seen().collect();

    match output_format {
        OutputFormat::Json => {
            let report = json!({
                "valid": summary.is_clean(),
                "objects": session.results().len(),
                "segments": session.results().segment_count(),
                "categories": categories,
                "summary": summary,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Table => print_replay_summary(&summary, session.results(), &categories),
    }

    if summary.is_clean() {
        Ok(())
    } else {
        Err(FusionError::Parse(format!(
            "{} of {} records could not be applied",
            summary.issues.len(),
            summary.records
        )))
    }
}
