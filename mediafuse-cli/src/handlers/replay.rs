//! Replaying JSON-lines score streams into a query session

use mediafuse::FusionError;
use mediafuse::prelude::{IngestOutcome, QuerySession, ScoreUpdate};
use serde::Serialize;
use std::io::BufRead;
use tracing::{debug, warn};

/// A stream record that could not be applied
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StreamIssue {
    /// 1-based line number
    pub line: usize,
    pub message: String,
}

/// Counts gathered while replaying a stream
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Non-blank lines read
    pub records: usize,
    pub applied: usize,
    pub new_objects: usize,
    pub new_segments: usize,
    pub merged: usize,
    pub refined: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<StreamIssue>,
}

impl ReplaySummary {
    fn record(&mut self, outcome: IngestOutcome) {
        self.applied += 1;
        match outcome {
            IngestOutcome::NewObject => {
                self.new_objects += 1;
                self.new_segments += 1;
            }
            IngestOutcome::NewSegment => self.new_segments += 1,
            IngestOutcome::Merged => self.merged += 1,
            IngestOutcome::Refined => self.refined += 1,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Apply every record of `reader` to `session`
///
/// Blank lines and lines starting with `#` are ignored. In strict mode the
/// first bad record aborts the replay; otherwise bad records are collected
/// as [`StreamIssue`]s and the rest of the stream is still applied.
pub fn replay_stream<R: BufRead>(
    session: &mut QuerySession,
    reader: R,
    strict: bool,
) -> mediafuse::Result<ReplaySummary> {
    let mut summary = ReplaySummary::default();

    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line?;
        let record = line.trim();
        if record.is_empty() || record.starts_with('#') {
            continue;
        }
        summary.records += 1;

        let applied = serde_json::from_str::<ScoreUpdate>(record)
            .map_err(|e| FusionError::Parse(format!("line {}: {}", line_number, e)))
            .and_then(|update| session.apply_score(update));

        match applied {
            Ok(outcome) => summary.record(outcome),
            Err(e) if strict => return Err(e),
            Err(e) => {
                warn!(line = line_number, error = %e, "Skipping score record");
                summary.issues.push(StreamIssue {
                    line: line_number,
                    message: e.to_string(),
                });
            }
        }
    }

    debug!(
        records = summary.records,
        applied = summary.applied,
        issues = summary.issues.len(),
        "Replayed score stream"
    );
    Ok(summary)
}
