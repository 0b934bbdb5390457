use crate::args::OutputFormat;
use crate::handlers::{RankReport, ReplaySummary};
use colored::*;
use mediafuse::FusionError;
use mediafuse::config::MediaFuseConfig;
use mediafuse::prelude::{PathMatch, RankedObject, RankedSegment, ResultSet, is_unscored};
use serde_json::json;

pub struct CliColors;

impl CliColors {
    pub fn success() -> Color {
        Color::TrueColor {
            r: 34,
            g: 197,
            b: 94,
        }
    }

    pub fn error() -> Color {
        Color::TrueColor {
            r: 239,
            g: 68,
            b: 68,
        }
    }

    pub fn warning() -> Color {
        Color::TrueColor {
            r: 245,
            g: 158,
            b: 11,
        }
    }

    pub fn info() -> Color {
        Color::TrueColor {
            r: 59,
            g: 130,
            b: 246,
        }
    }

    pub fn muted() -> Color {
        Color::TrueColor {
            r: 148,
            g: 163,
            b: 184,
        }
    }

    pub fn primary() -> Color {
        Color::White
    }

    pub fn accent() -> Color {
        Color::TrueColor {
            r: 168,
            g: 85,
            b: 247,
        }
    }
}

/// Stable machine-readable code of an error
pub fn error_code(error: &FusionError) -> &'static str {
    match error {
        FusionError::EmptyQueryContainers => "EMPTY_QUERY_CONTAINERS",
        FusionError::UnorderedQueryContainers { .. } => "UNORDERED_QUERY_CONTAINERS",
        FusionError::InvalidSegmentBounds { .. } => "INVALID_SEGMENT_BOUNDS",
        FusionError::InconsistentSegment { .. } => "INCONSISTENT_SEGMENT",
        FusionError::InvalidScore { .. } => "INVALID_SCORE",
        FusionError::InvalidIdentifier(_) => "INVALID_IDENTIFIER",
        FusionError::InvalidWeight { .. } => "INVALID_WEIGHT",
        FusionError::Configuration(_) => "CONFIGURATION_ERROR",
        FusionError::Logging(_) => "LOGGING_ERROR",
        FusionError::Io(_) => "IO_ERROR",
        FusionError::Parse(_) => "PARSE_ERROR",
        FusionError::Other(_) => "OTHER_ERROR",
    }
}

/// Build the structured JSON form of an error
pub fn error_json(error: &FusionError) -> serde_json::Value {
    let details = match error {
        FusionError::UnorderedQueryContainers { previous, next } => Some(json!({
            "previous": previous,
            "next": next,
            "hint": "Pass the query container ids in increasing order, e.g. --containers 1,2,3"
        })),
        FusionError::InvalidSegmentBounds {
            segment_id,
            startabs,
            endabs,
        } => Some(json!({
            "segment_id": segment_id,
            "startabs": startabs,
            "endabs": endabs
        })),
        FusionError::InconsistentSegment { segment_id, .. } => Some(json!({
            "segment_id": segment_id
        })),
        FusionError::InvalidScore {
            segment_id, field, ..
        } => Some(json!({
            "segment_id": segment_id,
            "field": field
        })),
        FusionError::InvalidWeight { category, weight } => Some(json!({
            "category": category,
            "weight": weight
        })),
        _ => None,
    };

    let mut error_response = json!({
        "error": true,
        "code": error_code(error),
        "message": error.to_string(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    });

    if let Some(details) = details {
        error_response["details"] = details;
    }
    error_response
}

/// Report an error on stderr in the requested output format
pub fn output_error_json(error: &FusionError, output_format: OutputFormat) {
    match output_format {
        OutputFormat::Json => eprintln!(
            "{}",
            serde_json::to_string_pretty(&error_json(error)).unwrap_or_else(|_| "{}".to_string())
        ),
        OutputFormat::Table => eprintln!("{}", format_error(&error.to_string())),
    }
}

pub fn format_success(msg: &str) -> String {
    format!(
        "{} {}",
        "✓".color(CliColors::success()).bold(),
        msg.color(CliColors::success())
    )
}

pub fn format_error(msg: &str) -> String {
    format!(
        "{} {}",
        "✗".color(CliColors::error()).bold(),
        msg.color(CliColors::error())
    )
}

pub fn format_warning(msg: &str) -> String {
    format!(
        "{} {}",
        "⚠".color(CliColors::warning()).bold(),
        msg.color(CliColors::warning())
    )
}

pub fn format_info(msg: &str) -> String {
    format!(
        "{} {}",
        "ℹ".color(CliColors::info()).bold(),
        msg.color(CliColors::info())
    )
}

/// Score column text, with a dash for unscored entries
pub fn format_score(score: f64) -> ColoredString {
    if is_unscored(score) {
        return "-".color(CliColors::muted());
    }
    let text = format!("{:.4}", score);
    if score >= 0.75 {
        text.color(CliColors::success()).bold()
    } else if score >= 0.25 {
        text.color(CliColors::primary())
    } else {
        text.color(CliColors::muted())
    }
}

/// Shorten `text` to at most `max` characters
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let kept: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        text.to_string()
    }
}

pub fn print_rank_report(report: &RankReport) {
    println!(
        "{}",
        "━━━ Fusion Ranking ━━━".color(CliColors::accent()).bold()
    );
    println!(
        "{}: {}",
        "Strategy".color(CliColors::muted()),
        report.strategy.to_string().color(CliColors::accent()).bold()
    );
    println!(
        "{}: {}",
        "Query containers".color(CliColors::muted()),
        report
            .query_containers
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(" → ")
    );
    println!(
        "{}: {} records, {} objects, {} segments",
        "Stream".color(CliColors::muted()),
        report.stream.records,
        report.stream.new_objects,
        report.stream.new_segments
    );
    println!();

    if let Some(objects) = &report.objects {
        print_object_ranking(objects);
    }
    if let Some(segments) = &report.segments {
        print_segment_ranking(segments);
    }
    if !report.paths.is_empty() {
        println!();
        print_paths(&report.paths);
    }
}

pub fn print_object_ranking(objects: &[RankedObject]) {
    if objects.is_empty() {
        println!("{}", format_info("No scored objects."));
        return;
    }

    println!(
        "{:<6} {:<40} {:<10} {}",
        "Rank".color(CliColors::muted()).bold(),
        "Object".color(CliColors::muted()).bold(),
        "Score".color(CliColors::muted()).bold(),
        "Segments".color(CliColors::muted()).bold()
    );
    println!("{}", "─".repeat(66).color(CliColors::muted()));

    for object in objects {
        println!(
            "{:<6} {:<40} {:<10} {}",
            object.rank,
            truncate(&object.object_id, 40).color(CliColors::accent()),
            format_score(object.score),
            object.segment_count.to_string().color(CliColors::muted())
        );
    }
}

pub fn print_segment_ranking(segments: &[RankedSegment]) {
    if segments.is_empty() {
        println!("{}", format_info("No scored segments."));
        return;
    }

    println!(
        "{:<6} {:<28} {:<24} {:<10} {}",
        "Rank".color(CliColors::muted()).bold(),
        "Segment".color(CliColors::muted()).bold(),
        "Object".color(CliColors::muted()).bold(),
        "Score".color(CliColors::muted()).bold(),
        "Time".color(CliColors::muted()).bold()
    );
    println!("{}", "─".repeat(86).color(CliColors::muted()));

    for segment in segments {
        println!(
            "{:<6} {:<28} {:<24} {:<10} {}",
            segment.rank,
            truncate(&segment.segment_id, 28).color(CliColors::accent()),
            truncate(&segment.object_id, 24),
            format_score(segment.score),
            format!("{:.1}s–{:.1}s", segment.startabs, segment.endabs).color(CliColors::muted())
        );
    }
}

pub fn print_paths(paths: &[PathMatch]) {
    println!("{}", "Temporal paths".color(CliColors::accent()).bold());
    for path in paths {
        println!(
            "{} {}",
            path.object_id.color(CliColors::accent()),
            format!("({:.4})", path.score).color(CliColors::muted())
        );
        let last = path.steps.len().saturating_sub(1);
        for (i, step) in path.steps.iter().enumerate() {
            let branch = if i == last { "└─" } else { "├─" };
            println!(
                "  {} [{}] {} {} {}",
                branch.color(CliColors::muted()),
                step.container_id,
                step.segment_id,
                format!("{:.1}s–{:.1}s", step.startabs, step.endabs).color(CliColors::muted()),
                format_score(step.score)
            );
        }
    }
}

pub fn print_replay_summary(summary: &ReplaySummary, results: &ResultSet, categories: &[&str]) {
    println!(
        "{}",
        "━━━ Score Stream ━━━".color(CliColors::accent()).bold()
    );
    println!("{}: {}", "Records".color(CliColors::muted()), summary.records);
    println!("{}: {}", "Applied".color(CliColors::muted()), summary.applied);
    println!(
        "{}: {} ({} segments)",
        "Objects".color(CliColors::muted()),
        results.len(),
        results.segment_count()
    );
    println!(
        "{}: {} merged, {} refined",
        "Updates".color(CliColors::muted()),
        summary.merged,
        summary.refined
    );
    if !categories.is_empty() {
        println!(
            "{}: {}",
            "Categories".color(CliColors::muted()),
            categories.join(", ").color(CliColors::info())
        );
    }
    println!();

    if summary.is_clean() {
        println!("{}", format_success("All records applied."));
        return;
    }

    println!(
        "{}",
        format_warning(&format!("{} records rejected:", summary.issues.len()))
    );
    for issue in &summary.issues {
        println!(
            "  {} {}",
            format!("line {}:", issue.line).color(CliColors::muted()),
            issue.message
        );
    }
}

pub fn print_config(config: &MediaFuseConfig) {
    println!(
        "{}",
        "━━━ Configuration ━━━".color(CliColors::accent()).bold()
    );

    let fusion = &config.fusion;
    println!("{}", "fusion".color(CliColors::info()).bold());
    println!("  {}: {}", "strategy".color(CliColors::muted()), fusion.strategy);
    println!(
        "  {}: {}",
        "temporal_distance_cap_secs".color(CliColors::muted()),
        fusion.temporal_distance_cap_secs
    );
    println!(
        "  {}: {}",
        "object_aggregation".color(CliColors::muted()),
        fusion.object_aggregation
    );
    println!(
        "  {}: {}",
        "default_category_weight".color(CliColors::muted()),
        fusion.default_category_weight
    );

    println!("{}", "ranking".color(CliColors::info()).bold());
    println!(
        "  {}: {}",
        "limit".color(CliColors::muted()),
        config
            .ranking
            .limit
            .map(|limit| limit.to_string())
            .unwrap_or_else(|| "none".to_string())
    );
    println!(
        "  {}: {}",
        "include_unscored".color(CliColors::muted()),
        config.ranking.include_unscored
    );

    let logging = &config.logging;
    println!("{}", "logging".color(CliColors::info()).bold());
    println!("  {}: {}", "level".color(CliColors::muted()), logging.level);
    println!("  {}: {:?}", "format".color(CliColors::muted()), logging.format);
    println!(
        "  {}: {}",
        "file".color(CliColors::muted()),
        logging
            .file
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "none".to_string())
    );
    println!("  {}: {}", "stdout".color(CliColors::muted()), logging.stdout);
}
