//! Integration tests for the mediafuse CLI
//!
//! These drive the command handlers the binary dispatches to:
//! - ranking of a recorded stream under both strategies
//! - command-line overrides of the loaded configuration
//! - stream validation and error reporting
//! - configuration loading from files

use mediafuse::FusionError;
use mediafuse::prelude::*;
use mediafuse_cli::MediaFuseCliContext;
use mediafuse_cli::args::{RankArgs, StrategyArg};
use mediafuse_cli::handlers::{build_ranking, replay_stream};
use mediafuse_cli::output::{error_code, error_json};
use std::fs;
use tempfile::TempDir;

const STREAM: &str = include_str!("fixtures/scores.jsonl");

fn rank_args(containers: Vec<i64>) -> RankArgs {
    RankArgs {
        input: "-".to_string(),
        containers,
        strategy: None,
        weights: Vec::new(),
        limit: None,
        segments: false,
        include_unscored: false,
        paths: false,
    }
}

fn config() -> MediaFuseConfig {
    ConfigBuilder::testing().build().expect("Failed to build config")
}

#[test]
fn test_rank_objects_temporal() {
    let report = build_ranking(&rank_args(vec![1, 2]), &config(), STREAM.as_bytes()).unwrap();

    assert_eq!(report.strategy, FusionStrategy::Temporal);
    assert_eq!(report.stream.records, 5);
    assert!(report.segments.is_none());

    let objects = report.objects.unwrap();
    assert_eq!(objects[0].object_id, "video_a");
    assert!((objects[0].score - 0.8).abs() < 1e-12);
    assert_eq!(objects[1].object_id, "video_b");
    assert!((objects[1].score - 0.5).abs() < 1e-12);
}

#[test]
fn test_rank_strategy_override() {
    let mut args = rank_args(vec![1, 2]);
    args.strategy = Some(StrategyArg::Default);

    let report = build_ranking(&args, &config(), STREAM.as_bytes()).unwrap();
    assert_eq!(report.strategy, FusionStrategy::Default);
    let objects = report.objects.unwrap();
    assert_eq!(objects[0].object_id, "video_b");
    assert_eq!(objects[0].score, 1.0);
}

#[test]
fn test_rank_weights_and_limit() {
    let mut args = rank_args(vec![1, 2]);
    args.weights = vec!["edge=3".to_string()];
    args.limit = Some(1);

    let report = build_ranking(&args, &config(), STREAM.as_bytes()).unwrap();
    let objects = report.objects.unwrap();
    assert_eq!(objects.len(), 1);
    // video_a_2 becomes (0.8 + 3 * 0.6) / 4
    assert!((objects[0].score - (0.9 + 0.65) / 2.0).abs() < 1e-12);
}

#[test]
fn test_rank_segments() {
    let mut args = rank_args(vec![1, 2]);
    args.segments = true;

    let report = build_ranking(&args, &config(), STREAM.as_bytes()).unwrap();
    assert!(report.objects.is_none());
    let segments = report.segments.unwrap();
    assert_eq!(segments.len(), 4);
    assert_eq!(segments.first().unwrap().rank, 1);
    assert_eq!(segments.last().unwrap().rank, 4);
    assert!(segments.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn test_rank_with_paths() {
    let mut args = rank_args(vec![1, 2]);
    args.paths = true;

    let report = build_ranking(&args, &config(), STREAM.as_bytes()).unwrap();
    assert_eq!(report.paths.len(), 2);

    let video_a = &report.paths[0];
    assert_eq!(video_a.object_id, "video_a");
    let steps: Vec<&str> = video_a.steps.iter().map(|s| s.segment_id.as_str()).collect();
    assert_eq!(steps, vec!["video_a_1", "video_a_2"]);

    // 88 seconds between video_b's segments is past the cap
    assert_eq!(report.paths[1].steps.len(), 1);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["strategy"], "temporal");
    assert_eq!(json["paths"][0]["steps"][1]["container_id"], 2);
}

#[test]
fn test_rank_rejects_bad_input() {
    let err = build_ranking(&rank_args(vec![2, 1]), &config(), STREAM.as_bytes()).unwrap_err();
    assert_eq!(error_code(&err), "UNORDERED_QUERY_CONTAINERS");

    let mut args = rank_args(vec![1]);
    args.weights = vec!["color=-1".to_string()];
    let err = build_ranking(&args, &config(), STREAM.as_bytes()).unwrap_err();
    assert!(matches!(err, FusionError::InvalidWeight { .. }));

    let mut args = rank_args(vec![1]);
    args.limit = Some(0);
    let err = build_ranking(&args, &config(), STREAM.as_bytes()).unwrap_err();
    assert_eq!(error_code(&err), "CONFIGURATION_ERROR");

    let broken = format!("{}{{\"object_id\": 1}}\n", STREAM);
    let err = build_ranking(&rank_args(vec![1, 2]), &config(), broken.as_bytes()).unwrap_err();
    let json = error_json(&err);
    assert_eq!(json["code"], "PARSE_ERROR");
    assert!(json["message"].as_str().unwrap().contains("line 6"));
}

#[test]
fn test_validate_stream_reports_rejected_records() {
    let stream = format!(
        "{}{}\n",
        STREAM,
        r#"{"object_id":"video_c","segment_id":"video_a_1","container_id":1,"category":"color","value":0.5,"startabs":0.0,"endabs":2.0}"#
    );

    let mut session = QuerySession::new(&config(), vec![1]).unwrap();
    let summary = replay_stream(&mut session, stream.as_bytes(), false).unwrap();
    assert_eq!(summary.applied, 5);
    assert_eq!(summary.issues.len(), 1);
    assert_eq!(summary.issues[0].line, 6);
    assert!(summary.issues[0].message.contains("video_a_1"));
    assert!(session.results().object("video_c").is_none());
}

#[test]
fn test_context_loads_config_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("mediafuse.toml");
    fs::write(
        &path,
        r#"
[fusion]
strategy = "default"
object_aggregation = "average"

[ranking]
limit = 5
"#,
    )
    .unwrap();

    let ctx = MediaFuseCliContext::new(Some(&path)).unwrap();
    assert_eq!(ctx.config.fusion.strategy, FusionStrategy::Default);
    assert_eq!(ctx.config.fusion.object_aggregation, ObjectAggregation::Average);
    assert_eq!(ctx.config.ranking.limit, Some(5));
    assert_eq!(ctx.config_files, vec![path.clone()]);

    let report = build_ranking(&rank_args(vec![1, 2]), &ctx.config, STREAM.as_bytes()).unwrap();
    assert_eq!(report.strategy, FusionStrategy::Default);
}

#[test]
fn test_context_rejects_unknown_config_format() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("mediafuse.ini");
    fs::write(&path, "strategy=default").unwrap();

    let err = MediaFuseCliContext::new(Some(&path)).unwrap_err();
    assert!(matches!(err, FusionError::Configuration(_)));
}
