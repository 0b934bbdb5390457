//! Rank command handler

use crate::args::{OutputFormat, RankArgs};
use crate::context::MediaFuseCliContext;
use crate::handlers::replay::{ReplaySummary, replay_stream};
use crate::output::*;
use crate::utils::{check_containers, open_input, parse_weight};
use mediafuse::prelude::*;
use serde::Serialize;
use std::io::BufRead;
use tracing::info;

/// Everything the rank command prints
#[derive(Debug, Clone, Serialize)]
pub struct RankReport {
    pub strategy: FusionStrategy,
    pub query_containers: Vec<ContainerId>,
    pub stream: ReplaySummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objects: Option<Vec<RankedObject>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<RankedSegment>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<PathMatch>,
}

pub fn handle_rank_command(
    args: RankArgs,
    ctx: &MediaFuseCliContext,
    output_format: OutputFormat,
) -> mediafuse::Result<()> {
    let reader = open_input(&args.input)?;
    let report = build_ranking(&args, &ctx.config, reader)?;

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => print_rank_report(&report),
    }
    Ok(())
}

/// Replay `reader` under the options in `args` and rank the result
///
/// Command-line options override the loaded configuration. The stream is
/// replayed strictly: any bad record fails the command.
pub fn build_ranking<R: BufRead>(
    args: &RankArgs,
    config: &MediaFuseConfig,
    reader: R,
) -> mediafuse::Result<RankReport> {
    let containers = check_containers(&args.containers)?;
    let weights = args
        .weights
        .iter()
        .map(|pair| parse_weight(pair))
        .collect::<mediafuse::Result<Vec<_>>>()?;

    let mut builder = ConfigBuilder::from_config(config.clone());
    if let Some(strategy) = args.strategy {
        builder = builder.with_strategy(strategy.into());
    }
    if let Some(limit) = args.limit {
        builder = builder.with_ranking_limit(limit);
    }
    if args.include_unscored {
        builder = builder.with_unscored_in_rankings(true);
    }
    let config = builder.build()?;

    let mut session = QuerySession::new(&config, containers)?;
    for (category, weight) in &weights {
        session.set_weight(category, *weight)?;
    }

    let stream = replay_stream(&mut session, reader, true)?;
    info!(
        objects = session.results().len(),
        segments = session.results().segment_count(),
        "Score stream loaded"
    );

    let mut report = RankReport {
        strategy: session.strategy(),
        query_containers: session.query_container_ids().to_vec(),
        stream,
        objects: None,
        segments: None,
        paths: Vec::new(),
    };

    if args.segments {
        report.segments = Some(session.rank_segments(|_| true));
    } else {
        let objects = session.rank_objects(|_| true);
        if args.paths {
            report.paths = objects
                .iter()
                .filter_map(|ranked| session.optimal_path(&ranked.object_id))
                .collect();
        }
        report.objects = Some(objects);
    }

    Ok(report)
}
