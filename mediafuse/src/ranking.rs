//! Ranking of fused results for presentation
//!
//! Which objects and segments are shown is decided by the caller through a
//! visibility predicate; this module only scores, filters and sorts.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::fusion::FusionFunction;
use crate::models::{
    MediaObjectScoreContainer, SegmentScoreContainer, WeightedFeatureCategory, is_unscored,
};

/// Ranking options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct RankingOptions {
    /// Maximum number of entries returned (all when unset)
    pub limit: Option<usize>,

    /// Keep entries without score data, ranked after all scored ones
    pub include_unscored: bool,
}

/// An object with its fused score and position
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RankedObject {
    /// 1-based rank
    pub rank: usize,
    pub object_id: String,
    pub score: f64,
    pub segment_count: usize,
}

/// A segment with its fused score and position
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RankedSegment {
    /// 1-based rank
    pub rank: usize,
    pub object_id: String,
    pub segment_id: String,
    pub score: f64,
    pub startabs: f64,
    pub endabs: f64,
}

/// Score and sort all objects accepted by `visible`
pub fn rank_objects<F>(
    fusion: &dyn FusionFunction,
    categories: &[WeightedFeatureCategory],
    objects: &[MediaObjectScoreContainer],
    visible: F,
    options: &RankingOptions,
) -> Vec<RankedObject>
where
    F: Fn(&MediaObjectScoreContainer) -> bool,
{
    let mut scored: Vec<(f64, &MediaObjectScoreContainer)> = objects
        .iter()
        .filter(|object| visible(object))
        .map(|object| (fusion.score_for_object(categories, object), object))
        .filter(|(score, _)| options.include_unscored || !is_unscored(*score))
        .collect();

    scored.sort_by(|(a_score, a), (b_score, b)| {
        by_score_desc(*a_score, *b_score).then_with(|| a.object_id().cmp(b.object_id()))
    });

    let ranked: Vec<RankedObject> = scored
        .into_iter()
        .take(options.limit.unwrap_or(usize::MAX))
        .enumerate()
        .map(|(i, (score, object))| RankedObject {
            rank: i + 1,
            object_id: object.object_id().to_string(),
            score,
            segment_count: object.len(),
        })
        .collect();

    tracing::debug!(
        candidates = objects.len(),
        ranked = ranked.len(),
        "Ranked objects"
    );
    ranked
}

/// Score and sort all visible segments accepted by `visible`
///
/// Segments hidden with [`SegmentScoreContainer::set_visible`] are skipped.
/// Ties order by object id, then segment id.
pub fn rank_segments<F>(
    fusion: &dyn FusionFunction,
    categories: &[WeightedFeatureCategory],
    objects: &[MediaObjectScoreContainer],
    visible: F,
    options: &RankingOptions,
) -> Vec<RankedSegment>
where
    F: Fn(&SegmentScoreContainer) -> bool,
{
    let visible = &visible;
    let mut scored: Vec<(f64, &SegmentScoreContainer)> = objects
        .iter()
        .flat_map(|object| {
            object
                .segments()
                .iter()
                .filter(move |segment| segment.is_visible() && visible(segment))
                .map(move |segment| {
                    (fusion.score_for_segment(categories, object, segment), segment)
                })
        })
        .filter(|(score, _)| options.include_unscored || !is_unscored(*score))
        .collect();

    scored.sort_by(|(a_score, a), (b_score, b)| {
        by_score_desc(*a_score, *b_score)
            .then_with(|| a.object_id().cmp(b.object_id()))
            .then_with(|| a.segment_id().cmp(b.segment_id()))
    });

    let ranked: Vec<RankedSegment> = scored
        .into_iter()
        .take(options.limit.unwrap_or(usize::MAX))
        .enumerate()
        .map(|(i, (score, segment))| RankedSegment {
            rank: i + 1,
            object_id: segment.object_id().to_string(),
            segment_id: segment.segment_id().to_string(),
            score,
            startabs: segment.startabs(),
            endabs: segment.endabs(),
        })
        .collect();

    tracing::debug!(ranked = ranked.len(), "Ranked segments");
    ranked
}

/// Descending by score, with the unscored sentinel after every real score
fn by_score_desc(a: f64, b: f64) -> Ordering {
    match (is_unscored(a), is_unscored(b)) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}
