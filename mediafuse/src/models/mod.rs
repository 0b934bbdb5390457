//! Score model for fused retrieval results.
//!
//! Objects own their segments; every segment carries raw category scores keyed
//! by the query container that produced them.

pub mod category;
pub mod object;
pub mod segment;

pub use category::WeightedFeatureCategory;
pub use object::MediaObjectScoreContainer;
pub use segment::{CategoryScores, SegmentScoreContainer};

/// Identifier of one query container (a temporal sub-part of the query)
pub type ContainerId = i64;

/// Sentinel score of a segment or object that has no score data yet.
///
/// Distinct from a genuine zero-similarity score of `0.0`.
pub const UNSCORED: f64 = -1.0;

/// Whether a score produced by a fusion function is the "no opinion yet" sentinel.
///
/// Real fused scores are never negative.
pub fn is_unscored(score: f64) -> bool {
    score < 0.0
}
