//! Fusion functions
//!
//! A [`FusionFunction`] turns the raw per-category, per-container scores of the
//! score model into one ranking score per object and per segment.
//!
//! # Overview
//!
//! - [`DefaultFusionFunction`] scores each segment on its own, as the weighted
//!   average of its category scores.
//! - [`TemporalFusionFunction`] scores an object by the best ordered,
//!   time-constrained sequence of its segments matching the parts of a
//!   temporal query, and remembers the best sequence score seen per segment.
//!
//! Both return [`UNSCORED`](crate::models::UNSCORED) (`-1.0`) for data that has
//! not been scored yet, never `0.0`.
//!
//! # Example
//!
//! ```
//! use mediafuse::prelude::*;
//!
//! let mut object = MediaObjectScoreContainer::new("v1").unwrap();
//! let mut segment = SegmentScoreContainer::new("v1_1", "v1", 0.0, 2.0).unwrap();
//! segment.set_score(1, "color", 0.8).unwrap();
//! object.add_segment(segment).unwrap();
//!
//! let categories = vec![WeightedFeatureCategory::new("color", 1.0)];
//! let fusion = TemporalFusionFunction::new(vec![1, 2]).unwrap();
//! let score = fusion.score_for_object(&categories, &object);
//! assert!((score - 0.4).abs() < 1e-9);
//! ```

pub mod cache;
pub mod default;
pub mod temporal;

pub use cache::{BestScoreCache, CachedScore};
pub use default::DefaultFusionFunction;
pub use temporal::{PathMatch, PathStep, TEMPORAL_DISTANCE_CAP_SECS, TemporalFusionFunction};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{MediaObjectScoreContainer, SegmentScoreContainer, WeightedFeatureCategory};

/// Scoring contract shared by all fusion strategies.
///
/// Implementations must be idempotent for identical inputs; the only permitted
/// side effect is an internal cache that never loses information.
#[cfg_attr(test, mockall::automock)]
pub trait FusionFunction: Send + Sync {
    /// Score a whole media object
    fn score_for_object(
        &self,
        categories: &[WeightedFeatureCategory],
        object: &MediaObjectScoreContainer,
    ) -> f64;

    /// Score one segment of `object`
    ///
    /// `object` must be the segment's owner.
    fn score_for_segment(
        &self,
        categories: &[WeightedFeatureCategory],
        object: &MediaObjectScoreContainer,
        segment: &SegmentScoreContainer,
    ) -> f64;
}

/// Available fusion strategies
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FusionStrategy {
    /// Per-segment weighted average
    Default,

    /// Temporal path search over query containers
    #[default]
    Temporal,
}

impl fmt::Display for FusionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Temporal => write!(f, "temporal"),
        }
    }
}

impl std::str::FromStr for FusionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "temporal" => Ok(Self::Temporal),
            _ => Err(format!("Invalid fusion strategy: {}", s)),
        }
    }
}

/// How [`DefaultFusionFunction`] combines segment scores into an object score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ObjectAggregation {
    /// Best visible segment
    #[default]
    Max,

    /// Mean over scored visible segments
    Average,
}

impl fmt::Display for ObjectAggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Max => write!(f, "max"),
            Self::Average => write!(f, "average"),
        }
    }
}
