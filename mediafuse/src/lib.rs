//! # Mediafuse
//!
//! Score fusion for multimedia retrieval results. A retrieval backend streams
//! per-feature-category similarity scores for candidate media objects and their
//! segments; mediafuse accumulates them and turns them into one ranking score per
//! object and per segment.
//!
//! Two fusion strategies are provided:
//!
//! - [`DefaultFusionFunction`](fusion::DefaultFusionFunction): weighted average
//!   of the category scores of a single segment.
//! - [`TemporalFusionFunction`](fusion::TemporalFusionFunction): for multi-part
//!   (temporal) queries, finds the best ordered, time-constrained sequence of
//!   segments that explains the query parts and scores the object by that path.
//!
//! ## Quick Start
//!
//! ```rust
//! use mediafuse::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let config = ConfigBuilder::testing().build()?;
//!     let mut session = QuerySession::new(&config, vec![1, 2, 3])?;
//!
//!     // Scores arrive one partial result at a time
//!     session.apply_score(ScoreUpdate::new("video_1", "video_1_s1", 1, "color", 0.9, 0.0, 2.0))?;
//!     session.apply_score(ScoreUpdate::new("video_1", "video_1_s2", 2, "color", 0.8, 5.0, 7.0))?;
//!
//!     let ranking = session.rank_objects(|_| true);
//!     assert_eq!(ranking[0].object_id, "video_1");
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`models`]: score containers (categories, segments, objects)
//! - [`results`]: ingestion of streamed scores into a [`ResultSet`](results::ResultSet)
//! - [`fusion`]: the [`FusionFunction`](fusion::FusionFunction) contract and both strategies
//! - [`ranking`]: sorting helpers used by presentation layers
//! - [`session`]: one query's lifecycle tying the above together
//! - [`config`] / [`logging`]: ambient configuration and structured logging

pub mod config;
pub mod fusion;
pub mod logging;
pub mod models;
pub mod ranking;
pub mod results;
pub mod session;

/// The prelude re-exports commonly used types for convenience
pub mod prelude {
    pub use crate::config::{
        ConfigBuilder, ConfigLoader, FusionSettings, LogFormat, LogLevel, LoggingConfig,
        MediaFuseConfig,
    };
    pub use crate::fusion::{
        BestScoreCache, CachedScore, DefaultFusionFunction, FusionFunction, FusionStrategy,
        ObjectAggregation, PathMatch, TemporalFusionFunction,
    };
    pub use crate::models::{
        ContainerId, MediaObjectScoreContainer, SegmentScoreContainer, UNSCORED,
        WeightedFeatureCategory, is_unscored,
    };
    pub use crate::ranking::{RankedObject, RankedSegment, RankingOptions};
    pub use crate::results::{IngestOutcome, ResultSet, ScoreUpdate};
    pub use crate::session::QuerySession;

    pub use crate::{FusionError, Result};
}

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error type for mediafuse operations
///
/// Scoring itself never fails; these errors come from ingestion, query setup,
/// configuration and logging.
#[derive(Debug, thiserror::Error)]
pub enum FusionError {
    /// A temporal query needs at least one query container
    #[error(
        "Query container list is empty. A temporal query needs at least one container id, e.g. [1, 2, 3]"
    )]
    EmptyQueryContainers,

    /// Query container ids must be strictly increasing
    #[error(
        "Query container ids must be strictly increasing, but {next} follows {previous}. Pass the ids in query order"
    )]
    UnorderedQueryContainers {
        previous: models::ContainerId,
        next: models::ContainerId,
    },

    /// Segment ends before it starts
    #[error("Segment '{segment_id}' has invalid time bounds: endabs {endabs} < startabs {startabs}")]
    InvalidSegmentBounds {
        segment_id: String,
        startabs: f64,
        endabs: f64,
    },

    /// Segment data contradicts what is already known about it
    #[error("Segment '{segment_id}' is inconsistent with earlier results: {reason}")]
    InconsistentSegment { segment_id: String, reason: String },

    /// Time value that is not finite, or score that is not finite and >= 0
    #[error("Invalid {field} value {value} for segment '{segment_id}'")]
    InvalidScore {
        segment_id: String,
        field: &'static str,
        value: f64,
    },

    /// Empty object, segment or category identifier
    #[error("Identifier cannot be empty: {0}")]
    InvalidIdentifier(String),

    /// Category weight that is negative or not finite
    #[error("Invalid weight {weight} for category '{category}'; weights must be finite and >= 0")]
    InvalidWeight { category: String, weight: f64 },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Logging error
    #[error("Logging error: {0}")]
    Logging(#[from] crate::logging::LogError),

    /// IO error while reading score streams
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed score stream record
    #[error("Parse error: {0}")]
    Parse(String),

    /// Other unclassified errors
    #[error("{0}")]
    Other(String),
}

impl From<crate::config::ConfigError> for FusionError {
    fn from(err: crate::config::ConfigError) -> Self {
        FusionError::Configuration(err.to_string())
    }
}

impl From<serde_json::Error> for FusionError {
    fn from(err: serde_json::Error) -> Self {
        FusionError::Parse(err.to_string())
    }
}

/// Result type for mediafuse operations
pub type Result<T> = std::result::Result<T, FusionError>;

/// Initialize logging from the given configuration and create a query session
///
/// The returned guard (if any) keeps the background log file writer alive and
/// must be held for as long as logging to a file is wanted.
///
/// # Examples
///
/// ```rust
/// use mediafuse::prelude::*;
///
/// fn example() -> Result<()> {
///     let config = ConfigBuilder::testing().build()?;
///     let (session, _guard) = mediafuse::init(&config, vec![1, 2])?;
///     assert!(session.results().is_empty());
///     Ok(())
/// }
/// ```
pub fn init(
    config: &config::MediaFuseConfig,
    query_container_ids: Vec<models::ContainerId>,
) -> Result<(session::QuerySession, Option<logging::LogGuard>)> {
    let guard = logging::init(&config.logging)?;
    let session = session::QuerySession::new(config, query_container_ids)?;
    Ok((session, guard))
}
