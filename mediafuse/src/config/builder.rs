//! Configuration builder.
//!
//! This module provides a builder pattern API for creating configurations.

use super::{Result, models::*, validation};
use crate::fusion::{FusionStrategy, ObjectAggregation};
use std::path::Path;

/// Builder for creating MediaFuseConfig instances.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: MediaFuseConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn from_config(config: MediaFuseConfig) -> Self {
        Self { config }
    }

    /// Set the fusion strategy.
    pub fn with_strategy(mut self, strategy: FusionStrategy) -> Self {
        self.config.fusion.strategy = strategy;
        self
    }

    /// Set the maximum gap between consecutive segments of a temporal path.
    pub fn with_temporal_distance_cap(mut self, secs: f64) -> Self {
        self.config.fusion.temporal_distance_cap_secs = secs;
        self
    }

    /// Set how segment scores combine into object scores.
    pub fn with_object_aggregation(mut self, aggregation: ObjectAggregation) -> Self {
        self.config.fusion.object_aggregation = aggregation;
        self
    }

    /// Set the weight given to newly seen categories.
    pub fn with_default_category_weight(mut self, weight: f64) -> Self {
        self.config.fusion.default_category_weight = weight;
        self
    }

    /// Limit the number of ranked entries.
    pub fn with_ranking_limit(mut self, limit: usize) -> Self {
        self.config.ranking.limit = Some(limit);
        self
    }

    /// Keep unscored entries in rankings.
    pub fn with_unscored_in_rankings(mut self, include: bool) -> Self {
        self.config.ranking.include_unscored = include;
        self
    }

    /// Set the log level.
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    /// Set the log format.
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.config.logging.format = format;
        self
    }

    /// Configure logging to a file.
    pub fn with_log_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.logging.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Disable logging to stdout.
    pub fn without_stdout_logging(mut self) -> Self {
        self.config.logging.stdout = false;
        self
    }

    /// Create a configuration for development.
    ///
    /// Temporal fusion with debug-level, human-readable logging.
    pub fn development() -> Self {
        Self::new()
            .with_log_level(LogLevel::Debug)
            .with_log_format(LogFormat::Default)
    }

    /// Create a configuration for testing.
    ///
    /// Like `development()`, but logs only warnings so test output stays quiet.
    pub fn testing() -> Self {
        Self::development().with_log_level(LogLevel::Warn)
    }

    /// Create a production configuration.
    ///
    /// Info-level JSON logging, rankings limited to the top 1000 entries.
    pub fn production() -> Self {
        Self::new()
            .with_log_level(LogLevel::Info)
            .with_log_format(LogFormat::Json)
            .with_ranking_limit(1000)
    }

    /// Build the configuration, validating it in the process.
    pub fn build(self) -> Result<MediaFuseConfig> {
        validation::validate_config(&self.config)?;

        Ok(self.config)
    }
}
