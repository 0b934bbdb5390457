//! Configuration validation utilities.

use super::ConfigError;
use super::models::*;
use crate::ranking::RankingOptions;

/// Validate the entire configuration.
pub fn validate_config(config: &MediaFuseConfig) -> Result<(), ConfigError> {
    validate_fusion_settings(&config.fusion)?;
    validate_ranking_options(&config.ranking)?;
    validate_logging_config(&config.logging)?;

    Ok(())
}

/// Validate fusion settings.
fn validate_fusion_settings(config: &FusionSettings) -> Result<(), ConfigError> {
    let cap = config.temporal_distance_cap_secs;
    if !cap.is_finite() || cap <= 0.0 {
        return Err(ConfigError::ValidationError(format!(
            "fusion.temporal_distance_cap_secs must be a finite number > 0, got {}",
            cap
        )));
    }

    let weight = config.default_category_weight;
    if !weight.is_finite() || weight < 0.0 {
        return Err(ConfigError::ValidationError(format!(
            "fusion.default_category_weight must be a finite number >= 0, got {}",
            weight
        )));
    }

    Ok(())
}

/// Validate ranking options.
fn validate_ranking_options(config: &RankingOptions) -> Result<(), ConfigError> {
    if config.limit == Some(0) {
        return Err(ConfigError::ValidationError(
            "ranking.limit must be at least 1; omit it to rank all entries".to_string(),
        ));
    }

    Ok(())
}

/// Validate logging configuration.
fn validate_logging_config(config: &LoggingConfig) -> Result<(), ConfigError> {
    if let Some(file) = &config.file {
        if file.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "logging.file cannot be empty; omit it to disable file logging".to_string(),
            ));
        }
    }

    Ok(())
}
