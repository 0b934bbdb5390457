//! Configuration system for mediafuse.
//!
//! Configuration is layered from defaults, an optional configuration file and
//! `MEDIAFUSE_`-prefixed environment variables, then validated.

mod builder;
mod loader;
mod models;
#[cfg(test)]
mod tests;
pub mod validation;

pub use builder::ConfigBuilder;
pub use loader::ConfigLoader;
pub use models::*;

/// Default configuration file names that the system will look for
pub const DEFAULT_CONFIG_FILES: &[&str] = &[
    "mediafuse.toml",
    "mediafuse.yaml",
    "mediafuse.yml",
    "mediafuse.json",
    ".mediafuse/config.toml",
    ".mediafuse/config.yaml",
    ".mediafuse/config.yml",
    ".mediafuse/config.json",
];

/// Environment variable prefix for mediafuse configuration
///
/// Nested keys are separated by a double underscore, e.g.
/// `MEDIAFUSE_FUSION__STRATEGY=default`.
pub const ENV_PREFIX: &str = "MEDIAFUSE_";

/// Configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error occurred during file loading
    #[error("Failed to load configuration file: {0}")]
    FileLoadError(String),

    /// Error occurred during validation
    #[error("Configuration validation error: {0}")]
    ValidationError(String),

    /// Error occurred during parsing
    #[error("Configuration parsing error: {0}")]
    ParseError(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
