//! Structured logging for mediafuse.
//!
//! Built on `tracing`: the engine emits `trace!` events for path search and
//! cache updates and `debug!` events per scored object. Applications call
//! [`init`] once to install a subscriber according to [`LoggingConfig`].
//!
//! `RUST_LOG` overrides the configured level when set.

mod formatters;
#[cfg(test)]
mod tests;

pub use formatters::DevelopmentFormatter;

use crate::config::{LogFormat, LogLevel, LoggingConfig};
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::NonBlocking;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Keeps the background log file writer alive; dropping it flushes the file
pub type LogGuard = tracing_appender::non_blocking::WorkerGuard;

/// Error type for logging operations
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// IO error while preparing the log file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing log level
    #[error("Invalid log level: {0}. Use one of trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    /// Invalid filter directive
    #[error("Invalid log filter: {0}")]
    Filter(String),

    /// Error in subscriber setup
    #[error("Subscriber error: {0}")]
    Subscriber(String),
}

/// Result type for logging operations
pub type Result<T> = std::result::Result<T, LogError>;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Initialize the logging system with the given configuration.
///
/// Returns the file writer guard when logging to a file. If a global
/// subscriber is already installed this is a no-op.
pub fn init(config: &LoggingConfig) -> Result<Option<LogGuard>> {
    if tracing::dispatcher::has_been_set() {
        tracing::debug!("Global subscriber already installed, keeping it");
        return Ok(None);
    }

    let filter = build_filter(config.level)?;
    let mut layers: Vec<BoxedLayer> = Vec::new();
    let mut guard = None;

    if config.stdout {
        layers.push(fmt_layer(config.format, std::io::stdout, true));
    }
    if let Some(file_path) = &config.file {
        let (writer, file_guard) = create_non_blocking_file(file_path)?;
        layers.push(fmt_layer(config.format, writer, false));
        guard = Some(file_guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| LogError::Subscriber(e.to_string()))?;

    tracing::debug!(level = %config.level, format = ?config.format, "Logging initialized");
    Ok(guard)
}

/// Filter from `RUST_LOG`, falling back to the configured level
fn build_filter(level: LogLevel) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level.to_string()).map_err(|e| LogError::Filter(e.to_string())),
    }
}

fn fmt_layer<W>(format: LogFormat, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi);

    match format {
        LogFormat::Json => layer.json().with_thread_ids(true).boxed(),
        LogFormat::Compact => layer.compact().with_target(true).boxed(),
        LogFormat::Pretty => layer.pretty().with_line_number(true).boxed(),
        LogFormat::Default => layer
            .event_format(DevelopmentFormatter::new(ansi))
            .boxed(),
    }
}

/// Create a non-blocking file writer.
fn create_non_blocking_file(path: impl AsRef<Path>) -> Result<(NonBlocking, LogGuard)> {
    let path = path.as_ref();

    let Some(file_name) = path.file_name() else {
        return Err(LogError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("log file path has no file name: {}", path.display()),
        )));
    };
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    if !directory.exists() {
        std::fs::create_dir_all(directory)?;
    }

    let file_appender = tracing_appender::rolling::never(directory, file_name);
    Ok(tracing_appender::non_blocking(file_appender))
}

/// Parse a log level string into a LogLevel enum.
pub fn parse_log_level(level: &str) -> Result<LogLevel> {
    level
        .parse()
        .map_err(|_| LogError::InvalidLogLevel(level.to_string()))
}

/// Convert a tracing::Level to a LogLevel enum.
pub fn level_to_log_level(level: Level) -> LogLevel {
    match level {
        Level::TRACE => LogLevel::Trace,
        Level::DEBUG => LogLevel::Debug,
        Level::INFO => LogLevel::Info,
        Level::WARN => LogLevel::Warn,
        Level::ERROR => LogLevel::Error,
    }
}
