use mediafuse::config::{ConfigLoader, MediaFuseConfig};
use std::path::{Path, PathBuf};

/// Shared state of one CLI invocation
#[derive(Debug)]
pub struct MediaFuseCliContext {
    pub config: MediaFuseConfig,
    /// Configuration files the settings were read from
    pub config_files: Vec<PathBuf>,
}

impl MediaFuseCliContext {
    /// Load configuration from `config_path`, or from the default locations
    ///
    /// `MEDIAFUSE_`-prefixed environment variables override file values.
    pub fn new(config_path: Option<&Path>) -> mediafuse::Result<Self> {
        let mut loader = ConfigLoader::new();
        match config_path {
            Some(path) => {
                loader.load_file(path)?;
            }
            None => {
                loader.load_default_files();
            }
        }
        let config = loader.load_env().extract()?;

        Ok(Self {
            config,
            config_files: loader.files().to_vec(),
        })
    }
}
