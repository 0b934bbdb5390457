//! Layered configuration loading.
//!
//! Layers are merged in call order on top of [`MediaFuseConfig::default`];
//! later layers override earlier ones key by key.

use super::{ConfigError, DEFAULT_CONFIG_FILES, ENV_PREFIX, Result, models::*, validation};
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
};
use std::path::{Path, PathBuf};

/// File formats a configuration file may use, by extension
const CONFIG_EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];

/// Builds a [`MediaFuseConfig`] from defaults, files and the environment.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    figment: Figment,
    files: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Start from the built-in defaults.
    pub fn new() -> Self {
        Self {
            figment: Figment::from(Serialized::defaults(MediaFuseConfig::default())),
            files: Vec::new(),
        }
    }

    /// Merge a TOML, YAML or JSON file, chosen by extension.
    ///
    /// Parse errors in the file surface from [`extract`](Self::extract).
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<&mut Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::FileLoadError(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let merged = match extension.as_deref() {
            Some("toml") => std::mem::take(&mut self.figment).merge(Toml::file(path)),
            Some("yaml" | "yml") => std::mem::take(&mut self.figment).merge(Yaml::file(path)),
            Some("json") => std::mem::take(&mut self.figment).merge(Json::file(path)),
            _ => {
                return Err(ConfigError::FileLoadError(format!(
                    "Unsupported file format: {} (expected one of: {})",
                    path.display(),
                    CONFIG_EXTENSIONS.join(", ")
                )));
            }
        };

        self.figment = merged;
        self.files.push(path.to_path_buf());
        tracing::debug!(path = %path.display(), "Merged configuration file");
        Ok(self)
    }

    /// Merge the first configuration file found in the working directory,
    /// falling back to `config.*` in the user's configuration directory.
    ///
    /// Finding no file is not an error.
    pub fn load_default_files(&mut self) -> &mut Self {
        let user_files = directories::ProjectDirs::from("org", "mediafuse", "mediafuse")
            .map(|dirs| {
                CONFIG_EXTENSIONS
                    .iter()
                    .map(|ext| dirs.config_dir().join(format!("config.{}", ext)))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        let candidates = DEFAULT_CONFIG_FILES
            .iter()
            .map(PathBuf::from)
            .chain(user_files);

        for path in candidates {
            if !path.is_file() {
                continue;
            }
            match self.load_file(&path) {
                Ok(_) => break,
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "Skipping configuration file"),
            }
        }

        self
    }

    /// Merge `MEDIAFUSE_`-prefixed environment variables (`__` nests keys).
    pub fn load_env(&mut self) -> &mut Self {
        self.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Merge any other figment provider.
    pub fn merge<T: figment::Provider>(&mut self, provider: T) -> &mut Self {
        self.figment = std::mem::take(&mut self.figment).merge(provider);
        self
    }

    /// Files merged so far, in merge order
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Deserialize the merged layers and validate the result.
    pub fn extract(&self) -> Result<MediaFuseConfig> {
        let config: MediaFuseConfig = self
            .figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        validation::validate_config(&config)?;
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
