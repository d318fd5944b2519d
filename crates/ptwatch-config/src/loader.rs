//! Loading configuration from disk or environment.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{ConfigError, ConfigResult};
use crate::model::Config;
use crate::validate;

/// Environment variable naming the configuration file path.
pub const CONFIG_PATH_ENV: &str = "PTWATCH_CONFIG";

impl Config {
    /// Load and validate a configuration document from a YAML file.
    pub fn load_from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        validate::validate(&config)?;
        info!(path = %path.display(), sites = config.sites.len(), "loaded configuration");
        Ok(config)
    }

    /// Load and validate the configuration document named by [`CONFIG_PATH_ENV`].
    pub fn load_from_env() -> ConfigResult<Self> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .map_err(|_| ConfigError::MissingEnv {
                name: CONFIG_PATH_ENV,
            })?;
        Self::load_from_path(path)
    }
}
