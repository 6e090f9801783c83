mod cache;
mod logging;

pub use cache::CacheConfigFile;
pub use logging::{LoggingConfigFile, VALID_FORMATS, VALID_LEVELS};

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_CONFIG_FILE: &str = "encache.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EncacheConfig {
    pub cache: CacheConfigFile,
    pub logging: LoggingConfigFile,
}

impl EncacheConfig {
    /// Load configuration from the given path, or from `encache.toml` in the
    /// working directory if `None`, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = if let Some(p) = path {
            Self::from_file(p)?
        } else {
            let local_config = PathBuf::from(DEFAULT_CONFIG_FILE);
            if local_config.exists() {
                Self::from_file(&local_config)?
            } else {
                Self::default()
            }
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::ParseError(format!("Failed to read config file: {e}"))
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    pub fn apply_env_overrides(&mut self) {
        self.cache.apply_env_overrides();
        self.logging.apply_env_overrides();
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.cache_padding > 1 {
            return Err(ConfigError::InvalidValue {
                key: "cache.cache_padding".to_string(),
                reason: format!(
                    "encoder cache cannot enforce padding {}, must be 0 or 1",
                    self.cache.cache_padding
                ),
            });
        }

        if !VALID_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.level".to_string(),
                reason: format!("must be one of: {}", VALID_LEVELS.join(", ")),
            });
        }

        if !VALID_FORMATS.contains(&self.logging.format.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.format".to_string(),
                reason: format!("must be one of: {}", VALID_FORMATS.join(", ")),
            });
        }

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    #[must_use]
    pub fn generate_default_config() -> String {
        let toml_str = toml::to_string_pretty(&Self::default()).unwrap_or_default();

        format!(
            "# Encache Configuration File\n\
             \n\
             {toml_str}"
        )
    }
}
