//! Configuration file support for pFotbal.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/pfotbal/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides the configured data file
pub const DATA_FILE_ENV: &str = "PFOTBAL_DATA_FILE";

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub writer: WriterConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
        }
    }
}

/// Background writer configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WriterConfig {
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
        }
    }
}

fn default_data_file() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("pfotbal").join("training_data.json")
}

fn default_queue_capacity() -> usize {
    8
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("pfotbal").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.writer.queue_capacity == 0 {
            return Err(Error::Config(
                "writer.queue_capacity must be at least 1".into(),
            ));
        }
        if self.data.data_file.as_os_str().is_empty() {
            return Err(Error::Config("data.data_file must not be empty".into()));
        }
        Ok(())
    }

    /// Pick the data file: explicit override, then `PFOTBAL_DATA_FILE`, then the config
    pub fn resolve_data_file(&self, cli_override: Option<PathBuf>) -> PathBuf {
        cli_override
            .or_else(|| {
                std::env::var_os(DATA_FILE_ENV)
                    .filter(|v| !v.is_empty())
                    .map(PathBuf::from)
            })
            .unwrap_or_else(|| self.data.data_file.clone())
    }
}
