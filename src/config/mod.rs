use crate::contact::DEFAULT_WHATSAPP_NUMBER;
use crate::media::EncoderSettings;
use crate::storage::DEFAULT_QUOTA_BYTES;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// `json` or `text`.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub path: Option<PathBuf>,
    pub quota_bytes: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            quota_bytes: DEFAULT_QUOTA_BYTES,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ContactConfig {
    pub whatsapp_number: String,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            whatsapp_number: DEFAULT_WHATSAPP_NUMBER.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub media: EncoderSettings,
    pub contact: ContactConfig,
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path))?;
        Self::from_toml(&contents).with_context(|| format!("Failed to parse config file {}", path))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn get_logging_format(&self) -> &str {
        &self.logging.format
    }

    /// Configured path, else `<data dir>/reelfolio/storage.json`.
    pub fn storage_path(&self) -> PathBuf {
        if let Some(path) = &self.storage.path {
            return path.clone();
        }

        dirs::data_dir()
            .unwrap_or_else(|| Path::new(".").to_path_buf())
            .join("reelfolio")
            .join("storage.json")
    }
}
