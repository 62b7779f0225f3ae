// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::{DEFAULT_OPERATOR_ID, capture, export, records, timing, transform, upload};
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable overriding [`Config::api_key`]
pub const API_KEY_ENV: &str = "TRANSMUTATION_API_KEY";

/// Application directory name under the platform config/data directories
const APP_DIR: &str = "transmutation";

/// Storage collaborator settings
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Base URL objects are uploaded under
    pub endpoint: String,
    /// Prefix of every upload key
    pub key_prefix: String,
    pub timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8080/storage".to_string(),
            key_prefix: upload::KEY_PREFIX.to_string(),
            timeout_secs: timing::UPLOAD_TIMEOUT.as_secs(),
        }
    }
}

/// Transform collaborator settings
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Image generation endpoint
    pub endpoint: String,
    /// Transformation directive
    pub prompt: String,
    /// Output resolution (e.g. "1024x1024")
    pub size: String,
    /// Output quality tier
    pub quality: String,
    pub timeout_secs: u64,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8080/images/edits".to_string(),
            prompt: transform::PROMPT.to_string(),
            size: transform::SIZE.to_string(),
            quality: transform::QUALITY.to_string(),
            timeout_secs: timing::TRANSFORM_TIMEOUT.as_secs(),
        }
    }
}

/// Record persistence settings
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordsConfig {
    /// Directory holding the record medium (default: platform data dir)
    pub dir: Option<PathBuf>,
    /// Maximum size of the serialized record sequence
    pub capacity_bytes: u64,
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            dir: None,
            capacity_bytes: records::DEFAULT_CAPACITY_BYTES,
        }
    }
}

/// Camera capture settings
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// JPEG quality for captured stills (1-100)
    pub jpeg_quality: u8,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: capture::JPEG_QUALITY,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Operator identifier stamped on every record
    pub operator_id: String,
    /// Bearer token sent to both collaborators
    pub api_key: Option<String>,
    pub storage: StorageConfig,
    pub transform: TransformConfig,
    pub records: RecordsConfig,
    pub capture: CaptureConfig,
    /// Where `download` writes entity images (default: ~/Pictures/transmutation)
    pub download_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            operator_id: DEFAULT_OPERATOR_ID.to_string(),
            api_key: None,
            storage: StorageConfig::default(),
            transform: TransformConfig::default(),
            records: RecordsConfig::default(),
            capture: CaptureConfig::default(),
            download_dir: None,
        }
    }
}

impl Config {
    /// `<config_dir>/transmutation/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
    }

    /// Load configuration
    ///
    /// An explicit path must exist. Without one the default path is tried and
    /// a missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match Self::default_path() {
                Some(path) => (path, false),
                None => {
                    debug!("No config directory on this platform, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
                debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                });
            }
        };

        let config = Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: "<inline>".to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Replace the API key when `value` is a non-blank string
    pub fn with_api_key_override(mut self, value: Option<String>) -> Self {
        if let Some(key) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            self.api_key = Some(key);
        }
        self
    }

    /// Apply overrides from the process environment
    pub fn with_env_overrides(self) -> Self {
        let key = std::env::var(API_KEY_ENV).ok();
        if key.is_some() {
            debug!(var = API_KEY_ENV, "API key taken from environment");
        }
        self.with_api_key_override(key)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.operator_id.trim().is_empty() {
            return Err(ConfigError::Invalid("operator_id must not be empty".into()));
        }
        if self.storage.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("storage.endpoint must not be empty".into()));
        }
        if self.transform.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "transform.endpoint must not be empty".into(),
            ));
        }
        if self.storage.timeout_secs == 0 || self.transform.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeouts must be at least 1s".into()));
        }
        if !(1..=100).contains(&self.capture.jpeg_quality) {
            return Err(ConfigError::Invalid(format!(
                "capture.jpeg_quality must be 1-100, got {}",
                self.capture.jpeg_quality
            )));
        }
        if self.records.capacity_bytes == 0 {
            return Err(ConfigError::Invalid(
                "records.capacity_bytes must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Directory holding the record medium
    pub fn records_dir(&self) -> PathBuf {
        self.records.dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
        })
    }

    /// Directory `download` writes into
    pub fn download_dir(&self) -> PathBuf {
        self.download_dir.clone().unwrap_or_else(|| {
            dirs::picture_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(export::DOWNLOAD_SUBDIR)
        })
    }
}
