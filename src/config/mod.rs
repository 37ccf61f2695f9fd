//! Configuration module for VisionFlow
//!
//! This module handles application configuration:
//! - The processing endpoint (base URL and request timeout)
//! - Default [`Settings`] for new sessions
//! - Where auto-saved results are written
//!
//! # App Data Location
//!
//! Application data is stored in the platform-appropriate location:
//! - **Linux**: `~/.local/share/dev.visionflow.canvas/`
//! - **macOS**: `~/Library/Application Support/dev.visionflow.canvas/`
//! - **Windows**: `%APPDATA%\dev.visionflow.canvas\`
//!
//! # Files
//!
//! - `config.toml` - Endpoint, settings and output directory
//! - `visionflow-theme` - Persisted theme preference
//!
//! # Example
//!
//! ```ignore
//! use visionflow::config::AppConfig;
//!
//! let config = AppConfig::load_or_default().with_env_overrides();
//! println!("Submitting to {}", config.endpoint.process_url());
//! ```

pub mod settings;

pub use settings::*;

use crate::error::{Result, VisionFlowError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application identifier for data directories
pub const APP_ID: &str = "dev.visionflow.canvas";

/// Config filename
pub const CONFIG_FILE: &str = "config.toml";

/// Environment variable overriding the endpoint base URL
pub const ENDPOINT_ENV_VAR: &str = "VISIONFLOW_ENDPOINT";

/// Default processing service location
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ==================== App Data Directory ====================

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Ensure the app data directory exists
pub fn ensure_app_data_dir() -> Result<PathBuf> {
    let dir = app_data_dir().ok_or_else(|| {
        VisionFlowError::Config("Could not determine app data directory".to_string())
    })?;

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| {
            VisionFlowError::Config(format!("Failed to create app data directory: {}", e))
        })?;
    }

    Ok(dir)
}

/// Get the path to the default config file
pub fn config_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(CONFIG_FILE))
}

// ==================== Endpoint ====================

/// Where and how pipelines are submitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Base URL of the processing service, without a trailing `/process`
    pub base_url: String,

    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl EndpointConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Join a path onto the base URL
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn process_url(&self) -> String {
        self.url("process")
    }
}

// ==================== App Config ====================

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory for auto-saved results. Defaults to the working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    #[serde(default)]
    pub endpoint: EndpointConfig,

    /// Initial settings for new sessions
    #[serde(default)]
    pub settings: Settings,
}

impl AppConfig {
    /// Load the config from the default location. A missing file yields defaults.
    pub fn load() -> Result<Self> {
        let path = config_path().ok_or_else(|| {
            VisionFlowError::Config("Could not determine config path".to_string())
        })?;
        Self::load_from(path)
    }

    /// Load the config from an explicit path. A missing file yields defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            VisionFlowError::Config(format!("Failed to read config {:?}: {}", path, e))
        })?;

        Self::from_toml_str(&content)
            .map_err(|e| VisionFlowError::Config(format!("Failed to parse config {:?}: {}", path, e)))
    }

    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(content)?;
        config.settings = config.settings.normalized();
        Ok(config)
    }

    /// Load the config, returning defaults on any error
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save the config to the default location
    pub fn save(&self) -> Result<()> {
        let dir = ensure_app_data_dir()?;
        self.save_to(dir.join(CONFIG_FILE))
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| VisionFlowError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| VisionFlowError::Config(format!("Failed to write config {:?}: {}", path, e)))
    }

    /// Apply `VISIONFLOW_ENDPOINT` if it is set
    pub fn with_env_overrides(self) -> Self {
        let value = std::env::var(ENDPOINT_ENV_VAR).ok();
        self.with_endpoint_override(value)
    }

    pub fn with_endpoint_override(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            tracing::debug!("Endpoint overridden to {}", url);
            self.endpoint.base_url = url;
        }
        self
    }

    /// Directory auto-saved results go to
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}
