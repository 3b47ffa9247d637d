//! Viewer configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::transport::{BatchTransport, SseTransport, Transport};
use crate::{DEFAULT_SPEED_PERCENT, Speed};

/// Config file read from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "crypta_trace.toml";
/// Environment variable overriding the solver URL.
pub const API_URL_ENV: &str = "CRYPTA_API_URL";

/// How traces are fetched from the solver service.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TransportMode {
    /// Server-sent events from `/solve`.
    #[default]
    Stream,
    /// One document from `/api/run-solver`.
    Batch,
}

/// Settings for the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct ViewerConfig {
    /// Base URL of the solver service.
    #[serde(default = "default_api_url")]
    #[setters(into)]
    api_url: String,

    /// Streaming or batch fetch.
    #[serde(default)]
    mode: TransportMode,

    /// Initial playback speed, 0-100.
    #[serde(default = "default_speed_percent")]
    speed_percent: u8,

    /// Where the TUI writes its log.
    #[serde(default = "default_log_file")]
    #[setters(into)]
    log_file: PathBuf,

    /// HTTP connect timeout.
    #[serde(default = "default_connect_timeout_secs")]
    connect_timeout_secs: u64,
}

#[instrument]
fn default_api_url() -> String {
    "http://localhost:5000".to_string()
}

#[instrument]
fn default_speed_percent() -> u8 {
    DEFAULT_SPEED_PERCENT
}

#[instrument]
fn default_log_file() -> PathBuf {
    PathBuf::from("crypta_trace.log")
}

#[instrument]
fn default_connect_timeout_secs() -> u64 {
    5
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            mode: TransportMode::default(),
            speed_percent: default_speed_percent(),
            log_file: default_log_file(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl ViewerConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(api_url = %config.api_url, mode = %config.mode, "Config loaded successfully");
        Ok(config)
    }

    /// Resolves the configuration for this run.
    ///
    /// An explicit `path` must exist. Without one, [`DEFAULT_CONFIG_FILE`]
    /// is used if present and defaults otherwise. [`API_URL_ENV`] then
    /// overrides the solver URL.
    #[instrument(skip(path))]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE)?,
            None => {
                debug!("No config file, using defaults");
                Self::default()
            }
        };

        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                debug!(%url, "Solver URL overridden from environment");
                config.api_url = url.trim().to_string();
            }
        }
        Ok(config)
    }

    /// Initial playback speed.
    pub fn speed(&self) -> Speed {
        Speed::new(self.speed_percent)
    }

    /// HTTP connect timeout.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Builds the HTTP transport selected by [`ViewerConfig::mode`].
    #[instrument(skip(self), fields(mode = %self.mode, api_url = %self.api_url))]
    pub fn build_transport(&self) -> Result<Arc<dyn Transport>, ConfigError> {
        let transport: Arc<dyn Transport> = match self.mode {
            TransportMode::Stream => Arc::new(
                SseTransport::new(&self.api_url, self.connect_timeout())
                    .map_err(|e| ConfigError::new(format!("Failed to build client: {}", e.kind)))?,
            ),
            TransportMode::Batch => Arc::new(
                BatchTransport::new(&self.api_url, self.connect_timeout())
                    .map_err(|e| ConfigError::new(format!("Failed to build client: {}", e.kind)))?,
            ),
        };
        info!(source = %transport.describe(), "Transport ready");
        Ok(transport)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
