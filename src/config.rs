//! Deployment configuration
//!
//! Values are read once at startup and stay fixed for the process lifetime.

use axum::http::HeaderName;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::canvas::Color;

/// Grid side length used when none is configured
pub const CANVAS_SIZE: usize = 50;
/// Initial color of every cell
pub const DEFAULT_COLOR: &str = "#FFFFFF";
/// Length of the window after a placement during which the same identity is blocked
pub const COOLDOWN_INTERVAL_MS: i64 = 15_000;

const MAX_CANVAS_SIZE: usize = 1024;
/// One day
const MAX_COOLDOWN_INTERVAL_MS: i64 = 24 * 60 * 60 * 1000;

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaceConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub canvas: CanvasConfig,

    #[serde(default)]
    pub cooldown: CooldownConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,

    /// Log level for this crate's targets
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Header carrying the identity resolved by the upstream auth proxy
    #[serde(default = "default_identity_header")]
    pub identity_header: String,
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_identity_header() -> String {
    "x-place-user".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
            log_level: default_log_level(),
            identity_header: default_identity_header(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasConfig {
    #[serde(default = "default_size")]
    pub size: usize,

    #[serde(default = "default_color")]
    pub default_color: String,
}

fn default_size() -> usize {
    CANVAS_SIZE
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            size: default_size(),
            default_color: default_color(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CooldownConfig {
    #[serde(default = "default_interval")]
    pub interval_ms: i64,
}

fn default_interval() -> i64 {
    COOLDOWN_INTERVAL_MS
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval(),
        }
    }
}

/// Which backing store holds the canvas and cooldown documents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Process-local, lost on restart
    #[default]
    Memory,
    /// Durable SQLite file
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// SQLite database file
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("place.db")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_db_path(),
        }
    }
}

impl PlaceConfig {
    /// Load configuration from a TOML file
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a TOML string
    pub fn load_str(content: &str) -> Result<Self, ConfigError> {
        let config: PlaceConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas.size == 0 || self.canvas.size > MAX_CANVAS_SIZE {
            return Err(ConfigError::Validation(format!(
                "canvas size must be between 1 and {}, got {}",
                MAX_CANVAS_SIZE, self.canvas.size
            )));
        }

        if Color::parse(&self.canvas.default_color).is_err() {
            return Err(ConfigError::Validation(format!(
                "default color '{}' is not a hex color",
                self.canvas.default_color
            )));
        }

        let interval = self.cooldown.interval_ms;
        if interval <= 0 || interval > MAX_COOLDOWN_INTERVAL_MS {
            return Err(ConfigError::Validation(format!(
                "cooldown interval must be between 1 and {} ms, got {}",
                MAX_COOLDOWN_INTERVAL_MS, interval
            )));
        }

        if HeaderName::from_bytes(self.server.identity_header.as_bytes()).is_err() {
            return Err(ConfigError::Validation(format!(
                "identity header '{}' is not a valid header name",
                self.server.identity_header
            )));
        }

        Ok(())
    }
}
