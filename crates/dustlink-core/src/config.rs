//! Configuration for the converter.
//!
//! Resolution order: command-line arguments → environment variables →
//! config file → defaults. This module covers the last three; the binary
//! applies its arguments on top.
//!
//! Config file location:
//!   1. $DUSTLINK_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/dustlink/config.toml
//!   3. ~/.config/dustlink/config.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::time::TimestampMode;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DustlinkConfig {
    pub paths: PathsConfig,
    pub codec: CodecConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Hourly AQI CSV to read.
    pub input: PathBuf,
    /// Hex packet file to write.
    pub output: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub timestamp_mode: TimestampMode,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

pub const DEFAULT_INPUT: &str = "dust_aqi.csv";
pub const DEFAULT_OUTPUT: &str = "hex_packet.dat";

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
        .join("dustlink")
}

fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("invalid value for {0}: {1}")]
    InvalidEnv(&'static str, String),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl DustlinkConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::file_path();
        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            DustlinkConfig::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("DUSTLINK_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFailed(path.to_path_buf(), e))?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.to_path_buf(), e))
    }

    /// Apply DUSTLINK_* overrides, looking each key up through `var`.
    pub fn apply_env_overrides(
        &mut self,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(v) = var("DUSTLINK_PATHS__INPUT") {
            self.paths.input = PathBuf::from(v);
        }
        if let Some(v) = var("DUSTLINK_PATHS__OUTPUT") {
            self.paths.output = PathBuf::from(v);
        }
        if let Some(v) = var("DUSTLINK_CODEC__TIMESTAMP_MODE") {
            self.codec.timestamp_mode = v
                .parse()
                .map_err(|e| ConfigError::InvalidEnv("DUSTLINK_CODEC__TIMESTAMP_MODE", e))?;
        }
        Ok(())
    }
}
