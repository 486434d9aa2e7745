// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Miner configuration
//!
//! Values normally arrive through [`crate::cli::Cli`], which reads flags and
//! falls back to environment variables. `validate()` must pass before the
//! miner starts.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-large";
pub const DEFAULT_EMBEDDING_DIMENSIONS: u32 = 512;
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;
pub const DEFAULT_STATUS_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_STATUS_WARMUP_SECS: u64 = 120;
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8091";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY is required but was not provided")]
    MissingApiKey,
    #[error("Invalid configuration for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Settings for the external embedding provider
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub organization: Option<String>,
    pub project: Option<String>,
    pub base_url: String,
    pub model: String,
    /// Used when a request does not carry its own `dimensions`
    pub default_dimensions: u32,
    /// Budget for each individual attempt
    pub timeout_seconds: u64,
    /// Additional attempts after the first one
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Returns the API key, or `MissingApiKey` when absent or blank
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(ConfigError::MissingApiKey),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            organization: None,
            project: None,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            default_dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
        }
    }
}

/// Settings for the background status reporter
#[derive(Debug, Clone)]
pub struct StatusConfig {
    /// Local identity key looked up in the ranking table
    pub hotkey: String,
    pub snapshot_path: PathBuf,
    pub interval: Duration,
    /// Delay before the first tick so the network view can initialise
    pub warmup: Duration,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            hotkey: String::new(),
            snapshot_path: PathBuf::from("./metagraph.json"),
            interval: Duration::from_secs(DEFAULT_STATUS_INTERVAL_SECS),
            warmup: Duration::from_secs(DEFAULT_STATUS_WARMUP_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MinerConfig {
    pub provider: ProviderConfig,
    pub status: StatusConfig,
    pub listen_addr: SocketAddr,
}

impl MinerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.provider.require_api_key()?;

        if self.provider.timeout_seconds == 0 {
            return Err(ConfigError::Invalid {
                field: "timeout_seconds",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.provider.default_dimensions == 0 {
            return Err(ConfigError::Invalid {
                field: "embedding_dimensions",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.provider.model.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "embedding_model",
                reason: "must not be empty".to_string(),
            });
        }
        if self.status.hotkey.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "hotkey",
                reason: "must not be empty".to_string(),
            });
        }
        if self.status.interval.is_zero() {
            return Err(ConfigError::Invalid {
                field: "status_interval_secs",
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            status: StatusConfig::default(),
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8091)),
        }
    }
}
