// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{
    MinerConfig, ProviderConfig, StatusConfig, DEFAULT_EMBEDDING_DIMENSIONS,
    DEFAULT_EMBEDDING_MODEL, DEFAULT_LISTEN_ADDR, DEFAULT_MAX_RETRIES, DEFAULT_OPENAI_BASE_URL,
    DEFAULT_RETRY_BACKOFF_MS, DEFAULT_STATUS_INTERVAL_SECS, DEFAULT_STATUS_WARMUP_SECS,
    DEFAULT_TIMEOUT_SECS,
};

/// Text embedding miner
#[derive(Parser, Debug, Clone)]
#[command(name = "embedding-miner")]
#[command(version = crate::version::VERSION_NUMBER)]
#[command(about = "Answers text embedding requests from network peers", long_about = None)]
pub struct Cli {
    /// API key for the embedding provider
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Organization identifier sent with provider requests
    #[arg(long, env = "OPENAI_ORGANIZATION")]
    pub openai_organization: Option<String>,

    /// Project identifier sent with provider requests
    #[arg(long, env = "OPENAI_PROJECT")]
    pub openai_project: Option<String>,

    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_OPENAI_BASE_URL)]
    pub openai_base_url: String,

    #[arg(long, env = "EMBEDDING_MODEL", default_value = DEFAULT_EMBEDDING_MODEL)]
    pub embedding_model: String,

    /// Dimensions used when a request does not specify any
    #[arg(long, env = "EMBEDDING_DIMENSIONS", default_value_t = DEFAULT_EMBEDDING_DIMENSIONS)]
    pub embedding_dimensions: u32,

    /// Timeout for each provider attempt
    #[arg(long, env = "PROVIDER_TIMEOUT_SECONDS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// Retries after the first failed provider attempt
    #[arg(long, env = "PROVIDER_MAX_RETRIES", default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,

    #[arg(long, env = "PROVIDER_RETRY_BACKOFF_MS", default_value_t = DEFAULT_RETRY_BACKOFF_MS)]
    pub retry_backoff_ms: u64,

    /// Local identity key (ss58 hotkey) to report status for
    #[arg(long, env = "MINER_HOTKEY")]
    pub hotkey: String,

    /// JSON snapshot of the ranking table
    #[arg(long, env = "NETWORK_SNAPSHOT_PATH", default_value = "./metagraph.json")]
    pub network_snapshot: PathBuf,

    #[arg(long, env = "STATUS_INTERVAL_SECS", default_value_t = DEFAULT_STATUS_INTERVAL_SECS)]
    pub status_interval_secs: u64,

    #[arg(long, env = "STATUS_WARMUP_SECS", default_value_t = DEFAULT_STATUS_WARMUP_SECS)]
    pub status_warmup_secs: u64,

    #[arg(long, env = "MINER_LISTEN_ADDR", default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,
}

impl Cli {
    pub fn into_config(self) -> MinerConfig {
        MinerConfig {
            provider: ProviderConfig {
                api_key: self.openai_api_key,
                organization: self.openai_organization,
                project: self.openai_project,
                base_url: self.openai_base_url,
                model: self.embedding_model,
                default_dimensions: self.embedding_dimensions,
                timeout_seconds: self.timeout_seconds,
                max_retries: self.max_retries,
                retry_backoff_ms: self.retry_backoff_ms,
            },
            status: StatusConfig {
                hotkey: self.hotkey,
                snapshot_path: self.network_snapshot,
                interval: Duration::from_secs(self.status_interval_secs),
                warmup: Duration::from_secs(self.status_warmup_secs),
            },
            listen_addr: self.listen_addr,
        }
    }
}

impl From<Cli> for MinerConfig {
    fn from(cli: Cli) -> Self {
        cli.into_config()
    }
}
