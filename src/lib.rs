// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod config;
pub mod embeddings;
pub mod logging;
pub mod monitoring;
pub mod network;
pub mod version;

// Re-export main types
pub use api::{EmbeddingRequest, EmbeddingResponse, RequestHandler};
pub use config::{ConfigError, MinerConfig};
pub use embeddings::{EmbeddingClient, EmbeddingFailure, EmbeddingProvider, RetryPolicy};
pub use monitoring::{StatusReporter, StatusSnapshot};
pub use network::{AccessGuard, NetworkView};
pub use version::VersionGuard;
