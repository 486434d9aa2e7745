// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Embedding provider trait definition

use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by an embedding provider for a single call
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderError {
    /// Connection reset, DNS failure and similar
    #[error("Transport error: {0}")]
    Transport(String),

    /// Provider answered with a non-success status
    #[error("Provider API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Provider asked us to slow down
    #[error("Rate limited by provider")]
    RateLimited,

    /// Provider-side timeout surfaced by the HTTP stack
    #[error("Provider request timed out")]
    Timeout,

    /// Input the provider will never accept
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Response body did not have the expected shape
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    /// Whether another attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Transport(_) | ProviderError::RateLimited | ProviderError::Timeout => {
                true
            }
            ProviderError::Api { status, .. } => {
                matches!(*status, 408 | 409 | 429) || *status >= 500
            }
            ProviderError::InvalidInput(_) | ProviderError::MalformedResponse(_) => false,
        }
    }
}

/// External service turning texts into fixed-size vectors
///
/// Implementations return one vector per input text, in input order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(
        &self,
        texts: &[String],
        dimensions: u32,
        model: &str,
    ) -> Result<Vec<Vec<f32>>, ProviderError>;

    /// Get the provider name for logging
    fn name(&self) -> &'static str;
}
