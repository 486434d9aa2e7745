// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Call contract around an [`EmbeddingProvider`]
//!
//! Each attempt runs under its own timeout. Transient failures and timeouts
//! consume the retry budget; non-retryable errors and shape mismatches end
//! the call immediately. Nothing from the provider escapes as a panic or an
//! untyped error: callers always get an [`EmbeddingFailure`].

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use super::provider::{EmbeddingProvider, ProviderError};
use crate::config::ProviderConfig;

/// Timeout and retry bounds for provider calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Budget for each attempt, independent of earlier attempts
    pub timeout: Duration,
    /// Attempts after the first one
    pub max_retries: u32,
    /// Pause between attempts
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            max_retries: 2,
            backoff: Duration::from_millis(500),
        }
    }
}

impl From<&ProviderConfig> for RetryPolicy {
    fn from(config: &ProviderConfig) -> Self {
        Self {
            timeout: config.timeout(),
            max_retries: config.max_retries,
            backoff: config.retry_backoff(),
        }
    }
}

/// Result of one attempt against the provider
#[derive(Debug)]
pub enum CallOutcome {
    Success(Vec<Vec<f32>>),
    TransientFailure(ProviderError),
    /// Provider error that retrying will not fix
    Rejected(ProviderError),
    Timeout,
}

/// Why an embedding call produced no vectors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EmbeddingFailure {
    #[error("Provider failed after {attempts} attempts: {cause}")]
    Transient { attempts: u32, cause: ProviderError },

    #[error("Provider timed out after {attempts} attempts of {timeout_ms}ms")]
    Timeout { attempts: u32, timeout_ms: u64 },

    #[error("Provider rejected request on attempt {attempts}: {cause}")]
    Rejected { attempts: u32, cause: ProviderError },

    #[error("Provider contract violation on attempt {attempts}: {reason}")]
    ContractViolation { attempts: u32, reason: String },
}

impl EmbeddingFailure {
    /// Number of provider attempts made before giving up
    pub fn attempts(&self) -> u32 {
        match self {
            EmbeddingFailure::Transient { attempts, .. }
            | EmbeddingFailure::Timeout { attempts, .. }
            | EmbeddingFailure::Rejected { attempts, .. }
            | EmbeddingFailure::ContractViolation { attempts, .. } => *attempts,
        }
    }

    pub fn is_contract_violation(&self) -> bool {
        matches!(self, EmbeddingFailure::ContractViolation { .. })
    }
}

/// Check that the provider returned `expected` vectors of `dimensions` each
pub fn validate_shape(
    vectors: &[Vec<f32>],
    expected: usize,
    dimensions: u32,
) -> Result<(), String> {
    if vectors.len() != expected {
        return Err(format!(
            "expected {} vectors, provider returned {}",
            expected,
            vectors.len()
        ));
    }
    for (index, vector) in vectors.iter().enumerate() {
        if vector.len() != dimensions as usize {
            return Err(format!(
                "vector {} has {} dimensions, expected {}",
                index,
                vector.len(),
                dimensions
            ));
        }
    }
    Ok(())
}

pub struct EmbeddingClient {
    provider: Arc<dyn EmbeddingProvider>,
    model: String,
    policy: RetryPolicy,
}

impl EmbeddingClient {
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        model: impl Into<String>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            policy,
        }
    }

    pub fn from_config(provider: Arc<dyn EmbeddingProvider>, config: &ProviderConfig) -> Self {
        Self::new(provider, config.model.clone(), RetryPolicy::from(config))
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run one attempt under the policy timeout
    ///
    /// Dropping the provider future on timeout abandons the in-flight call.
    async fn attempt(&self, texts: &[String], dimensions: u32) -> CallOutcome {
        let call = self.provider.embed(texts, dimensions, &self.model);
        match tokio::time::timeout(self.policy.timeout, call).await {
            Ok(Ok(vectors)) => CallOutcome::Success(vectors),
            Ok(Err(e)) if e.is_retryable() => CallOutcome::TransientFailure(e),
            Ok(Err(e)) => CallOutcome::Rejected(e),
            Err(_) => CallOutcome::Timeout,
        }
    }

    /// Embed `texts` into vectors of length `dimensions`
    ///
    /// On success the result has exactly one vector per text, each of
    /// length `dimensions`.
    pub async fn embed(
        &self,
        texts: &[String],
        dimensions: u32,
    ) -> Result<Vec<Vec<f32>>, EmbeddingFailure> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        if dimensions == 0 {
            return Err(EmbeddingFailure::Rejected {
                attempts: 0,
                cause: ProviderError::InvalidInput("dimensions must be positive".to_string()),
            });
        }

        let max_attempts = self.policy.max_attempts();
        let mut last_failure = None;

        for attempt in 1..=max_attempts {
            if attempt > 1 && !self.policy.backoff.is_zero() {
                tokio::time::sleep(self.policy.backoff).await;
            }

            match self.attempt(texts, dimensions).await {
                CallOutcome::Success(vectors) => {
                    if let Err(reason) = validate_shape(&vectors, texts.len(), dimensions) {
                        warn!(
                            "Provider {} violated response contract on attempt {}: {}",
                            self.provider.name(),
                            attempt,
                            reason
                        );
                        return Err(EmbeddingFailure::ContractViolation {
                            attempts: attempt,
                            reason,
                        });
                    }
                    debug!(
                        "Embedded {} texts at {} dimensions on attempt {}",
                        texts.len(),
                        dimensions,
                        attempt
                    );
                    return Ok(vectors);
                }
                CallOutcome::Rejected(ProviderError::MalformedResponse(reason)) => {
                    warn!(
                        "Provider {} returned a malformed response on attempt {}: {}",
                        self.provider.name(),
                        attempt,
                        reason
                    );
                    return Err(EmbeddingFailure::ContractViolation {
                        attempts: attempt,
                        reason,
                    });
                }
                CallOutcome::Rejected(cause) => {
                    warn!(
                        "Provider {} rejected request on attempt {}: {}",
                        self.provider.name(),
                        attempt,
                        cause
                    );
                    return Err(EmbeddingFailure::Rejected {
                        attempts: attempt,
                        cause,
                    });
                }
                CallOutcome::TransientFailure(cause) => {
                    warn!(
                        "Provider {} attempt {}/{} failed: {}",
                        self.provider.name(),
                        attempt,
                        max_attempts,
                        cause
                    );
                    last_failure = Some(EmbeddingFailure::Transient {
                        attempts: attempt,
                        cause,
                    });
                }
                CallOutcome::Timeout => {
                    warn!(
                        "Provider {} attempt {}/{} timed out after {}ms",
                        self.provider.name(),
                        attempt,
                        max_attempts,
                        self.policy.timeout.as_millis()
                    );
                    last_failure = Some(EmbeddingFailure::Timeout {
                        attempts: attempt,
                        timeout_ms: self.policy.timeout.as_millis() as u64,
                    });
                }
            }
        }

        Err(last_failure.unwrap_or(EmbeddingFailure::Transient {
            attempts: 0,
            cause: ProviderError::Transport("no attempts were made".to_string()),
        }))
    }
}
