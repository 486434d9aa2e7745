// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OpenAI-compatible embeddings provider
//!
//! Talks to `POST {base_url}/embeddings`. Retries and timeouts are owned by
//! [`super::EmbeddingClient`]; this type performs exactly one HTTP call.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::provider::{EmbeddingProvider, ProviderError};
use crate::config::{ConfigError, ProviderConfig};

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    input: &'a [String],
    model: &'a str,
    dimensions: u32,
    encoding_format: &'static str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

/// Embeddings provider speaking the OpenAI HTTP API
pub struct OpenAiEmbeddingProvider {
    client: Client,
    endpoint: String,
    api_key: String,
    organization: Option<String>,
    project: Option<String>,
}

impl OpenAiEmbeddingProvider {
    /// Create a provider from configuration
    ///
    /// Fails with `ConfigError::MissingApiKey` when no key is configured.
    pub fn new(config: &ProviderConfig) -> Result<Self, ConfigError> {
        let api_key = config.require_api_key()?.to_string();

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.timeout_seconds.max(1)))
            .build()
            .map_err(|e| ConfigError::Invalid {
                field: "http_client",
                reason: e.to_string(),
            })?;

        let endpoint = format!("{}/embeddings", config.base_url.trim_end_matches('/'));
        info!("Embedding provider configured: endpoint={}", endpoint);

        Ok(Self {
            client,
            endpoint,
            api_key,
            organization: config.organization.clone(),
            project: config.project.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn map_status(status: StatusCode, message: String) -> ProviderError {
    match status.as_u16() {
        429 => ProviderError::RateLimited,
        400 | 413 | 422 => ProviderError::InvalidInput(message),
        code => ProviderError::Api {
            status: code,
            message,
        },
    }
}

/// Order vectors by the provider-reported index
fn into_ordered_vectors(mut data: Vec<EmbeddingData>) -> Result<Vec<Vec<f32>>, ProviderError> {
    data.sort_by_key(|d| d.index);
    for (position, item) in data.iter().enumerate() {
        if item.index != position {
            return Err(ProviderError::MalformedResponse(format!(
                "unexpected embedding index {} at position {}",
                item.index, position
            )));
        }
    }
    Ok(data.into_iter().map(|d| d.embedding).collect())
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    async fn embed(
        &self,
        texts: &[String],
        dimensions: u32,
        model: &str,
    ) -> Result<Vec<Vec<f32>>, ProviderError> {
        let body = EmbeddingsRequest {
            input: texts,
            model,
            dimensions,
            encoding_format: "float",
        };

        let mut request = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body);
        if let Some(ref organization) = self.organization {
            request = request.header("OpenAI-Organization", organization);
        }
        if let Some(ref project) = self.project {
            request = request.header("OpenAI-Project", project);
        }

        debug!("Embedding POST {} ({} texts)", self.endpoint, texts.len());
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout
            } else {
                ProviderError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(map_status(status, message));
        }

        let parsed: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(format!("JSON parse error: {}", e)))?;

        into_ordered_vectors(parsed.data)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
