// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! EmbeddingRequest type for the text embedding synapse

use crate::api::ApiError;
use serde::{Deserialize, Serialize};

/// Inbound text embedding request from a peer
///
/// # Fields
/// - `texts`: Strings to embed, in order (may be empty)
/// - `dimensions`: Length of each returned vector; the miner default applies when absent
/// - `version`: Protocol version the peer is running
///
/// # Example
/// ```json
/// {
///   "texts": ["Hello world", "Another text"],
///   "dimensions": 512,
///   "version": "1.0.0"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    #[serde(default)]
    pub texts: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl EmbeddingRequest {
    pub fn new(texts: Vec<String>, dimensions: u32) -> Self {
        Self {
            texts,
            dimensions: Some(dimensions),
            version: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Dimensions to request from the provider
    pub fn resolved_dimensions(&self, default_dimensions: u32) -> u32 {
        self.dimensions.unwrap_or(default_dimensions)
    }

    /// Protocol-level validation applied before the request reaches the handler
    ///
    /// # Validation Rules
    /// 1. **dimensions**: Must be positive when present
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.dimensions == Some(0) {
            return Err(ApiError::ValidationError {
                field: "dimensions".to_string(),
                message: "dimensions must be a positive integer".to_string(),
            });
        }
        Ok(())
    }
}
