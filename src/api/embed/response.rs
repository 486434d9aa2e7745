// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! EmbeddingResponse type for the text embedding synapse

use super::request::EmbeddingRequest;
use serde::{Deserialize, Serialize};

/// Reply to an [`EmbeddingRequest`]
///
/// Echoes the request fields and attaches `results`. A degraded reply
/// omits `results` entirely. When present, `results` holds one vector per
/// input text, each of length `dimensions`.
///
/// # Example
/// ```json
/// {
///   "texts": ["a", "b"],
///   "dimensions": 3,
///   "version": "0.9.0",
///   "results": [[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    #[serde(flatten)]
    pub request: EmbeddingRequest,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<Vec<f32>>>,
}

impl EmbeddingResponse {
    pub fn with_results(request: EmbeddingRequest, results: Vec<Vec<f32>>) -> Self {
        Self {
            request,
            results: Some(results),
        }
    }

    /// Well-formed reply without results
    pub fn degraded(request: EmbeddingRequest) -> Self {
        Self {
            request,
            results: None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.results.is_none()
    }

    /// Returns the number of embeddings in the response
    pub fn embedding_count(&self) -> usize {
        self.results.as_ref().map(Vec::len).unwrap_or(0)
    }
}
