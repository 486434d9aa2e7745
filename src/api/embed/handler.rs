// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Text embedding request handling
//!
//! Provider failures never fail the request outward: the reply degrades to
//! one without `results` so the peer always receives a well-formed response.

use std::sync::Arc;
use tracing::{debug, error, info};

use crate::api::embed::{EmbeddingRequest, EmbeddingResponse};
use crate::embeddings::EmbeddingClient;
use crate::network::AccessGuard;
use crate::version::VersionGuard;

pub struct RequestHandler {
    client: Arc<EmbeddingClient>,
    version_guard: VersionGuard,
    access_guard: AccessGuard,
    default_dimensions: u32,
}

impl RequestHandler {
    pub fn new(
        client: Arc<EmbeddingClient>,
        version_guard: VersionGuard,
        access_guard: AccessGuard,
        default_dimensions: u32,
    ) -> Self {
        Self {
            client,
            version_guard,
            access_guard,
            default_dimensions,
        }
    }

    /// Block height as of the last refresh, for log context
    ///
    /// Skipped when the view is busy or not loaded yet. Never touches the disk.
    fn observed_block(&self) -> Option<u64> {
        self.access_guard
            .try_read(|view| view.current_block())
            .and_then(Result::ok)
    }

    /// Answer one embedding request
    ///
    /// The returned response carries the resolved `dimensions`.
    pub async fn handle(&self, mut request: EmbeddingRequest) -> EmbeddingResponse {
        self.version_guard.check(request.version.as_deref());

        let dimensions = request.resolved_dimensions(self.default_dimensions);
        request.dimensions = Some(dimensions);

        debug!(
            "Embedding request: {} texts, {} dimensions, block {:?}",
            request.texts.len(),
            dimensions,
            self.observed_block()
        );

        match self.client.embed(&request.texts, dimensions).await {
            Ok(results) => {
                info!(
                    "Embedded {} texts at {} dimensions",
                    results.len(),
                    dimensions
                );
                EmbeddingResponse::with_results(request, results)
            }
            Err(failure) => {
                error!(
                    "Embedding failed for {} texts, returning empty results: {}",
                    request.texts.len(),
                    failure
                );
                EmbeddingResponse::degraded(request)
            }
        }
    }
}
