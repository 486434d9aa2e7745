// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod embed;
pub mod errors;
pub mod http_server;

pub use embed::{EmbeddingRequest, EmbeddingResponse, RequestHandler};
pub use errors::{ApiError, ErrorResponse};
pub use http_server::{create_app, start_server, AppState, TEXT_EMBEDDING_ROUTE};
