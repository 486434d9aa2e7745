// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP transport exposing the embedding handler to peers

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::Uri,
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::embed::{EmbeddingRequest, EmbeddingResponse, RequestHandler};
use super::ApiError;
use crate::monitoring::ReporterState;
use crate::version;

/// Route peers use to reach the embedding handler
pub const TEXT_EMBEDDING_ROUTE: &str = "/TextEmbeddingSynapse";

#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<RequestHandler>,
    pub reporter_state: watch::Receiver<ReporterState>,
}

impl AppState {
    pub fn new(handler: Arc<RequestHandler>, reporter_state: watch::Receiver<ReporterState>) -> Self {
        Self {
            handler,
            reporter_state,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(TEXT_EMBEDDING_ROUTE, post(text_embedding_handler))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let reporter = *state.reporter_state.borrow();
    let mut body = version::get_version_info();
    body["status"] = json!("ok");
    body["status_reporter"] = json!(reporter);
    Json(body)
}

async fn text_embedding_handler(
    State(state): State<AppState>,
    payload: Result<Json<EmbeddingRequest>, JsonRejection>,
) -> Result<Json<EmbeddingResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    request.validate()?;
    Ok(Json(state.handler.handle(request).await))
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}

/// Serve until `shutdown` is cancelled
pub async fn start_server(
    addr: SocketAddr,
    state: AppState,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("API server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}
