// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Router wiring for the embedding synapse

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use embedding_miner::api::{create_app, AppState, RequestHandler, TEXT_EMBEDDING_ROUTE};
use embedding_miner::embeddings::{EmbeddingClient, RetryPolicy};
use embedding_miner::monitoring::ReporterState;
use embedding_miner::network::AccessGuard;
use embedding_miner::version::VersionGuard;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tower::ServiceExt; // for `oneshot`

use super::mocks::{Behaviour, CountingView, ScriptedProvider};

fn app(behaviour: Behaviour) -> axum::Router {
    let client = EmbeddingClient::new(
        Arc::new(ScriptedProvider::new(behaviour)),
        "m",
        RetryPolicy {
            timeout: Duration::from_secs(1),
            max_retries: 0,
            backoff: Duration::ZERO,
        },
    );
    let handler = RequestHandler::new(
        Arc::new(client),
        VersionGuard::default(),
        AccessGuard::new(CountingView::new(&["5Fminer"])),
        4,
    );
    let (_tx, rx) = watch::channel(ReporterState::Idle);
    create_app(AppState::new(Arc::new(handler), rx))
}

async fn post_json(app: axum::Router, body: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(TEXT_EMBEDDING_ROUTE)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_embedding_route_returns_results() {
    let (status, json) = post_json(
        app(Behaviour::Zeros),
        r#"{"texts": ["a", "b"], "dimensions": 3, "version": "1.0.0"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["results"].as_array().unwrap().len(), 2);
    assert_eq!(json["results"][0].as_array().unwrap().len(), 3);
    assert_eq!(json["texts"][1], "b");
}

#[tokio::test]
async fn test_missing_dimensions_use_default() {
    let (status, json) = post_json(app(Behaviour::Zeros), r#"{"texts": ["a"]}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["dimensions"], 4);
    assert_eq!(json["results"][0].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_provider_failure_still_returns_ok() {
    let (status, json) =
        post_json(app(Behaviour::Transient), r#"{"texts": ["a"], "dimensions": 3}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json.get("results").is_none());
    assert_eq!(json["texts"][0], "a");
}

#[tokio::test]
async fn test_zero_dimensions_rejected_at_protocol_layer() {
    let (status, json) =
        post_json(app(Behaviour::Zeros), r#"{"texts": ["a"], "dimensions": 0}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error_type"], "validation_error");
}

#[tokio::test]
async fn test_health_reports_reporter_state() {
    let response = app(Behaviour::Zeros)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["status_reporter"], "idle");
    assert_eq!(json["version"], embedding_miner::version::VERSION_NUMBER);
    assert_eq!(json["synapses"][0], "TextEmbeddingSynapse");
}

#[tokio::test]
async fn test_malformed_body_is_invalid_request() {
    let (status, json) = post_json(app(Behaviour::Zeros), r#"{"texts": "not-a-list"}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error_type"], "invalid_request");
    assert!(!json["message"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let response = app(Behaviour::Zeros)
        .oneshot(
            Request::builder()
                .uri("/ImageSynapse")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["error_type"], "not_found");
    assert!(json["message"].as_str().unwrap().contains("/ImageSynapse"));
}
