// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! RequestHandler fail-soft behaviour

use embedding_miner::api::{EmbeddingRequest, RequestHandler};
use embedding_miner::embeddings::{EmbeddingClient, RetryPolicy};
use embedding_miner::network::AccessGuard;
use embedding_miner::version::VersionGuard;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use super::mocks::{texts, Behaviour, CountingView, ScriptedProvider};

fn handler_with(provider: ScriptedProvider, running_version: &str) -> RequestHandler {
    let client = EmbeddingClient::new(
        Arc::new(provider),
        "text-embedding-3-large",
        RetryPolicy {
            timeout: Duration::from_millis(100),
            max_retries: 2,
            backoff: Duration::ZERO,
        },
    );
    RequestHandler::new(
        Arc::new(client),
        VersionGuard::new(running_version),
        AccessGuard::new(CountingView::new(&["5Fminer"])),
        512,
    )
}

#[tokio::test]
async fn test_end_to_end_older_peer_version() {
    let provider = ScriptedProvider::new(Behaviour::Fixed(vec![
        vec![0.0, 0.0, 0.0],
        vec![1.0, 1.0, 1.0],
    ]));
    let handler = handler_with(provider, "1.0.0");

    let request = EmbeddingRequest::new(texts(&["a", "b"]), 3).with_version("0.9.0");
    let response = handler.handle(request.clone()).await;

    assert_eq!(response.request, request);
    assert_eq!(
        response.results,
        Some(vec![vec![0.0, 0.0, 0.0], vec![1.0, 1.0, 1.0]])
    );
}

#[tokio::test]
async fn test_newer_peer_version_is_still_served() {
    let handler = handler_with(ScriptedProvider::new(Behaviour::Zeros), "1.0.0");

    let request = EmbeddingRequest::new(texts(&["a"]), 4).with_version("2.0.0");
    let response = handler.handle(request).await;

    assert_eq!(response.results, Some(vec![vec![0.0; 4]]));
}

#[tokio::test]
async fn test_malformed_peer_version_is_still_served() {
    let handler = handler_with(ScriptedProvider::new(Behaviour::Zeros), "1.0.0");

    let request = EmbeddingRequest::new(texts(&["a"]), 2).with_version("bad-string");
    assert!(!handler.handle(request).await.is_degraded());
}

#[tokio::test]
async fn test_transient_failure_degrades_to_empty_results() {
    let provider = ScriptedProvider::new(Behaviour::Transient);
    let calls = provider.calls();
    let handler = handler_with(provider, "1.0.0");

    let response = handler
        .handle(EmbeddingRequest::new(texts(&["a", "b", "c"]), 8))
        .await;

    assert!(response.is_degraded());
    assert_eq!(response.request.texts.len(), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_count_mismatch_never_returns_mismatched_results() {
    let provider = ScriptedProvider::new(Behaviour::Fixed(vec![vec![0.5; 3]; 3]));
    let handler = handler_with(provider, "1.0.0");

    let response = handler
        .handle(EmbeddingRequest::new(texts(&["a", "b"]), 3))
        .await;
    assert_eq!(response.results, None);
}

#[tokio::test(start_paused = true)]
async fn test_timeouts_degrade_without_blocking() {
    let provider = ScriptedProvider::new(Behaviour::Hang(Duration::from_secs(30)));
    let handler = handler_with(provider, "1.0.0");

    let response = handler
        .handle(EmbeddingRequest::new(texts(&["slow"]), 3))
        .await;
    assert!(response.is_degraded());
}

#[tokio::test]
async fn test_empty_texts_yield_empty_results() {
    let provider = ScriptedProvider::new(Behaviour::Transient);
    let calls = provider.calls();
    let handler = handler_with(provider, "1.0.0");

    let response = handler.handle(EmbeddingRequest::new(Vec::new(), 3)).await;
    assert_eq!(response.results, Some(Vec::new()));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_repeated_requests_are_independent() {
    let provider = ScriptedProvider::new(Behaviour::Zeros);
    let calls = provider.calls();
    let handler = Arc::new(handler_with(provider, "1.0.0"));

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let handler = handler.clone();
            tokio::spawn(async move {
                handler
                    .handle(EmbeddingRequest::new(vec![format!("text {}", i)], 2))
                    .await
            })
        })
        .collect();

    for task in futures::future::join_all(tasks).await {
        let response = task.unwrap();
        assert_eq!(response.embedding_count(), 1);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 8);
}
