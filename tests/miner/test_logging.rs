// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Log lines emitted by version checks, request handling and status ticks

use embedding_miner::api::{EmbeddingRequest, RequestHandler};
use embedding_miner::embeddings::{EmbeddingClient, RetryPolicy};
use embedding_miner::logging;
use embedding_miner::monitoring::StatusReporter;
use embedding_miner::network::AccessGuard;
use embedding_miner::version::{self, VersionGuard};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::mocks::{texts, Behaviour, CountingView, ScriptedProvider};

/// In-memory sink for a fmt subscriber
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture(directives: Option<&str>) -> (impl tracing::Subscriber + Send + Sync, CapturedLogs) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(logging::filter_from(directives))
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();
    (subscriber, logs)
}

#[test]
fn test_malformed_version_logs_parse_warning() {
    let (subscriber, logs) = capture(None);
    let advisory = tracing::subscriber::with_default(subscriber, || {
        version::check(Some("bad-string"), "1.1.0")
    });

    assert!(advisory.is_none());
    let output = logs.contents();
    assert!(output.contains("WARN"), "{}", output);
    assert!(
        output.contains("Could not parse request version 'bad-string'"),
        "{}",
        output
    );
}

#[test]
fn test_newer_version_logs_advisory() {
    let (subscriber, logs) = capture(None);
    tracing::subscriber::with_default(subscriber, || {
        version::check(Some("1.2.0"), "1.1.9");
    });

    let output = logs.contents();
    assert!(output.contains("WARN"), "{}", output);
    assert!(
        output.contains(
            "Received request with version 1.2.0, is newer than miner running version 1.1.9"
        ),
        "{}",
        output
    );
}

#[test]
fn test_debug_lines_follow_filter_directives() {
    let (subscriber, logs) = capture(None);
    tracing::subscriber::with_default(subscriber, || {
        version::check(Some("0.9.0"), "1.0.0");
    });
    assert!(!logs.contents().contains("older version, no action"));

    let (subscriber, logs) = capture(Some("embedding_miner=debug"));
    tracing::subscriber::with_default(subscriber, || {
        version::check(Some("0.9.0"), "1.0.0");
    });
    let output = logs.contents();
    assert!(output.contains("DEBUG"), "{}", output);
    assert!(output.contains("older version, no action"), "{}", output);
}

#[test]
fn test_unparseable_directives_fall_back_to_info() {
    let (subscriber, logs) = capture(Some("embedding_miner=notalevel"));
    tracing::subscriber::with_default(subscriber, || {
        version::check(Some("0.9.0"), "1.0.0");
        version::check(Some("2.0.0"), "1.0.0");
    });

    let output = logs.contents();
    assert!(!output.contains("older version, no action"), "{}", output);
    assert!(output.contains("is newer than miner running version"), "{}", output);
}

#[tokio::test]
async fn test_end_to_end_request_logs() {
    let client = EmbeddingClient::new(
        Arc::new(ScriptedProvider::new(Behaviour::Fixed(vec![
            vec![0.0, 0.0, 0.0],
            vec![1.0, 1.0, 1.0],
        ]))),
        "text-embedding-3-large",
        RetryPolicy::default(),
    );
    let handler = RequestHandler::new(
        Arc::new(client),
        VersionGuard::new("1.0.0"),
        AccessGuard::new(CountingView::new(&["5Fminer"])),
        512,
    );

    let (subscriber, logs) = capture(Some("debug"));
    let _default = tracing::subscriber::set_default(subscriber);

    let request = EmbeddingRequest::new(texts(&["a", "b"]), 3).with_version("0.9.0");
    let response = handler.handle(request).await;
    assert_eq!(response.embedding_count(), 2);

    let output = logs.contents();
    assert!(output.contains("older version, no action"), "{}", output);
    assert!(output.contains("block Some(4200000)"), "{}", output);
    assert!(output.contains("Embedded 2 texts at 3 dimensions"), "{}", output);
}

#[tokio::test]
async fn test_status_tick_logs_every_field() {
    let reporter = StatusReporter::new(
        AccessGuard::new(CountingView::new(&["5Fminer"])),
        "5Fminer",
        Duration::from_secs(5),
        Duration::ZERO,
    );

    let (subscriber, logs) = capture(None);
    let _default = tracing::subscriber::set_default(subscriber);

    reporter.tick().await.unwrap().unwrap();

    let output = logs.contents();
    for part in [
        " INFO ",
        "Miner | Time:",
        "Epoch:77",
        "UID:0",
        "Block:4200000",
        "Stake:1000",
        "Rank:0",
        "Trust:0.9",
        "Consensus:0.8",
        "Incentive:0.05",
        "Emission:12.5",
    ] {
        assert!(output.contains(part), "missing {} in {}", part, output);
    }
}
