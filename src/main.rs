// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use embedding_miner::{
    api::{start_server, AppState, RequestHandler},
    cli::Cli,
    config::MinerConfig,
    embeddings::{EmbeddingClient, OpenAiEmbeddingProvider},
    logging,
    monitoring::StatusReporter,
    network::{AccessGuard, SnapshotFileView},
    version::{self, VersionGuard},
};
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    logging::init_logging();

    let config: MinerConfig = Cli::parse().into();
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return Err(e.into());
    }

    println!("🚀 Starting {}...", version::get_version_string());
    println!("🔑 My Miner hotkey: {}", config.status.hotkey);
    println!();

    let provider = Arc::new(OpenAiEmbeddingProvider::new(&config.provider)?);
    let client = Arc::new(EmbeddingClient::from_config(provider, &config.provider));
    info!(
        "Embedding client: model={}, timeout={:?}, max_retries={}",
        client.model(),
        client.policy().timeout,
        client.policy().max_retries
    );

    let access_guard = AccessGuard::new(SnapshotFileView::new(&config.status.snapshot_path));
    let reporter = Arc::new(StatusReporter::from_config(
        access_guard.clone(),
        &config.status,
    ));
    let handler = Arc::new(RequestHandler::new(
        client,
        VersionGuard::default(),
        access_guard,
        config.provider.default_dimensions,
    ));

    let shutdown = CancellationToken::new();

    let reporter_task = {
        let reporter = reporter.clone();
        let cancel = shutdown.child_token();
        tokio::spawn(async move {
            // A halted reporter leaves request serving untouched
            if let Err(e) = reporter.run(cancel).await {
                error!("Status reporter stopped: {}", e);
            }
        })
    };

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received");
                signal_token.cancel();
            }
            Err(e) => error!("Failed to listen for shutdown signal: {}", e),
        }
    });

    let state = AppState::new(handler, reporter.subscribe());
    let served = start_server(config.listen_addr, state, shutdown.clone()).await;

    shutdown.cancel();
    if let Err(e) = reporter_task.await {
        warn!("Status reporter task failed to join: {}", e);
    }

    served?;
    info!("Miner stopped");
    Ok(())
}
