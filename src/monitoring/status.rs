// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Periodic miner status reporting
//!
//! Every tick the reporter takes the [`AccessGuard`], refreshes the view,
//! reads the epoch, our position in the ranking table, the block height and
//! our ranking metrics, releases the lock, then logs one status line. The
//! section runs on the blocking pool since refreshing may touch the disk. Read failures are logged
//! and retried on the next tick. An identity missing from the ranking table
//! halts the reporter.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::StatusConfig;
use crate::network::{AccessGuard, NetworkViewError, RankingMetrics};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StatusError {
    #[error("Identity {hotkey} is not registered in the ranking table")]
    IdentityNotFound { hotkey: String },

    #[error("Network view read failed: {0}")]
    ViewRead(#[from] NetworkViewError),
}

impl StatusError {
    /// Fatal errors stop the reporter, everything else waits for the next tick
    pub fn is_fatal(&self) -> bool {
        matches!(self, StatusError::IdentityNotFound { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReporterState {
    /// Waiting for the next tick
    Idle,
    /// Reading and logging a snapshot
    Sampling,
    /// Stopped after a configuration defect
    Halted,
}

/// Point-in-time read of our standing on the network
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub timestamp: DateTime<Utc>,
    pub epoch: u64,
    pub uid: u16,
    pub block: u64,
    pub stake: f64,
    pub rank: f64,
    pub trust: f64,
    pub consensus: f64,
    pub incentive: f64,
    pub emission: f64,
}

impl StatusSnapshot {
    fn new(epoch: u64, uid: u16, block: u64, metrics: RankingMetrics) -> Self {
        Self {
            timestamp: Utc::now(),
            epoch,
            uid,
            block,
            stake: metrics.stake,
            rank: metrics.rank,
            trust: metrics.trust,
            consensus: metrics.consensus,
            incentive: metrics.incentive,
            emission: metrics.emission,
        }
    }
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Miner | Time:{} | Epoch:{} | UID:{} | Block:{} | Stake:{} | Rank:{} | \
             Trust:{} | Consensus:{} | Incentive:{} | Emission:{}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.epoch,
            self.uid,
            self.block,
            self.stake,
            self.rank,
            self.trust,
            self.consensus,
            self.incentive,
            self.emission
        )
    }
}

pub struct StatusReporter {
    guard: AccessGuard,
    hotkey: String,
    interval: Duration,
    warmup: Duration,
    state: watch::Sender<ReporterState>,
}

impl StatusReporter {
    pub fn new(
        guard: AccessGuard,
        hotkey: impl Into<String>,
        interval: Duration,
        warmup: Duration,
    ) -> Self {
        let (state, _) = watch::channel(ReporterState::Idle);
        Self {
            guard,
            hotkey: hotkey.into(),
            interval,
            warmup,
            state,
        }
    }

    pub fn from_config(guard: AccessGuard, config: &StatusConfig) -> Self {
        Self::new(guard, config.hotkey.clone(), config.interval, config.warmup)
    }

    pub fn state(&self) -> ReporterState {
        *self.state.borrow()
    }

    /// Watch state transitions, e.g. for a health endpoint
    pub fn subscribe(&self) -> watch::Receiver<ReporterState> {
        self.state.subscribe()
    }

    /// Read one snapshot under the access lock
    ///
    /// The view is refreshed once, then every field comes from that same
    /// state, so the metrics always belong to the reported UID.
    pub async fn sample(&self) -> Result<StatusSnapshot, StatusError> {
        let hotkey = self.hotkey.clone();
        self.guard
            .read_blocking(move |view| -> Result<StatusSnapshot, StatusError> {
                view.refresh()?;
                let uid = view
                    .identity_index_for(&hotkey)?
                    .ok_or(StatusError::IdentityNotFound { hotkey })?;
                let epoch = view.epoch()?;
                let block = view.current_block()?;
                let metrics = view.ranking_metrics(uid)?;
                Ok(StatusSnapshot::new(epoch, uid, block, metrics))
            })
            .await?
    }

    /// Sample and log once
    ///
    /// Returns `Ok(None)` when the read failed transiently. Only fatal
    /// errors are returned as `Err`.
    pub async fn tick(&self) -> Result<Option<StatusSnapshot>, StatusError> {
        self.state.send_replace(ReporterState::Sampling);
        let result = self.sample().await;

        match result {
            Ok(snapshot) => {
                info!("{}", snapshot);
                self.state.send_replace(ReporterState::Idle);
                Ok(Some(snapshot))
            }
            Err(e) if e.is_fatal() => {
                error!("Status reporter halted: {}", e);
                self.state.send_replace(ReporterState::Halted);
                Err(e)
            }
            Err(e) => {
                warn!("Status read failed, retrying next tick: {}", e);
                self.state.send_replace(ReporterState::Idle);
                Ok(None)
            }
        }
    }

    /// Report until cancelled or a fatal error occurs
    ///
    /// Cancellation is observed during the warm-up delay and between ticks,
    /// never in the middle of a sample.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), StatusError> {
        info!(
            "Status reporter for {} starting in {}s, interval {}s",
            self.hotkey,
            self.warmup.as_secs(),
            self.interval.as_secs()
        );

        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Status reporter cancelled during warm-up");
                return Ok(());
            }
            _ = sleep(self.warmup) => {}
        }

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Status reporter stopped");
                    return Ok(());
                }
                _ = ticker.tick() => {}
            }

            debug!("Status tick");
            self.tick().await?;
        }
    }
}
