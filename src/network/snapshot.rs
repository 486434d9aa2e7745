// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! JSON-file backed network view
//!
//! The network layer periodically dumps its ranking table to a JSON file;
//! this view reloads it on [`NetworkView::refresh`] whenever the file's
//! modification time changes. Accessors only read the loaded table.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::SystemTime;
use tracing::debug;

use super::view::{NetworkView, NetworkViewError, RankingMetrics};

/// Serialised ranking table, one column entry per registered identity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetagraphSnapshot {
    pub epoch: u64,
    pub block: u64,
    pub hotkeys: Vec<String>,
    pub stake: Vec<f64>,
    pub rank: Vec<f64>,
    pub trust: Vec<f64>,
    pub consensus: Vec<f64>,
    pub incentive: Vec<f64>,
    pub emission: Vec<f64>,
}

impl MetagraphSnapshot {
    pub fn index_of(&self, hotkey: &str) -> Option<u16> {
        self.hotkeys
            .iter()
            .position(|k| k == hotkey)
            .and_then(|i| u16::try_from(i).ok())
    }

    pub fn metrics(&self, index: u16) -> Result<RankingMetrics, NetworkViewError> {
        let i = index as usize;
        let column = |name: &str, values: &[f64]| {
            values.get(i).copied().ok_or_else(|| {
                NetworkViewError::Malformed(format!(
                    "column '{}' has no entry for index {}",
                    name, index
                ))
            })
        };

        if i >= self.hotkeys.len() {
            return Err(NetworkViewError::IndexOutOfRange {
                index,
                len: self.hotkeys.len(),
            });
        }

        Ok(RankingMetrics {
            stake: column("stake", &self.stake)?,
            rank: column("rank", &self.rank)?,
            trust: column("trust", &self.trust)?,
            consensus: column("consensus", &self.consensus)?,
            incentive: column("incentive", &self.incentive)?,
            emission: column("emission", &self.emission)?,
        })
    }
}

pub struct SnapshotFileView {
    path: PathBuf,
    loaded: Option<(SystemTime, MetagraphSnapshot)>,
}

impl SnapshotFileView {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            loaded: None,
        }
    }

    /// Table loaded by the last successful [`NetworkView::refresh`]
    fn cached(&self) -> Result<&MetagraphSnapshot, NetworkViewError> {
        self.loaded
            .as_ref()
            .map(|(_, snapshot)| snapshot)
            .ok_or_else(|| NetworkViewError::Unavailable("snapshot not loaded".to_string()))
    }
}

impl NetworkView for SnapshotFileView {
    /// Reload the file if its modification time changed
    ///
    /// The whole table is replaced at once, so accessors called after one
    /// refresh always see a single version of the file.
    fn refresh(&mut self) -> Result<(), NetworkViewError> {
        let modified = std::fs::metadata(&self.path)
            .and_then(|m| m.modified())
            .map_err(|e| {
                NetworkViewError::Unavailable(format!("{}: {}", self.path.display(), e))
            })?;

        if let Some((loaded_at, _)) = &self.loaded {
            if *loaded_at == modified {
                return Ok(());
            }
        }

        let raw = std::fs::read_to_string(&self.path).map_err(|e| {
            NetworkViewError::Unavailable(format!("{}: {}", self.path.display(), e))
        })?;
        let snapshot: MetagraphSnapshot = serde_json::from_str(&raw)
            .map_err(|e| NetworkViewError::Malformed(e.to_string()))?;
        debug!(
            "Loaded network snapshot from {} at block {}",
            self.path.display(),
            snapshot.block
        );
        self.loaded = Some((modified, snapshot));
        Ok(())
    }

    fn epoch(&mut self) -> Result<u64, NetworkViewError> {
        Ok(self.cached()?.epoch)
    }

    fn current_block(&mut self) -> Result<u64, NetworkViewError> {
        Ok(self.cached()?.block)
    }

    fn identity_index_for(&mut self, key: &str) -> Result<Option<u16>, NetworkViewError> {
        Ok(self.cached()?.index_of(key))
    }

    fn ranking_metrics(&mut self, index: u16) -> Result<RankingMetrics, NetworkViewError> {
        self.cached()?.metrics(index)
    }
}
