// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Read boundary to the network layer's ranking table

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-identity ranking metrics from the ranking table
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RankingMetrics {
    pub stake: f64,
    pub rank: f64,
    pub trust: f64,
    pub consensus: f64,
    pub incentive: f64,
    pub emission: f64,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum NetworkViewError {
    #[error("Network view unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed network view: {0}")]
    Malformed(String),

    #[error("No ranking entry at index {index} (table has {len} entries)")]
    IndexOutOfRange { index: u16, len: usize },
}

/// Handle onto the network layer's current state
///
/// Implementations are not required to tolerate concurrent use; every
/// accessor takes `&mut self` and callers reach the handle only through
/// [`super::AccessGuard`]. Accessors never perform I/O themselves.
pub trait NetworkView: Send {
    /// Bring the handle up to date with the network layer
    ///
    /// Called once at the start of a guarded section; every accessor in the
    /// same section then reads the same state. Views that are always current
    /// keep the default.
    fn refresh(&mut self) -> Result<(), NetworkViewError> {
        Ok(())
    }

    /// Step counter maintained by the network layer
    fn epoch(&mut self) -> Result<u64, NetworkViewError>;

    fn current_block(&mut self) -> Result<u64, NetworkViewError>;

    /// Position of `key` in the ranking table, `None` when not registered
    fn identity_index_for(&mut self, key: &str) -> Result<Option<u16>, NetworkViewError>;

    fn ranking_metrics(&mut self, index: u16) -> Result<RankingMetrics, NetworkViewError>;
}
