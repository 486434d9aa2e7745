// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Read-only access to network state
//!
//! The network layer owns the ranking table and chain height. This module
//! defines the boundary it is consumed through and the lock that serialises
//! every read of it.

pub mod guard;
pub mod snapshot;
pub mod view;

pub use guard::AccessGuard;
pub use snapshot::{MetagraphSnapshot, SnapshotFileView};
pub use view::{NetworkView, NetworkViewError, RankingMetrics};
