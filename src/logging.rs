// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tracing subscriber setup, configurable via `RUST_LOG`

use tracing_subscriber::EnvFilter;

/// Filter applied when `RUST_LOG` is unset or unparseable
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Build the filter for the given `RUST_LOG` directives
pub fn filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Install the global fmt subscriber
pub fn init_logging() {
    let directives = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_env_filter(filter_from(directives.as_deref()))
        .init();
}
