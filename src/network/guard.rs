// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Serialised access to the shared network view

use std::sync::Arc;
use tokio::sync::Mutex;

use super::view::{NetworkView, NetworkViewError};

/// Mutual-exclusion handle around a [`NetworkView`]
///
/// Clones share the same lock. The closures passed in are synchronous, so
/// no await point can happen while the lock is held. Sections that refresh
/// the view from disk go through [`AccessGuard::read_blocking`].
#[derive(Clone)]
pub struct AccessGuard {
    view: Arc<Mutex<Box<dyn NetworkView>>>,
}

impl AccessGuard {
    pub fn new<V: NetworkView + 'static>(view: V) -> Self {
        let view: Box<dyn NetworkView> = Box::new(view);
        Self {
            view: Arc::new(Mutex::new(view)),
        }
    }

    /// Wait for exclusive access and run `f` against the view
    pub async fn read<T>(&self, f: impl FnOnce(&mut dyn NetworkView) -> T) -> T {
        let mut view = self.view.lock().await;
        f(&mut **view)
    }

    /// Like [`AccessGuard::read`], but `f` runs on the blocking pool
    ///
    /// The lock is held until `f` returns, even if the caller stops waiting.
    pub async fn read_blocking<T, F>(&self, f: F) -> Result<T, NetworkViewError>
    where
        F: FnOnce(&mut dyn NetworkView) -> T + Send + 'static,
        T: Send + 'static,
    {
        let mut view = self.view.clone().lock_owned().await;
        tokio::task::spawn_blocking(move || f(&mut **view))
            .await
            .map_err(|e| NetworkViewError::Unavailable(format!("view read task failed: {}", e)))
    }

    /// Run `f` only if the view is free right now
    pub fn try_read<T>(&self, f: impl FnOnce(&mut dyn NetworkView) -> T) -> Option<T> {
        let mut view = self.view.try_lock().ok()?;
        Some(f(&mut **view))
    }
}

impl std::fmt::Debug for AccessGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGuard")
            .field("holders", &Arc::strong_count(&self.view))
            .finish()
    }
}
