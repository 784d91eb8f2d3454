use std::collections::HashMap;
use std::sync::Arc;

use academia_core::import::ImportKind;
use academia_core::store::DocumentStore;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Document store backing accounts and imported entities.
    pub store: Arc<dyn DocumentStore>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Serialises import runs of the same kind within this process.
    pub import_locks: Arc<ImportLocks>,
}

/// One async mutex per [`ImportKind`], created on first use.
///
/// Held from parsing through commit, so two uploads of the same kind never
/// validate against each other's half-written state. Entries are dropped once
/// no run holds or awaits them, so per-program curriculum locks do not pile up.
#[derive(Debug, Default)]
pub struct ImportLocks {
    locks: Mutex<HashMap<ImportKind, Arc<Mutex<()>>>>,
}

impl ImportLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other run of `kind` is in progress.
    pub async fn acquire(&self, kind: ImportKind) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // The map's own reference is the only one left on idle entries.
            locks.retain(|entry, lock| *entry == kind || Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(kind).or_default())
        };
        lock.lock_owned().await
    }

    /// Number of kinds currently tracked.
    pub async fn tracked(&self) -> usize {
        self.locks.lock().await.len()
    }
}
