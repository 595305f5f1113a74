//! Application state shared across handlers.

use crate::config::Config;
use crate::store::{Store, StoreFile};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<Store>,
    pub start_time: Instant,
    /// Cleared when shutdown begins so load balancers stop routing here.
    pub ready: AtomicBool,
}

impl AppState {
    /// Open the store file named by `config.data_path`, encrypted when a store
    /// key is configured.
    pub fn new(config: Config) -> Result<Self, crate::Error> {
        let path = PathBuf::from(&config.data_path);
        let file = match config.store_key() {
            Some(key) => StoreFile::new_encrypted(path, key)?,
            None => StoreFile::new_plaintext(path),
        };
        info!(
            path = %file.path().display(),
            encrypted = file.is_encrypted(),
            "Opening store"
        );

        let store = Store::open(file)?;
        Ok(Self::with_store(config, store))
    }

    /// State backed by an in-memory store (tests, ephemeral runs).
    pub fn in_memory(config: Config) -> Self {
        Self::with_store(config, Store::in_memory())
    }

    fn with_store(config: Config, store: Store) -> Self {
        Self {
            config,
            store: Arc::new(store),
            start_time: Instant::now(),
            ready: AtomicBool::new(true),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }

    pub fn begin_shutdown(&self) {
        self.ready.store(false, Ordering::Relaxed);
    }
}
