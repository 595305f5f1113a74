//! In-process record store.
//!
//! All records live in one [`Db`] behind a `RwLock`. Every read-modify-write
//! runs inside [`Store::mutate`] under a single write guard, so concurrent
//! requests cannot interleave a check with its update. Mutations mark the store
//! dirty; [`Store::run_flusher`] persists dirty state in the background and
//! [`Store::flush`] is called once more on shutdown.

mod file;

pub use file::StoreFile;

use crate::metrics::METRICS;
use crate::models::{CsrDonation, DeliveryArea, Donation, Foundation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, RwLockReadGuard};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Snapshot of every record, keyed by id (delivery areas by pincode).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Db {
    pub foundations: BTreeMap<String, Foundation>,
    pub csr_donations: BTreeMap<String, CsrDonation>,
    pub donations: BTreeMap<String, Donation>,
    pub delivery_areas: BTreeMap<String, DeliveryArea>,
}

pub struct Store {
    db: RwLock<Db>,
    file: Option<StoreFile>,
    dirty: AtomicBool,
}

impl Store {
    /// Store without a backing file (tests, ephemeral runs).
    pub fn in_memory() -> Self {
        Self::with_db(Db::default(), None)
    }

    /// Load `file` (empty store if it does not exist yet).
    pub fn open(file: StoreFile) -> Result<Self, crate::Error> {
        let db = file.load()?;
        Ok(Self::with_db(db, Some(file)))
    }

    fn with_db(db: Db, file: Option<StoreFile>) -> Self {
        Self {
            db: RwLock::new(db),
            file,
            dirty: AtomicBool::new(false),
        }
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, Db> {
        self.db.read().await
    }

    /// Run `f` under the write lock. The store is marked dirty only when `f`
    /// succeeds, so `f` must validate before it changes anything.
    pub async fn mutate<T, F>(&self, f: F) -> Result<T, crate::Error>
    where
        F: FnOnce(&mut Db) -> Result<T, crate::Error>,
    {
        let mut db = self.db.write().await;
        let out = f(&mut db)?;
        self.dirty.store(true, Ordering::Release);
        Ok(out)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Persist if dirty. Returns whether anything was written.
    pub async fn flush(&self) -> Result<bool, crate::Error> {
        let Some(file) = &self.file else {
            self.dirty.store(false, Ordering::Release);
            return Ok(false);
        };
        if !self.dirty.swap(false, Ordering::AcqRel) {
            return Ok(false);
        }

        let encoded = {
            let db = self.db.read().await;
            file.encode(&db)
        };

        match encoded.and_then(|data| file.write(&data)) {
            Ok(()) => {
                METRICS.store_flushes.fetch_add(1, Ordering::Relaxed);
                debug!(path = %file.path().display(), "Store flushed");
                Ok(true)
            }
            Err(e) => {
                // Keep the changes queued for the next attempt.
                self.dirty.store(true, Ordering::Release);
                METRICS.store_flush_errors.fetch_add(1, Ordering::Relaxed);
                Err(e)
            }
        }
    }

    /// Periodically flush until `cancel` fires.
    pub async fn run_flusher(&self, interval: Duration, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Store flusher stopped");
                    return;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.flush().await {
                        error!(error = %e, "Background store flush failed");
                    }
                }
            }
        }
    }
}
