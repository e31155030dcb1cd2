//! Per-timetable save serialization.
//!
//! At most one write per (stream, semester) is in flight. Every save takes a
//! ticket from the key's counter before waiting for the key's lock. When the
//! lock is acquired, a save whose ticket is no longer the newest skips the
//! write: a later snapshot of the same key is already queued behind it and
//! would overwrite it anyway. The stored result therefore follows issue
//! order, not completion order. Different keys never block each other.

use log::{debug, warn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::api::{Schedule, TimetableKey, TimetableRecord};
use crate::db::repository::{FullRepository, RepositoryResult};
use crate::db::services;

/// Result of a queued save.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// The snapshot was written.
    Saved(TimetableRecord),
    /// A newer snapshot for the same key was issued while this one waited.
    Superseded,
}

impl SaveOutcome {
    pub fn record(&self) -> Option<&TimetableRecord> {
        match self {
            SaveOutcome::Saved(record) => Some(record),
            SaveOutcome::Superseded => None,
        }
    }
}

#[derive(Default)]
struct KeySlot {
    write_lock: tokio::sync::Mutex<()>,
    latest_ticket: AtomicU64,
}

/// Serializes timetable writes per key.
#[derive(Clone)]
pub struct SaveQueue {
    repository: Arc<dyn FullRepository>,
    slots: Arc<Mutex<HashMap<TimetableKey, Arc<KeySlot>>>>,
}

impl SaveQueue {
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self {
            repository,
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn repository(&self) -> &Arc<dyn FullRepository> {
        &self.repository
    }

    fn slot(&self, key: &TimetableKey) -> Arc<KeySlot> {
        self.slots.lock().entry(key.clone()).or_default().clone()
    }

    /// Write `schedule` for `key` unless a newer save supersedes it.
    pub async fn save(
        &self,
        key: &TimetableKey,
        schedule: &Schedule,
    ) -> RepositoryResult<SaveOutcome> {
        let slot = self.slot(key);
        let ticket = slot.latest_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("save ticket {} issued for {}", ticket, key);

        let _guard = slot.write_lock.lock().await;
        let latest = slot.latest_ticket.load(Ordering::SeqCst);
        if latest != ticket {
            warn!(
                "save ticket {} for {} superseded by ticket {}",
                ticket, key, latest
            );
            return Ok(SaveOutcome::Superseded);
        }

        let record = services::save_timetable(self.repository.as_ref(), key, schedule).await?;
        Ok(SaveOutcome::Saved(record))
    }
}
