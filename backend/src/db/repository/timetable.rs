//! Timetable repository trait: the persistence gateway for schedules.
//!
//! Schedules are loaded and stored wholesale, one record per
//! (stream, semester). There are no partial or delta updates.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{Schedule, TimetableKey, TimetableRecord, TimetableSummary};

/// Repository trait for timetable storage.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust and allow
/// sharing across request handlers.
#[async_trait]
pub trait TimetableRepository: Send + Sync {
    // ==================== Health & Connection ====================

    /// Check if the storage backend is reachable.
    ///
    /// # Returns
    /// - `Ok(true)` if connection is healthy
    /// - `Ok(false)` if connection is unhealthy but no error occurred
    /// - `Err(RepositoryError)` if an error occurred during the check
    async fn health_check(&self) -> RepositoryResult<bool>;

    // ==================== Timetable Operations ====================

    /// Load the stored timetable for a key.
    ///
    /// # Returns
    /// * `Ok(TimetableRecord)` - The stored schedule with its revision
    /// * `Err(RepositoryError::NotFound)` - If nothing was ever saved for the key
    async fn get_timetable(&self, key: &TimetableKey) -> RepositoryResult<TimetableRecord>;

    /// Overwrite the stored timetable for a key with a full snapshot.
    ///
    /// Saving content identical to what is stored keeps the revision.
    ///
    /// # Returns
    /// * `Ok(TimetableRecord)` - The record as stored
    async fn save_timetable(
        &self,
        key: &TimetableKey,
        schedule: &Schedule,
    ) -> RepositoryResult<TimetableRecord>;

    /// List all stored timetables.
    async fn list_timetables(&self) -> RepositoryResult<Vec<TimetableSummary>>;

    /// Delete the stored timetable for a key.
    ///
    /// # Returns
    /// * `Ok(true)` if a record was deleted, `Ok(false)` if none existed
    async fn delete_timetable(&self, key: &TimetableKey) -> RepositoryResult<bool>;
}
