//! High-level database service layer.
//!
//! Repository-agnostic operations shared by the editor, the suggestion jobs
//! and the HTTP handlers. They add the rules that must hold regardless of
//! backend: a key never saved loads as an empty timetable and every write
//! is logged. Semester range checks depend on the configured grid and are
//! done by the callers ([`TimetableKey::validate`]).
//!
//! # Usage
//!
//! ```no_run
//! use institute_timetable::api::TimetableKey;
//! use institute_timetable::db::{repositories::LocalRepository, services};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = LocalRepository::new();
//!     let record = services::load_timetable(&repo, &TimetableKey::new("CSE", 1)).await?;
//!     assert!(record.schedule.is_empty());
//!     Ok(())
//! }
//! ```

use log::{debug, info};

use super::repository::{CatalogRepository, RepositoryResult, TimetableRepository};
use crate::api::{Schedule, Subject, Teacher, TimetableKey, TimetableRecord, TimetableSummary};

// ==================== Health & Connection ====================

/// Check if the storage backend is healthy.
pub async fn health_check<R>(repo: &R) -> RepositoryResult<bool>
where
    R: TimetableRepository + ?Sized,
{
    repo.health_check().await
}

// ==================== Timetable Operations ====================

/// Load the timetable for a key.
///
/// A key that has never been saved yields an empty record with revision 0.
pub async fn load_timetable<R>(repo: &R, key: &TimetableKey) -> RepositoryResult<TimetableRecord>
where
    R: TimetableRepository + ?Sized,
{
    match repo.get_timetable(key).await {
        Ok(record) => {
            debug!(
                "Loaded timetable {} (revision {}, {} slots)",
                key,
                record.revision,
                record.schedule.len()
            );
            Ok(record)
        }
        Err(e) if e.is_not_found() => {
            debug!("No stored timetable for {}, starting empty", key);
            Ok(TimetableRecord::empty(key.clone()))
        }
        Err(e) => Err(e),
    }
}

/// Store a full schedule snapshot for a key.
pub async fn save_timetable<R>(
    repo: &R,
    key: &TimetableKey,
    schedule: &Schedule,
) -> RepositoryResult<TimetableRecord>
where
    R: TimetableRepository + ?Sized,
{
    let record = repo.save_timetable(key, schedule).await?;
    info!(
        "Saved timetable {} at revision {} ({} slots)",
        key,
        record.revision,
        record.schedule.len()
    );
    Ok(record)
}

/// List stored timetables ordered by key.
pub async fn list_timetables<R>(repo: &R) -> RepositoryResult<Vec<TimetableSummary>>
where
    R: TimetableRepository + ?Sized,
{
    repo.list_timetables().await
}

/// Delete the stored timetable for a key.
pub async fn delete_timetable<R>(repo: &R, key: &TimetableKey) -> RepositoryResult<bool>
where
    R: TimetableRepository + ?Sized,
{
    let deleted = repo.delete_timetable(key).await?;
    if deleted {
        info!("Deleted timetable {}", key);
    }
    Ok(deleted)
}

// ==================== Catalogs ====================

/// Subjects offered for a key.
pub async fn list_subjects<R>(repo: &R, key: &TimetableKey) -> RepositoryResult<Vec<Subject>>
where
    R: CatalogRepository + ?Sized,
{
    repo.list_subjects(key).await
}

/// All teachers.
pub async fn list_teachers<R>(repo: &R) -> RepositoryResult<Vec<Teacher>>
where
    R: CatalogRepository + ?Sized,
{
    repo.list_teachers().await
}
