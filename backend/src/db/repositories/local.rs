//! In-memory local repository implementation.
//!
//! This module provides a local implementation of all repository traits
//! suitable for unit testing and local development. All data is stored in
//! memory using HashMaps, providing fast, deterministic, and isolated execution.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::api::{
    Revision, Schedule, Subject, Teacher, TimetableKey, TimetableRecord, TimetableSummary,
};
use crate::db::checksum::schedule_checksum;
use crate::db::repository::*;

/// In-memory local repository.
///
/// Clones share the same underlying storage.
///
/// # Example
/// ```
/// use institute_timetable::api::{Schedule, TimetableKey};
/// use institute_timetable::db::repositories::LocalRepository;
/// use institute_timetable::db::repository::TimetableRepository;
///
/// # tokio_test_block_on(async {
/// let repo = LocalRepository::new();
/// let key = TimetableKey::new("CSE", 1);
/// repo.save_timetable(&key, &Schedule::new()).await.unwrap();
/// assert_eq!(repo.list_timetables().await.unwrap().len(), 1);
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Runtime::new().unwrap().block_on(f)
/// # }
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    timetables: HashMap<TimetableKey, TimetableRecord>,
    subjects: HashMap<TimetableKey, Vec<Subject>>,
    teachers: Vec<Teacher>,

    // Connection health
    is_healthy: bool,
    // Writes fail while reads keep working (simulates a flaky save path).
    fail_writes: bool,
    save_count: usize,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            timetables: HashMap::new(),
            subjects: HashMap::new(),
            teachers: Vec::new(),
            is_healthy: true,
            fail_writes: false,
            save_count: 0,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    fn read(&self) -> RepositoryResult<RwLockReadGuard<'_, LocalData>> {
        self.data
            .read()
            .map_err(|_| RepositoryError::internal("local repository lock poisoned"))
    }

    fn write(&self) -> RepositoryResult<RwLockWriteGuard<'_, LocalData>> {
        self.data
            .write()
            .map_err(|_| RepositoryError::internal("local repository lock poisoned"))
    }

    /// Replace the subject catalog for a stream/semester.
    pub fn set_subjects(&self, key: TimetableKey, subjects: Vec<Subject>) -> RepositoryResult<()> {
        self.write()?.subjects.insert(key, subjects);
        Ok(())
    }

    /// Replace the teacher catalog.
    pub fn set_teachers(&self, teachers: Vec<Teacher>) -> RepositoryResult<()> {
        self.write()?.teachers = teachers;
        Ok(())
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        if let Ok(mut data) = self.data.write() {
            data.is_healthy = healthy;
        }
    }

    /// Make every write fail with a connection error while reads succeed.
    pub fn set_fail_writes(&self, fail: bool) {
        if let Ok(mut data) = self.data.write() {
            data.fail_writes = fail;
        }
    }

    /// Number of writes that reached storage.
    pub fn save_count(&self) -> usize {
        self.data.read().map(|d| d.save_count).unwrap_or(0)
    }

    /// Get the number of timetables stored.
    pub fn timetable_count(&self) -> usize {
        self.data.read().map(|d| d.timetables.len()).unwrap_or(0)
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self) -> RepositoryResult<()> {
        if !self.read()?.is_healthy {
            return Err(RepositoryError::connection("Database is not healthy"));
        }
        Ok(())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TimetableRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.read()?.is_healthy)
    }

    async fn get_timetable(&self, key: &TimetableKey) -> RepositoryResult<TimetableRecord> {
        self.check_health()?;
        self.read()?.timetables.get(key).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Timetable {} not found", key),
                ErrorContext::new("get_timetable")
                    .with_entity("timetable")
                    .with_entity_id(key),
            )
        })
    }

    async fn save_timetable(
        &self,
        key: &TimetableKey,
        schedule: &Schedule,
    ) -> RepositoryResult<TimetableRecord> {
        self.check_health()?;
        let mut data = self.write()?;
        if data.fail_writes {
            return Err(RepositoryError::connection_with_context(
                "write rejected",
                ErrorContext::new("save_timetable")
                    .with_entity("timetable")
                    .with_entity_id(key),
            ));
        }

        let checksum = schedule_checksum(schedule);
        if let Some(existing) = data.timetables.get(key) {
            if existing.checksum == checksum {
                return Ok(existing.clone());
            }
        }

        let revision = data
            .timetables
            .get(key)
            .map(|r| r.revision.value() + 1)
            .unwrap_or(1);
        let record = TimetableRecord {
            key: key.clone(),
            schedule: schedule.clone(),
            checksum,
            revision: Revision::new(revision),
            updated_at: Some(Utc::now()),
        };
        data.timetables.insert(key.clone(), record.clone());
        data.save_count += 1;
        Ok(record)
    }

    async fn list_timetables(&self) -> RepositoryResult<Vec<TimetableSummary>> {
        self.check_health()?;
        let data = self.read()?;
        let mut summaries: Vec<TimetableSummary> =
            data.timetables.values().map(TimetableSummary::from).collect();
        summaries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(summaries)
    }

    async fn delete_timetable(&self, key: &TimetableKey) -> RepositoryResult<bool> {
        self.check_health()?;
        let mut data = self.write()?;
        if data.fail_writes {
            return Err(RepositoryError::connection("write rejected")
                .with_operation("delete_timetable")
                .for_timetable(key));
        }
        Ok(data.timetables.remove(key).is_some())
    }
}

#[async_trait]
impl CatalogRepository for LocalRepository {
    async fn list_subjects(&self, key: &TimetableKey) -> RepositoryResult<Vec<Subject>> {
        self.check_health()?;
        Ok(self.read()?.subjects.get(key).cloned().unwrap_or_default())
    }

    async fn list_teachers(&self) -> RepositoryResult<Vec<Teacher>> {
        self.check_health()?;
        Ok(self.read()?.teachers.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ClassAssignment, Coordinate, Day};

    fn sample() -> Schedule {
        Schedule::from_entries(vec![(
            Coordinate::new(Day::Monday, "9:00 AM"),
            ClassAssignment::new("Physics", "Dr. A").unwrap(),
        )])
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let repo = LocalRepository::new();
        let err = repo.get_timetable(&TimetableKey::new("CSE", 1)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_save_then_get() {
        let repo = LocalRepository::new();
        let key = TimetableKey::new("CSE", 1);
        let saved = repo.save_timetable(&key, &sample()).await.unwrap();
        assert_eq!(saved.revision.value(), 1);
        assert!(saved.updated_at.is_some());

        let loaded = repo.get_timetable(&key).await.unwrap();
        assert_eq!(loaded.schedule, sample());
    }

    #[tokio::test]
    async fn test_identical_save_keeps_revision() {
        let repo = LocalRepository::new();
        let key = TimetableKey::new("CSE", 1);
        repo.save_timetable(&key, &sample()).await.unwrap();
        let again = repo.save_timetable(&key, &sample()).await.unwrap();
        assert_eq!(again.revision.value(), 1);
        assert_eq!(repo.save_count(), 1);

        let changed = repo.save_timetable(&key, &Schedule::new()).await.unwrap();
        assert_eq!(changed.revision.value(), 2);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let repo = LocalRepository::new();
        repo.save_timetable(&TimetableKey::new("CSE", 1), &sample()).await.unwrap();
        assert!(repo.get_timetable(&TimetableKey::new("CSE", 2)).await.is_err());
        assert!(repo.get_timetable(&TimetableKey::new("ECE", 1)).await.is_err());
    }

    #[tokio::test]
    async fn test_unhealthy_repository_fails() {
        let repo = LocalRepository::new();
        repo.set_healthy(false);
        assert!(!repo.health_check().await.unwrap());
        let err = repo.list_timetables().await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_fail_writes_keeps_reads() {
        let repo = LocalRepository::new();
        let key = TimetableKey::new("CSE", 1);
        repo.save_timetable(&key, &sample()).await.unwrap();
        repo.set_fail_writes(true);
        assert!(repo.save_timetable(&key, &Schedule::new()).await.is_err());
        assert_eq!(repo.get_timetable(&key).await.unwrap().schedule, sample());
    }

    #[tokio::test]
    async fn test_catalogs() {
        let repo = LocalRepository::new();
        let key = TimetableKey::new("CSE", 1);
        repo.set_subjects(
            key.clone(),
            vec![Subject { name: "Physics".into(), teacher: Some("Dr. A".into()) }],
        )
        .unwrap();
        repo.set_teachers(vec![Teacher { name: "Dr. A".into(), department: None }])
            .unwrap();

        assert_eq!(repo.list_subjects(&key).await.unwrap().len(), 1);
        assert!(repo.list_subjects(&TimetableKey::new("CSE", 2)).await.unwrap().is_empty());
        assert_eq!(repo.list_teachers().await.unwrap()[0].name, "Dr. A");
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = LocalRepository::new();
        let key = TimetableKey::new("CSE", 1);
        repo.save_timetable(&key, &sample()).await.unwrap();
        assert!(repo.delete_timetable(&key).await.unwrap());
        assert!(!repo.delete_timetable(&key).await.unwrap());
        assert_eq!(repo.timetable_count(), 0);
    }
}
