//! Postgres repository implementation using Diesel.
//!
//! Timetables are stored one row per (stream, semester) with the whole
//! schedule as a JSONB document, mirroring the wholesale load/save model of
//! the editor. Subject and teacher catalogs live in their own tables.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Automatic migration execution
//!
//! ## Configuration
//!
//! Built from the `[postgres]` section of `timetable.toml`; see
//! [`crate::config`] for the `DATABASE_URL` and `PG_*` overrides.

use async_trait::async_trait;
use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;
use tokio::task;

use crate::api::{
    Revision, Schedule, Subject, Teacher, TimetableKey, TimetableRecord, TimetableSummary,
};
use crate::db::checksum::schedule_checksum;
use crate::db::repository::{
    CatalogRepository, ErrorContext, RepositoryError, RepositoryResult, TimetableRepository,
};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

impl PostgresConfig {
    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Diesel-backed repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
                RepositoryError::internal_with_context(
                    format!("Migration failed: {}", e),
                    ErrorContext::new("run_migrations"),
                )
            })?;
        }

        log::info!(
            "Postgres repository ready (pool max={}, retries={})",
            config.max_pool_size,
            config.max_retries
        );

        Ok(Self { pool, config })
    }

    /// Execute a database operation with automatic retry for transient failures.
    ///
    /// Runs on the blocking pool; the delay between attempts doubles each time.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2;
                }

                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1)),
                        );
                        if attempt < max_retries {
                            last_error = Some(err);
                            continue;
                        }
                        return Err(err);
                    }
                };

                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        log::warn!("retrying after transient failure: {}", e);
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            }

            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }
}

fn semester_column(key: &TimetableKey) -> RepositoryResult<i32> {
    i32::try_from(key.semester.value()).map_err(|_| {
        RepositoryError::validation(format!("semester {} out of range", key.semester))
    })
}

fn row_to_record(row: TimetableRow) -> RepositoryResult<TimetableRecord> {
    let schedule: Schedule = serde_json::from_value(row.schedule_json).map_err(|e| {
        RepositoryError::internal_with_context(
            format!("Stored schedule is not valid JSON: {}", e),
            ErrorContext::new("decode_timetable").with_entity_id(format!(
                "{}/sem-{}",
                row.stream, row.semester
            )),
        )
    })?;
    Ok(TimetableRecord {
        key: TimetableKey::new(row.stream, row.semester.max(0) as u32),
        schedule,
        checksum: row.checksum,
        revision: Revision::new(row.revision),
        updated_at: Some(row.updated_at),
    })
}

#[async_trait]
impl TimetableRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(RepositoryError::from)
        })
        .await
    }

    async fn get_timetable(&self, key: &TimetableKey) -> RepositoryResult<TimetableRecord> {
        let stream = key.stream.as_str().to_string();
        let semester = semester_column(key)?;
        let key = key.clone();
        self.with_conn(move |conn| {
            let row = timetables::table
                .filter(timetables::stream.eq(&stream))
                .filter(timetables::semester.eq(semester))
                .select(TimetableRow::as_select())
                .first::<TimetableRow>(conn)
                .map_err(|e| {
                    RepositoryError::from(e)
                        .with_operation("get_timetable")
                        .for_timetable(&key)
                })?;
            row_to_record(row)
        })
        .await
    }

    async fn save_timetable(
        &self,
        key: &TimetableKey,
        schedule: &Schedule,
    ) -> RepositoryResult<TimetableRecord> {
        let stream = key.stream.as_str().to_string();
        let semester = semester_column(key)?;
        let schedule_json = serde_json::to_value(schedule)?;
        let checksum = schedule_checksum(schedule);
        let key = key.clone();

        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                let existing = timetables::table
                    .filter(timetables::stream.eq(&stream))
                    .filter(timetables::semester.eq(semester))
                    .select(TimetableRow::as_select())
                    .for_update()
                    .first::<TimetableRow>(tx)
                    .optional()
                    .map_err(RepositoryError::from)?;

                // Identical content keeps its revision.
                if let Some(row) = existing.as_ref() {
                    if row.checksum == checksum {
                        return row_to_record(row.clone());
                    }
                }

                let row = NewTimetableRow {
                    stream: stream.clone(),
                    semester,
                    schedule_json: schedule_json.clone(),
                    checksum: checksum.clone(),
                    revision: existing.map(|r| r.revision + 1).unwrap_or(1),
                    updated_at: Utc::now(),
                };

                let saved: TimetableRow = diesel::insert_into(timetables::table)
                    .values(&row)
                    .on_conflict((timetables::stream, timetables::semester))
                    .do_update()
                    .set(&row)
                    .returning(TimetableRow::as_returning())
                    .get_result(tx)
                    .map_err(|e| {
                        RepositoryError::from(e)
                            .with_operation("save_timetable")
                            .for_timetable(&key)
                    })?;

                row_to_record(saved)
            })
        })
        .await
    }

    async fn list_timetables(&self) -> RepositoryResult<Vec<TimetableSummary>> {
        self.with_conn(|conn| {
            let rows = timetables::table
                .select(TimetableRow::as_select())
                .order((timetables::stream.asc(), timetables::semester.asc()))
                .load::<TimetableRow>(conn)
                .map_err(RepositoryError::from)?;

            rows.into_iter()
                .map(|row| row_to_record(row).map(|r| TimetableSummary::from(&r)))
                .collect()
        })
        .await
    }

    async fn delete_timetable(&self, key: &TimetableKey) -> RepositoryResult<bool> {
        let stream = key.stream.as_str().to_string();
        let semester = semester_column(key)?;
        self.with_conn(move |conn| {
            let deleted = diesel::delete(
                timetables::table
                    .filter(timetables::stream.eq(&stream))
                    .filter(timetables::semester.eq(semester)),
            )
            .execute(conn)
            .map_err(RepositoryError::from)?;
            Ok(deleted > 0)
        })
        .await
    }
}

#[async_trait]
impl CatalogRepository for PostgresRepository {
    async fn list_subjects(&self, key: &TimetableKey) -> RepositoryResult<Vec<Subject>> {
        let stream = key.stream.as_str().to_string();
        let semester = semester_column(key)?;
        self.with_conn(move |conn| {
            let rows = subjects::table
                .filter(subjects::stream.eq(&stream))
                .filter(subjects::semester.eq(semester))
                .order(subjects::name.asc())
                .select(SubjectRow::as_select())
                .load::<SubjectRow>(conn)
                .map_err(RepositoryError::from)?;
            Ok(rows
                .into_iter()
                .map(|r| Subject {
                    name: r.name,
                    teacher: r.teacher,
                })
                .collect())
        })
        .await
    }

    async fn list_teachers(&self) -> RepositoryResult<Vec<Teacher>> {
        self.with_conn(|conn| {
            let rows = teachers::table
                .order(teachers::name.asc())
                .select(TeacherRow::as_select())
                .load::<TeacherRow>(conn)
                .map_err(RepositoryError::from)?;
            Ok(rows
                .into_iter()
                .map(|r| Teacher {
                    name: r.name,
                    department: r.department,
                })
                .collect())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_with_url_keeps_defaults() {
        let config = PostgresConfig::with_url("postgres://localhost/timetable");
        assert_eq!(config.database_url, "postgres://localhost/timetable");
        assert_eq!(config.max_pool_size, 10);
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_semester_column_range() {
        assert_eq!(semester_column(&TimetableKey::new("CSE", 4)).unwrap(), 4);
        assert!(semester_column(&TimetableKey::new("CSE", u32::MAX)).is_err());
    }
}
