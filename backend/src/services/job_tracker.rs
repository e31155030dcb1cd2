//! Job tracking for background suggestion generation.
//!
//! Each job belongs to one timetable key, collects progress logs, and on
//! success holds the generated schedule until an administrator applies it.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::{ConflictRecord, Schedule, TimetableKey};

/// A single log entry with timestamp and message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Completed,
    Failed,
}

/// Generated timetable waiting to be applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionResult {
    pub schedule: Schedule,
    /// Audit of the generated schedule against the grid.
    pub conflicts: Vec<ConflictRecord>,
}

/// Job metadata and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub job_id: String,
    pub key: TimetableKey,
    /// User who requested the suggestion.
    pub requested_by: String,
    pub status: JobStatus,
    pub logs: Vec<LogEntry>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub result: Option<SuggestionResult>,
}

impl Job {
    pub fn is_finished(&self) -> bool {
        self.status != JobStatus::Running
    }
}

/// Finished jobs kept for status queries and applying.
pub const DEFAULT_RETAINED_JOBS: usize = 64;

/// In-memory job tracker. Clones share the same job table.
///
/// Running jobs are always kept. Once more than `retained` jobs have
/// finished, the oldest finished ones are dropped when a new job starts.
#[derive(Clone)]
pub struct JobTracker {
    jobs: Arc<RwLock<HashMap<String, Job>>>,
    retained: usize,
}

impl Default for JobTracker {
    fn default() -> Self {
        Self::with_retention(DEFAULT_RETAINED_JOBS)
    }
}

impl JobTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retention(retained: usize) -> Self {
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            retained,
        }
    }

    fn evict_finished(jobs: &mut HashMap<String, Job>, retained: usize) {
        let mut finished: Vec<(DateTime<Utc>, String)> = jobs
            .values()
            .filter(|job| job.is_finished())
            .map(|job| (job.completed_at.unwrap_or(job.created_at), job.job_id.clone()))
            .collect();
        if finished.len() <= retained {
            return;
        }
        finished.sort();
        let excess = finished.len() - retained;
        for (_, job_id) in finished.into_iter().take(excess) {
            jobs.remove(&job_id);
        }
        log::debug!("evicted {} finished suggestion jobs", excess);
    }

    /// Register a running job for `key` and return its ID.
    pub fn create_job(&self, key: &TimetableKey, requested_by: &str) -> String {
        let job_id = Uuid::new_v4().to_string();
        let job = Job {
            job_id: job_id.clone(),
            key: key.clone(),
            requested_by: requested_by.to_string(),
            status: JobStatus::Running,
            logs: vec![],
            created_at: Utc::now(),
            completed_at: None,
            result: None,
        };
        let mut jobs = self.jobs.write();
        Self::evict_finished(&mut jobs, self.retained);
        jobs.insert(job_id.clone(), job);
        job_id
    }

    /// Append a log entry. Unknown job IDs are ignored.
    pub fn log(&self, job_id: &str, level: LogLevel, message: impl Into<String>) {
        if let Some(job) = self.jobs.write().get_mut(job_id) {
            job.logs.push(LogEntry {
                timestamp: Utc::now(),
                level,
                message: message.into(),
            });
        }
    }

    /// Mark a job as completed with its generated schedule.
    pub fn complete_job(&self, job_id: &str, result: SuggestionResult) {
        if let Some(job) = self.jobs.write().get_mut(job_id) {
            job.status = JobStatus::Completed;
            job.completed_at = Some(Utc::now());
            job.result = Some(result);
        }
    }

    /// Mark a job as failed.
    pub fn fail_job(&self, job_id: &str, error_message: impl Into<String>) {
        if let Some(job) = self.jobs.write().get_mut(job_id) {
            let now = Utc::now();
            job.status = JobStatus::Failed;
            job.completed_at = Some(now);
            job.logs.push(LogEntry {
                timestamp: now,
                level: LogLevel::Error,
                message: error_message.into(),
            });
        }
    }

    pub fn get_job(&self, job_id: &str) -> Option<Job> {
        self.jobs.read().get(job_id).cloned()
    }

    /// Logs recorded after the first `skip` entries.
    pub fn logs_since(&self, job_id: &str, skip: usize) -> Vec<LogEntry> {
        self.jobs
            .read()
            .get(job_id)
            .map(|job| job.logs.iter().skip(skip).cloned().collect())
            .unwrap_or_default()
    }

    /// Generated schedule of a completed job.
    pub fn suggestion(&self, job_id: &str) -> Option<(TimetableKey, Schedule)> {
        self.jobs.read().get(job_id).and_then(|job| {
            job.result
                .as_ref()
                .map(|r| (job.key.clone(), r.schedule.clone()))
        })
    }
}
