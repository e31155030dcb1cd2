//! Public API surface for the timetable backend.
//!
//! This file consolidates the domain and DTO types shared by the service
//! layer, the repositories, and the HTTP API. All types derive
//! Serialize/Deserialize for JSON serialization.

pub use crate::models::grid::{Coordinate, Day, GridCell, SlotGrid};
pub use crate::models::schedule::{ClassAssignment, Schedule};
pub use crate::scheduler::audit::{ConflictKind, ConflictRecord};
pub use crate::scheduler::conflicts::Conflict;
pub use crate::scheduler::mutations::{MoveOutcome, NoOpReason};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::define_id_type;
use crate::error::{TimetableError, TimetableResult};

define_id_type!(u32, Semester);
define_id_type!(i64, Revision);

/// Stream (programme/branch) identifier, e.g. "CSE" or "BBA".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamId(pub String);

impl StreamId {
    pub fn new(value: impl Into<String>) -> Self {
        StreamId(value.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StreamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Scoping key of one independent timetable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimetableKey {
    pub stream: StreamId,
    pub semester: Semester,
}

impl TimetableKey {
    pub fn new(stream: impl Into<String>, semester: u32) -> Self {
        Self {
            stream: StreamId::new(stream),
            semester: Semester::new(semester),
        }
    }

    /// Check the key against the configured semester range.
    pub fn validate(&self, max_semester: u32) -> TimetableResult<()> {
        if self.stream.as_str().is_empty() {
            return Err(TimetableError::validation("stream is required"));
        }
        if self.semester.value() == 0 || self.semester.value() > max_semester {
            return Err(TimetableError::validation(format!(
                "semester must be between 1 and {}, got {}",
                max_semester, self.semester
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for TimetableKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/sem-{}", self.stream, self.semester)
    }
}

/// Persisted timetable envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableRecord {
    pub key: TimetableKey,
    pub schedule: Schedule,
    /// SHA-256 of the canonical schedule JSON.
    pub checksum: String,
    /// Incremented on every write that changes content. Zero means never saved.
    pub revision: Revision,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TimetableRecord {
    /// Record for a key that has never been saved.
    pub fn empty(key: TimetableKey) -> Self {
        let schedule = Schedule::new();
        Self {
            checksum: crate::db::checksum::schedule_checksum(&schedule),
            key,
            schedule,
            revision: Revision::new(0),
            updated_at: None,
        }
    }
}

/// Lightweight listing entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableSummary {
    pub key: TimetableKey,
    pub slot_count: usize,
    pub revision: Revision,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&TimetableRecord> for TimetableSummary {
    fn from(record: &TimetableRecord) -> Self {
        Self {
            key: record.key.clone(),
            slot_count: record.schedule.len(),
            revision: record.revision,
            updated_at: record.updated_at,
        }
    }
}

/// Subject offered in a stream/semester.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    /// Teacher normally assigned to the subject, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher: Option<String>,
}

/// Faculty member available for scheduling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Teacher {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

/// Caller role. Only administrators may change timetables.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "teacher" => Ok(Role::Teacher),
            "student" => Ok(Role::Student),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// Explicit caller context passed to every mutating operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user: String,
    pub role: Role,
}

impl Actor {
    pub fn new(user: impl Into<String>, role: Role) -> Self {
        Self {
            user: user.into(),
            role,
        }
    }

    pub fn admin(user: impl Into<String>) -> Self {
        Self::new(user, Role::Admin)
    }

    pub fn can_edit(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fail with `Forbidden` unless the actor may edit timetables.
    pub fn ensure_can_edit(&self) -> TimetableResult<()> {
        if self.can_edit() {
            Ok(())
        } else {
            Err(TimetableError::forbidden(format!(
                "user '{}' with role {:?} may not modify timetables",
                self.user, self.role
            )))
        }
    }
}
