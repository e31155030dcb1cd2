//! Data Transfer Objects for the HTTP API.
//!
//! Core types such as [`TimetableRecord`] and [`Conflict`] already derive
//! Serialize/Deserialize and are re-exported as-is.

use serde::{Deserialize, Serialize};

pub use crate::api::{
    ClassAssignment, Conflict, ConflictRecord, Coordinate, Day, GridCell, NoOpReason, Schedule,
    Subject, Teacher, TimetableKey, TimetableRecord, TimetableSummary,
};
use crate::services::job_tracker::{JobStatus, LogEntry, SuggestionResult};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Repository connection status
    pub database: String,
}

/// Configured grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridResponse {
    pub days: Vec<Day>,
    pub times: Vec<String>,
    pub max_semester: u32,
    pub strict_moves: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimetableListResponse {
    pub timetables: Vec<TimetableSummary>,
    pub total: usize,
}

/// A stored timetable together with its rendered grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimetableView {
    #[serde(flatten)]
    pub record: TimetableRecord,
    /// One entry per grid coordinate, in grid order.
    pub cells: Vec<GridCell>,
}

/// Cell form submission used by both `check` and `slots`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceRequest {
    /// Cell the edited class came from, when editing an existing class.
    #[serde(default)]
    pub origin: Option<Coordinate>,
    pub target: Coordinate,
    pub subject: String,
    pub teacher: String,
}

impl PlaceRequest {
    /// Raw candidate as typed in the form. Validation happens in the editor.
    pub fn candidate(&self) -> ClassAssignment {
        ClassAssignment {
            subject: self.subject.clone(),
            teacher: self.teacher.clone(),
        }
    }
}

/// Result of a dry-run conflict check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict: Option<Conflict>,
}

/// Query string addressing one cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotQuery {
    pub day: Day,
    pub time: String,
}

impl From<SlotQuery> for Coordinate {
    fn from(query: SlotQuery) -> Self {
        Coordinate::new(query.day, query.time)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRequest {
    pub from: Coordinate,
    pub to: Coordinate,
}

/// Drag-and-drop result. A no-op move still returns the unchanged record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveResponse {
    pub moved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<NoOpReason>,
    pub record: TimetableRecord,
}

/// Bulk replacement of a timetable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceRequest {
    pub schedule: Schedule,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictsResponse {
    pub key: TimetableKey,
    pub conflicts: Vec<ConflictRecord>,
}

/// Response for starting a suggestion job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionJobResponse {
    /// Job ID for tracking the generation
    pub job_id: String,
    pub message: String,
}

/// Job status response for suggestion jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusResponse {
    pub job_id: String,
    pub key: TimetableKey,
    pub status: JobStatus,
    pub logs: Vec<LogEntry>,
    /// Generated schedule and its audit once completed
    pub result: Option<SuggestionResult>,
}

/// Query parameters for the subject catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectsQuery {
    pub stream: String,
    pub semester: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectListResponse {
    pub subjects: Vec<Subject>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherListResponse {
    pub teachers: Vec<Teacher>,
}
