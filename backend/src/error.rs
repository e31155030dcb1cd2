//! Error types for timetable editing.
//!
//! Three families of failure reach callers of the editing layer:
//!
//! - **Conflicts** (slot occupied, teacher double-booked): recovered locally,
//!   the schedule is left unchanged.
//! - **Validation** (missing subject/teacher, coordinate outside the grid,
//!   bad stream/semester): the request is rejected before any mutation.
//! - **Repository** failures (load/save): surfaced to the caller; on a failed
//!   save the editor discards its optimistic state and reloads.

use crate::db::repository::RepositoryError;
use crate::scheduler::Conflict;

/// Result type for timetable operations.
pub type TimetableResult<T> = Result<T, TimetableError>;

/// Error type for timetable editing operations.
#[derive(Debug, thiserror::Error)]
#[allow(clippy::result_large_err)]
pub enum TimetableError {
    /// A placement or move violated a scheduling rule.
    #[error("Conflict: {0}")]
    Conflict(#[from] Conflict),

    /// Input was incomplete or outside the configured grid.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The caller's role does not allow the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Loading or listing from the persistence gateway failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Writing the snapshot failed; the editor state was resynchronized
    /// from the store when `reloaded` is true.
    #[error("Save failed (reloaded={reloaded}): {source}")]
    SaveFailed {
        source: RepositoryError,
        reloaded: bool,
    },

    /// A save/cancel was requested while no cell was open for editing.
    #[error("No cell is currently being edited")]
    NoActiveEdit,
}

impl TimetableError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Whether the error leaves the in-memory schedule untouched and can be
    /// fixed by the user re-submitting.
    pub fn is_recoverable_locally(&self) -> bool {
        matches!(
            self,
            Self::Conflict(_) | Self::Validation(_) | Self::NoActiveEdit
        )
    }
}
