//! Service layer for timetable editing.
//!
//! Services sit between the repository layer and the HTTP handlers. They own
//! the editing session, serialize writes per timetable and run suggestion
//! jobs in the background.

pub mod editor;
pub mod job_tracker;
pub mod save_queue;
pub mod suggestion;

pub use editor::{EditorSettings, EditorState, TimetableEditor};
pub use job_tracker::{Job, JobStatus, JobTracker, LogEntry, LogLevel, SuggestionResult};
pub use save_queue::{SaveOutcome, SaveQueue};
pub use suggestion::{
    spawn_suggestion_job, CatalogSuggestionGenerator, SuggestionGenerator, SuggestionRequest,
};
