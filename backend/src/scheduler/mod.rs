//! Timetable scheduling core.
//!
//! Pure functions over [`Schedule`](crate::models::Schedule) values:
//!
//! - [`conflicts`]: validation of a proposed placement or move
//! - [`mutations`]: place/edit, remove, drag-and-drop move, apply suggestion
//! - [`audit`]: whole-schedule scan for clashes and out-of-grid cells
//!
//! Validation and mutation are kept apart so a caller can preview and
//! reject a change before committing it.

pub mod audit;
pub mod conflicts;
pub mod mutations;

pub use audit::{find_conflicts, ConflictKind, ConflictRecord};
pub use conflicts::{check_conflict, check_move, Conflict};
pub use mutations::{apply_suggestion, move_assignment, remove, upsert, MoveOutcome, NoOpReason};

#[cfg(test)]
mod tests;
