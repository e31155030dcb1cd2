//! Pure mutation operations over a [`Schedule`].
//!
//! Every operation takes the current schedule by reference and returns a new
//! one; the input is never modified, so a caller can always fall back to the
//! previous snapshot. None of these functions checks conflicts: callers run
//! [`check_conflict`](super::check_conflict) first.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::models::{ClassAssignment, Coordinate, Schedule};

/// Place or edit a class.
///
/// When `origin` is given, the class at `origin` is removed first, so an edit
/// that changes the cell also vacates the old one.
pub fn upsert(
    schedule: &Schedule,
    origin: Option<&Coordinate>,
    target: &Coordinate,
    candidate: ClassAssignment,
) -> Schedule {
    let mut next = schedule.clone();
    if let Some(origin) = origin {
        next.take(origin);
    }
    next.insert(target.clone(), candidate);
    next
}

/// Remove the class at `coordinate`. Removing from a free slot is a no-op.
pub fn remove(schedule: &Schedule, coordinate: &Coordinate) -> Schedule {
    let mut next = schedule.clone();
    if next.take(coordinate).is_none() {
        debug!("remove at {}: slot already free", coordinate);
    }
    next
}

/// Why a drag-and-drop move did nothing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoOpReason {
    /// Nothing scheduled at the source cell.
    EmptySource,
    /// Drops are only accepted onto empty cells.
    OccupiedDestination,
}

/// Result of a drag-and-drop move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved(Schedule),
    NoOp(NoOpReason),
}

impl MoveOutcome {
    pub fn is_noop(&self) -> bool {
        matches!(self, MoveOutcome::NoOp(_))
    }
}

/// Move the class at `from` to the empty cell `to`.
///
/// The teacher rule is not re-checked here; see
/// [`check_move`](super::check_move) for the strict variant.
pub fn move_assignment(schedule: &Schedule, from: &Coordinate, to: &Coordinate) -> MoveOutcome {
    let Some(assignment) = schedule.get(from) else {
        return MoveOutcome::NoOp(NoOpReason::EmptySource);
    };
    if schedule.is_occupied(to) {
        return MoveOutcome::NoOp(NoOpReason::OccupiedDestination);
    }
    MoveOutcome::Moved(upsert(schedule, Some(from), to, assignment.clone()))
}

/// Replace the current schedule wholesale with an externally generated one.
pub fn apply_suggestion(current: &Schedule, suggestion: &Schedule) -> Schedule {
    debug!(
        "applying suggestion: {} slots replace {} slots",
        suggestion.len(),
        current.len()
    );
    suggestion.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Day;

    fn at(day: Day, time: &str) -> Coordinate {
        Coordinate::new(day, time)
    }

    fn class(subject: &str, teacher: &str) -> ClassAssignment {
        ClassAssignment::new(subject, teacher).unwrap()
    }

    #[test]
    fn test_place_on_empty_schedule() {
        let target = at(Day::Monday, "9:00 AM");
        let next = upsert(&Schedule::new(), None, &target, class("Physics", "Dr. A"));
        assert_eq!(next.get(&target), Some(&class("Physics", "Dr. A")));
        assert_eq!(next.len(), 1);
    }

    #[test]
    fn test_upsert_does_not_touch_input() {
        let original = Schedule::new();
        let _ = upsert(&original, None, &at(Day::Monday, "9:00 AM"), class("Physics", "Dr. A"));
        assert!(original.is_empty());
    }

    #[test]
    fn test_edit_with_new_target_vacates_origin() {
        let from = at(Day::Monday, "9:00 AM");
        let to = at(Day::Thursday, "1:00 PM");
        let schedule = Schedule::from_entries(vec![(from.clone(), class("Physics", "Dr. A"))]);
        let next = upsert(&schedule, Some(&from), &to, class("Physics", "Dr. C"));
        assert!(next.get(&from).is_none());
        assert_eq!(next.get(&to).unwrap().teacher, "Dr. C");
        // Monday emptied, so the day key is gone.
        assert_eq!(next.days().collect::<Vec<_>>(), vec![Day::Thursday]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let cell = at(Day::Friday, "8:00 AM");
        let schedule = Schedule::from_entries(vec![(cell.clone(), class("Physics", "Dr. A"))]);
        let once = remove(&schedule, &cell);
        let twice = remove(&once, &cell);
        assert_eq!(once, twice);
        assert!(once.is_empty());
    }

    #[test]
    fn test_move_to_empty_cell() {
        let from = at(Day::Tuesday, "8:00 AM");
        let to = at(Day::Tuesday, "11:00 AM");
        let schedule = Schedule::from_entries(vec![(from.clone(), class("Biology", "Dr. D"))]);
        match move_assignment(&schedule, &from, &to) {
            MoveOutcome::Moved(next) => {
                assert!(next.get(&from).is_none());
                assert_eq!(next.get(&to), Some(&class("Biology", "Dr. D")));
            }
            other => panic!("expected move, got {:?}", other),
        }
    }

    #[test]
    fn test_move_noops() {
        let from = at(Day::Tuesday, "8:00 AM");
        let to = at(Day::Tuesday, "9:00 AM");
        let schedule = Schedule::from_entries(vec![
            (from.clone(), class("Biology", "Dr. D")),
            (to.clone(), class("Maths", "Ms. B")),
        ]);
        assert_eq!(
            move_assignment(&schedule, &from, &to),
            MoveOutcome::NoOp(NoOpReason::OccupiedDestination)
        );
        assert_eq!(
            move_assignment(&schedule, &from, &from),
            MoveOutcome::NoOp(NoOpReason::OccupiedDestination)
        );
        assert_eq!(
            move_assignment(&schedule, &at(Day::Monday, "8:00 AM"), &to),
            MoveOutcome::NoOp(NoOpReason::EmptySource)
        );
    }

    #[test]
    fn test_apply_suggestion_replaces_everything() {
        let current = Schedule::from_entries(vec![(
            at(Day::Monday, "8:00 AM"),
            class("History", "Mr. E"),
        )]);
        let suggestion = Schedule::from_entries(vec![(
            at(Day::Wednesday, "10:00 AM"),
            class("Physics", "Dr. A"),
        )]);
        assert_eq!(apply_suggestion(&current, &suggestion), suggestion);
        assert_eq!(apply_suggestion(&current, &Schedule::new()), Schedule::new());
    }
}
