//! Conflict checking for slot placement.
//!
//! Two rules decide whether a candidate assignment may be written at a
//! target cell:
//!
//! 1. **Slot occupancy**: the target must be free, unless the edit started
//!    from that same cell (re-saving a slot in place).
//! 2. **Teacher double-booking**: the candidate's teacher must not already
//!    teach in another slot on the same day. The slot being vacated (the
//!    origin) is ignored. Different days are never compared.
//!
//! Both checks are pure: the verdict depends only on the arguments.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::models::{ClassAssignment, Coordinate, Day, Schedule};

/// A rule violation that blocks a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Conflict {
    #[error("slot occupied by {subject}")]
    SlotOccupied {
        coordinate: Coordinate,
        subject: String,
    },

    #[error("teacher {teacher} already scheduled at {time}")]
    TeacherDoubleBooked {
        teacher: String,
        day: Day,
        time: String,
    },
}

impl Conflict {
    /// Human-readable reason shown inline to the user.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

/// Decide whether `candidate` may be written at `target`.
///
/// `origin` is the cell the edit started from, when this is an edit or move
/// of an existing class rather than a fresh placement.
pub fn check_conflict(
    schedule: &Schedule,
    target: &Coordinate,
    candidate: &ClassAssignment,
    origin: Option<&Coordinate>,
) -> Result<(), Conflict> {
    if let Some(occupant) = schedule.get(target) {
        if origin != Some(target) {
            debug!("placement at {} rejected: occupied by {}", target, occupant.subject);
            return Err(Conflict::SlotOccupied {
                coordinate: target.clone(),
                subject: occupant.subject.clone(),
            });
        }
    }

    for (time, assignment) in schedule.day_slots(target.day) {
        let is_origin = origin.is_some_and(|o| o.day == target.day && o.time == time);
        if is_origin {
            continue;
        }
        if assignment.teacher == candidate.teacher {
            debug!(
                "placement at {} rejected: {} already teaches at {}",
                target, candidate.teacher, time
            );
            return Err(Conflict::TeacherDoubleBooked {
                teacher: candidate.teacher.clone(),
                day: target.day,
                time: time.to_string(),
            });
        }
    }

    Ok(())
}

/// Validate relocating the class at `from` to `to` with both rules.
///
/// An empty source has nothing to move and passes.
pub fn check_move(schedule: &Schedule, from: &Coordinate, to: &Coordinate) -> Result<(), Conflict> {
    match schedule.get(from) {
        Some(assignment) => check_conflict(schedule, to, assignment, Some(from)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: Day, time: &str) -> Coordinate {
        Coordinate::new(day, time)
    }

    fn class(subject: &str, teacher: &str) -> ClassAssignment {
        ClassAssignment::new(subject, teacher).unwrap()
    }

    #[test]
    fn test_empty_schedule_accepts_anything() {
        let schedule = Schedule::new();
        let verdict = check_conflict(
            &schedule,
            &at(Day::Monday, "9:00 AM"),
            &class("Physics", "Dr. A"),
            None,
        );
        assert!(verdict.is_ok());
    }

    #[test]
    fn test_occupied_slot_conflicts_without_origin() {
        let schedule = Schedule::from_entries(vec![(
            at(Day::Monday, "9:00 AM"),
            class("Physics", "Dr. A"),
        )]);
        let err = check_conflict(
            &schedule,
            &at(Day::Monday, "9:00 AM"),
            &class("Maths", "Ms. B"),
            None,
        )
        .unwrap_err();
        assert_eq!(err.reason(), "slot occupied by Physics");
    }

    #[test]
    fn test_resaving_same_slot_is_allowed() {
        let cell = at(Day::Monday, "9:00 AM");
        let schedule = Schedule::from_entries(vec![(cell.clone(), class("Physics", "Dr. A"))]);
        // Same teacher re-saved in place: the origin is skipped by both rules.
        assert!(check_conflict(&schedule, &cell, &class("Physics Lab", "Dr. A"), Some(&cell)).is_ok());
    }

    #[test]
    fn test_teacher_double_booking_same_day() {
        let schedule = Schedule::from_entries(vec![(
            at(Day::Monday, "9:00 AM"),
            class("Physics", "Dr. A"),
        )]);
        let err = check_conflict(
            &schedule,
            &at(Day::Monday, "10:00 AM"),
            &class("Chemistry", "Dr. A"),
            None,
        )
        .unwrap_err();
        assert_eq!(err.reason(), "teacher Dr. A already scheduled at 9:00 AM");
        assert!(matches!(err, Conflict::TeacherDoubleBooked { day: Day::Monday, .. }));
    }

    #[test]
    fn test_teacher_on_other_day_is_not_checked() {
        let schedule = Schedule::from_entries(vec![(
            at(Day::Monday, "9:00 AM"),
            class("Physics", "Dr. A"),
        )]);
        assert!(check_conflict(
            &schedule,
            &at(Day::Tuesday, "9:00 AM"),
            &class("Physics", "Dr. A"),
            None,
        )
        .is_ok());
    }

    #[test]
    fn test_origin_slot_is_skipped_for_teacher_rule() {
        let from = at(Day::Monday, "9:00 AM");
        let schedule = Schedule::from_entries(vec![(from.clone(), class("Physics", "Dr. A"))]);
        assert!(check_conflict(
            &schedule,
            &at(Day::Monday, "11:00 AM"),
            &class("Physics", "Dr. A"),
            Some(&from),
        )
        .is_ok());
    }

    #[test]
    fn test_occupancy_is_reported_before_teacher_clash() {
        let schedule = Schedule::from_entries(vec![
            (at(Day::Monday, "9:00 AM"), class("Physics", "Dr. A")),
            (at(Day::Monday, "10:00 AM"), class("Maths", "Ms. B")),
        ]);
        let err = check_conflict(
            &schedule,
            &at(Day::Monday, "10:00 AM"),
            &class("Chemistry", "Dr. A"),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, Conflict::SlotOccupied { .. }));
    }

    #[test]
    fn test_check_move_uses_origin() {
        let from = at(Day::Tuesday, "8:00 AM");
        let schedule = Schedule::from_entries(vec![
            (from.clone(), class("Physics", "Dr. A")),
            (at(Day::Wednesday, "9:00 AM"), class("Maths", "Dr. A")),
        ]);
        assert!(check_move(&schedule, &from, &at(Day::Tuesday, "11:00 AM")).is_ok());
        assert!(check_move(&schedule, &from, &at(Day::Wednesday, "10:00 AM")).is_err());
        assert!(check_move(&schedule, &at(Day::Friday, "8:00 AM"), &from).is_ok());
    }

    #[test]
    fn test_conflict_serializes_with_kind_tag() {
        let conflict = Conflict::TeacherDoubleBooked {
            teacher: "Dr. A".to_string(),
            day: Day::Monday,
            time: "9:00 AM".to_string(),
        };
        let value = serde_json::to_value(&conflict).unwrap();
        assert_eq!(value["kind"], "teacher_double_booked");
        assert_eq!(value["day"], "Monday");
    }
}
