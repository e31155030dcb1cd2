//! Whole-schedule audit.
//!
//! Used to preview generated suggestions and to report on stored timetables.
//! Applying a suggestion never depends on this report.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{Coordinate, Day, Schedule, SlotGrid};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// The cell is not part of the configured grid.
    OutsideGrid,
    /// The teacher also teaches earlier the same day.
    TeacherDoubleBooked,
}

/// One finding of the audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictRecord {
    pub kind: ConflictKind,
    pub day: Day,
    pub time: String,
    pub subject: String,
    pub teacher: String,
    /// For double bookings, the first slot the teacher already holds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clashes_with: Option<String>,
    pub message: String,
}

/// Scan a schedule for out-of-grid cells and same-day teacher clashes.
///
/// Each day's slots are visited in grid order; every slot after a teacher's
/// first slot of the day is reported against that first slot.
pub fn find_conflicts(schedule: &Schedule, grid: &SlotGrid) -> Vec<ConflictRecord> {
    let mut conflicts = Vec::new();

    let mut cells: Vec<Coordinate> = schedule.iter().map(|(c, _)| c).collect();
    grid.sort_coordinates(&mut cells);

    for cell in &cells {
        if grid.contains(cell) {
            continue;
        }
        if let Some(assignment) = schedule.get(cell) {
            conflicts.push(ConflictRecord {
                kind: ConflictKind::OutsideGrid,
                day: cell.day,
                time: cell.time.clone(),
                subject: assignment.subject.clone(),
                teacher: assignment.teacher.clone(),
                clashes_with: None,
                message: format!("{} is not part of the timetable grid", cell),
            });
        }
    }

    // (day, teacher) -> first time seen
    let mut first_slot: BTreeMap<(Day, &str), &str> = BTreeMap::new();
    for cell in &cells {
        let Some(assignment) = schedule.get(cell) else {
            continue;
        };
        match first_slot.get(&(cell.day, assignment.teacher.as_str())) {
            Some(first) => conflicts.push(ConflictRecord {
                kind: ConflictKind::TeacherDoubleBooked,
                day: cell.day,
                time: cell.time.clone(),
                subject: assignment.subject.clone(),
                teacher: assignment.teacher.clone(),
                clashes_with: Some(first.to_string()),
                message: format!(
                    "teacher {} already scheduled at {}",
                    assignment.teacher, first
                ),
            }),
            None => {
                first_slot.insert((cell.day, assignment.teacher.as_str()), cell.time.as_str());
            }
        }
    }

    conflicts
}
