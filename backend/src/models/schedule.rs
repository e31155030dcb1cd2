//! Timetable data model: class assignments and the sparse schedule map.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::grid::{Coordinate, Day};
use crate::error::{TimetableError, TimetableResult};

/// One scheduled lesson. Has no identity beyond the cell it occupies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassAssignment {
    pub subject: String,
    pub teacher: String,
}

impl ClassAssignment {
    /// Create an assignment, trimming both fields.
    ///
    /// # Errors
    /// Returns a validation error if either field is empty after trimming.
    pub fn new(subject: impl Into<String>, teacher: impl Into<String>) -> TimetableResult<Self> {
        let assignment = Self {
            subject: subject.into().trim().to_string(),
            teacher: teacher.into().trim().to_string(),
        };
        assignment.validate()?;
        Ok(assignment)
    }

    /// Check that both fields are present. Used for values that arrived
    /// through deserialization rather than [`ClassAssignment::new`].
    pub fn validate(&self) -> TimetableResult<()> {
        if self.subject.trim().is_empty() {
            return Err(TimetableError::validation("subject is required"));
        }
        if self.teacher.trim().is_empty() {
            return Err(TimetableError::validation("teacher is required"));
        }
        Ok(())
    }

    /// Trimmed copy of this assignment.
    pub fn normalized(&self) -> Self {
        Self {
            subject: self.subject.trim().to_string(),
            teacher: self.teacher.trim().to_string(),
        }
    }
}

type DayMap = BTreeMap<Day, BTreeMap<String, ClassAssignment>>;

/// Error for a JSON schedule whose time labels collide once trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateSlot(pub Coordinate);

impl std::fmt::Display for DuplicateSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "slot {} appears more than once", self.0)
    }
}

/// Sparse mapping of day → time → assignment for one stream/semester.
///
/// A missing entry means the slot is free. Day keys whose inner map becomes
/// empty are pruned, so equal contents always compare equal.
///
/// JSON form:
/// ```json
/// { "Monday": { "9:00 AM": { "subject": "Physics", "teacher": "Dr. A" } } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DayMap", into = "DayMap")]
pub struct Schedule {
    days: DayMap,
}

impl TryFrom<DayMap> for Schedule {
    type Error = DuplicateSlot;

    /// Time labels and assignment fields are trimmed. Two labels that only
    /// differ by surrounding whitespace address the same slot and are
    /// rejected rather than merged.
    fn try_from(days: DayMap) -> Result<Self, Self::Error> {
        let mut schedule = Self::new();
        for (day, slots) in days {
            for (time, assignment) in slots {
                let coordinate = Coordinate::new(day, time);
                if schedule.is_occupied(&coordinate) {
                    return Err(DuplicateSlot(coordinate));
                }
                schedule.insert(coordinate, assignment.normalized());
            }
        }
        Ok(schedule)
    }
}

impl From<Schedule> for DayMap {
    fn from(schedule: Schedule) -> Self {
        schedule.days
    }
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a schedule from explicit entries. Later entries overwrite
    /// earlier ones at the same coordinate.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Coordinate, ClassAssignment)>,
    {
        let mut schedule = Self::new();
        for (coordinate, assignment) in entries {
            schedule.insert(coordinate, assignment);
        }
        schedule
    }

    pub fn get(&self, coordinate: &Coordinate) -> Option<&ClassAssignment> {
        self.days
            .get(&coordinate.day)
            .and_then(|slots| slots.get(coordinate.time.trim()))
    }

    pub fn is_occupied(&self, coordinate: &Coordinate) -> bool {
        self.get(coordinate).is_some()
    }

    /// Occupied slots on one day, ordered by time label.
    pub fn day_slots(&self, day: Day) -> impl Iterator<Item = (&str, &ClassAssignment)> {
        self.days
            .get(&day)
            .into_iter()
            .flat_map(|slots| slots.iter().map(|(t, a)| (t.as_str(), a)))
    }

    /// Days that hold at least one assignment.
    pub fn days(&self) -> impl Iterator<Item = Day> + '_ {
        self.days.keys().copied()
    }

    /// Every occupied coordinate with its assignment.
    pub fn iter(&self) -> impl Iterator<Item = (Coordinate, &ClassAssignment)> {
        self.days.iter().flat_map(|(day, slots)| {
            slots
                .iter()
                .map(move |(time, assignment)| (Coordinate::new(*day, time.clone()), assignment))
        })
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.days.values().map(|slots| slots.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Coordinates at which `teacher` is scheduled.
    pub fn slots_for_teacher<'a>(&'a self, teacher: &'a str) -> impl Iterator<Item = Coordinate> + 'a {
        self.iter()
            .filter(move |(_, a)| a.teacher == teacher)
            .map(|(c, _)| c)
    }

    /// Write an assignment, returning the previous occupant.
    pub(crate) fn insert(
        &mut self,
        coordinate: Coordinate,
        assignment: ClassAssignment,
    ) -> Option<ClassAssignment> {
        self.days
            .entry(coordinate.day)
            .or_default()
            .insert(coordinate.time.trim().to_string(), assignment)
    }

    /// Remove an assignment, pruning the day key if it empties.
    pub(crate) fn take(&mut self, coordinate: &Coordinate) -> Option<ClassAssignment> {
        let slots = self.days.get_mut(&coordinate.day)?;
        let removed = slots.remove(coordinate.time.trim());
        if slots.is_empty() {
            self.days.remove(&coordinate.day);
        }
        removed
    }
}
