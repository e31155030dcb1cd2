//! Slot grid: the addressable (day × time) space of a timetable.
//!
//! The grid is configuration, not semantics. The default is the five
//! weekdays by seven morning/early-afternoon slots, but any ordered set of
//! days and time labels can be configured (see [`crate::config::GridSettings`]).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use super::schedule::{ClassAssignment, Schedule};
use crate::error::{TimetableError, TimetableResult};

/// Day of the week. Ordered Monday → Sunday.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    pub const WEEKDAYS: [Day; 5] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Day {
    type Err = String;

    /// Parse a day name. Accepts full names and three-letter abbreviations,
    /// case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monday" | "mon" => Ok(Day::Monday),
            "tuesday" | "tue" => Ok(Day::Tuesday),
            "wednesday" | "wed" => Ok(Day::Wednesday),
            "thursday" | "thu" => Ok(Day::Thursday),
            "friday" | "fri" => Ok(Day::Friday),
            "saturday" | "sat" => Ok(Day::Saturday),
            "sunday" | "sun" => Ok(Day::Sunday),
            _ => Err(format!("Unknown day: {}", s)),
        }
    }
}

// Days are map keys in the schedule's JSON form, so they go over the wire
// as plain strings.
impl Serialize for Day {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Day {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A (day, time) cell address.
///
/// Time labels are stored trimmed; deserialized coordinates go through
/// [`Coordinate::new`] as well.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawCoordinate")]
pub struct Coordinate {
    pub day: Day,
    pub time: String,
}

#[derive(Deserialize)]
struct RawCoordinate {
    day: Day,
    time: String,
}

impl From<RawCoordinate> for Coordinate {
    fn from(raw: RawCoordinate) -> Self {
        Coordinate::new(raw.day, raw.time)
    }
}

impl Coordinate {
    /// Create a coordinate. The time label is trimmed.
    pub fn new(day: Day, time: impl Into<String>) -> Self {
        let time = time.into();
        Self {
            day,
            time: time.trim().to_string(),
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.day, self.time)
    }
}

/// One rendered cell: its coordinate and the current occupant, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    pub day: Day,
    pub time: String,
    pub assignment: Option<ClassAssignment>,
}

/// Fixed Cartesian product of days × time slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotGrid {
    days: Vec<Day>,
    times: Vec<String>,
}

pub const DEFAULT_TIME_SLOTS: [&str; 7] = [
    "8:00 AM", "9:00 AM", "10:00 AM", "11:00 AM", "12:00 PM", "1:00 PM", "2:00 PM",
];

impl Default for SlotGrid {
    fn default() -> Self {
        Self {
            days: Day::WEEKDAYS.to_vec(),
            times: DEFAULT_TIME_SLOTS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl SlotGrid {
    /// Build a grid from ordered days and time labels.
    ///
    /// Days are sorted Monday → Sunday; time labels keep the given order.
    /// Both lists must be non-empty and free of duplicates.
    pub fn new(mut days: Vec<Day>, times: Vec<String>) -> TimetableResult<Self> {
        if days.is_empty() {
            return Err(TimetableError::validation("grid needs at least one day"));
        }
        let times: Vec<String> = times.into_iter().map(|t| t.trim().to_string()).collect();
        if times.is_empty() {
            return Err(TimetableError::validation(
                "grid needs at least one time slot",
            ));
        }
        if times.iter().any(|t| t.is_empty()) {
            return Err(TimetableError::validation("time slot labels must not be empty"));
        }

        let unique_days: HashSet<_> = days.iter().collect();
        if unique_days.len() != days.len() {
            return Err(TimetableError::validation("grid days must be unique"));
        }
        let unique_times: HashSet<_> = times.iter().collect();
        if unique_times.len() != times.len() {
            return Err(TimetableError::validation("grid time slots must be unique"));
        }

        days.sort();
        Ok(Self { days, times })
    }

    pub fn days(&self) -> &[Day] {
        &self.days
    }

    pub fn times(&self) -> &[String] {
        &self.times
    }

    /// Number of addressable cells.
    pub fn len(&self) -> usize {
        self.days.len() * self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row/column position of a coordinate (day index, time index).
    pub fn position(&self, coordinate: &Coordinate) -> Option<(usize, usize)> {
        let day = self.days.iter().position(|d| *d == coordinate.day)?;
        let time = self.time_index(&coordinate.time)?;
        Some((day, time))
    }

    /// Index of a time label within a day, if it belongs to the grid.
    pub fn time_index(&self, time: &str) -> Option<usize> {
        self.times.iter().position(|t| t == time.trim())
    }

    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        self.position(coordinate).is_some()
    }

    /// Reject coordinates that are not part of the grid.
    pub fn validate(&self, coordinate: &Coordinate) -> TimetableResult<()> {
        if !self.days.contains(&coordinate.day) {
            return Err(TimetableError::validation(format!(
                "day {} is not part of the timetable grid",
                coordinate.day
            )));
        }
        if self.time_index(&coordinate.time).is_none() {
            return Err(TimetableError::validation(format!(
                "time slot '{}' is not part of the timetable grid",
                coordinate.time
            )));
        }
        Ok(())
    }

    /// All coordinates, days outer, times inner.
    pub fn coordinates(&self) -> Vec<Coordinate> {
        self.days
            .iter()
            .flat_map(|day| self.times.iter().map(move |t| Coordinate::new(*day, t.clone())))
            .collect()
    }

    /// Render one cell per coordinate with its current occupant.
    pub fn cells(&self, schedule: &Schedule) -> Vec<GridCell> {
        self.coordinates()
            .into_iter()
            .map(|coordinate| GridCell {
                assignment: schedule.get(&coordinate).cloned(),
                day: coordinate.day,
                time: coordinate.time,
            })
            .collect()
    }

    /// Sort coordinates by day, then by the grid's time order. Labels
    /// outside the grid sort after every known slot, alphabetically.
    pub fn sort_coordinates(&self, coordinates: &mut [Coordinate]) {
        coordinates.sort_by(|a, b| {
            let key = |c: &Coordinate| (c.day, self.time_index(&c.time).unwrap_or(usize::MAX));
            key(a).cmp(&key(b)).then_with(|| a.time.cmp(&b.time))
        });
    }
}
