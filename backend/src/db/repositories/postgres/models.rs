use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

use super::schema::{subjects, teachers, timetables};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = timetables)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TimetableRow {
    pub stream: String,
    pub semester: i32,
    pub schedule_json: Value,
    pub checksum: String,
    pub revision: i64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = timetables)]
pub struct NewTimetableRow {
    pub stream: String,
    pub semester: i32,
    pub schedule_json: Value,
    pub checksum: String,
    pub revision: i64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = subjects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)] // Some fields used only for database operations
pub struct SubjectRow {
    pub subject_id: i64,
    pub stream: String,
    pub semester: i32,
    pub name: String,
    pub teacher: Option<String>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = teachers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)] // Some fields used only for database operations
pub struct TeacherRow {
    pub teacher_id: i64,
    pub name: String,
    pub department: Option<String>,
}
