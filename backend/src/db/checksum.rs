//! Checksums for detecting unchanged timetable snapshots.

use sha2::{Digest, Sha256};

use crate::api::Schedule;

/// Calculate SHA-256 checksum of string content.
///
/// # Returns
/// Hexadecimal string representation of the SHA-256 hash.
pub fn calculate_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    hex::encode(result)
}

/// Checksum of a schedule's canonical JSON form.
///
/// The schedule is backed by ordered maps, so equal schedules serialize to
/// identical text.
pub fn schedule_checksum(schedule: &Schedule) -> String {
    // Serializing string-keyed maps of plain structs cannot fail.
    let canonical = serde_json::to_string(schedule).unwrap_or_default();
    calculate_checksum(&canonical)
}
