#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use institute_timetable::api::{
    Actor, ClassAssignment, Coordinate, Day, Role, Subject, Teacher, TimetableKey,
};
use institute_timetable::db::repositories::LocalRepository;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

// ==================== Fixtures ====================

pub fn cse1() -> TimetableKey {
    TimetableKey::new("CSE", 1)
}

pub fn admin() -> Actor {
    Actor::admin("registrar")
}

pub fn student() -> Actor {
    Actor::new("s-042", Role::Student)
}

pub fn at(day: Day, time: &str) -> Coordinate {
    Coordinate::new(day, time)
}

pub fn class(subject: &str, teacher: &str) -> ClassAssignment {
    ClassAssignment::new(subject, teacher).unwrap()
}

/// Local repository with a small CSE semester 1 catalog.
pub fn seeded_repository() -> LocalRepository {
    let repo = LocalRepository::new();
    repo.set_teachers(vec![
        Teacher {
            name: "Dr. A".to_string(),
            department: Some("Physics".to_string()),
        },
        Teacher {
            name: "Ms. B".to_string(),
            department: Some("Mathematics".to_string()),
        },
    ])
    .unwrap();
    repo.set_subjects(
        cse1(),
        vec![
            Subject {
                name: "Physics".to_string(),
                teacher: Some("Dr. A".to_string()),
            },
            Subject {
                name: "Maths".to_string(),
                teacher: Some("Ms. B".to_string()),
            },
            Subject {
                name: "Chemistry".to_string(),
                teacher: None,
            },
        ],
    )
    .unwrap();
    repo
}
