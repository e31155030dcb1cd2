//! Timetable suggestions.
//!
//! A [`SuggestionGenerator`] proposes a complete schedule for a key. The
//! built-in [`CatalogSuggestionGenerator`] fills the grid from the subject
//! catalog. Generation runs as a background job; the result is only written
//! when an administrator applies it.

use async_trait::async_trait;
use log::{info, warn};
use std::sync::Arc;

use super::job_tracker::{JobTracker, LogLevel, SuggestionResult};
use crate::api::{Subject, Teacher, TimetableKey};
use crate::db::repository::FullRepository;
use crate::db::services;
use crate::error::{TimetableError, TimetableResult};
use crate::models::{ClassAssignment, Coordinate, Schedule, SlotGrid};
use crate::scheduler;

/// Everything a generator may look at.
#[derive(Debug, Clone)]
pub struct SuggestionRequest {
    pub key: TimetableKey,
    pub grid: SlotGrid,
    pub subjects: Vec<Subject>,
    pub teachers: Vec<Teacher>,
    /// Schedule currently stored for the key.
    pub current: Schedule,
}

#[async_trait]
pub trait SuggestionGenerator: Send + Sync {
    /// Propose a full schedule for the request's key.
    async fn generate(&self, request: &SuggestionRequest) -> TimetableResult<Schedule>;
}

/// Round-robin placement of catalog subjects.
///
/// Cells are visited time-major (every day's first slot, then every day's
/// second slot, ...) so a subject's periods spread across the week. Each
/// cell takes the next subject that still has periods left and whose teacher
/// passes the conflict checker. Subjects without an assigned teacher rotate
/// through the teacher catalog.
#[derive(Debug, Clone)]
pub struct CatalogSuggestionGenerator {
    /// Weekly periods per subject.
    pub periods_per_subject: usize,
}

impl Default for CatalogSuggestionGenerator {
    fn default() -> Self {
        Self {
            periods_per_subject: 3,
        }
    }
}

impl CatalogSuggestionGenerator {
    pub fn new(periods_per_subject: usize) -> Self {
        Self {
            periods_per_subject: periods_per_subject.max(1),
        }
    }

    fn resolve_teachers(&self, request: &SuggestionRequest) -> TimetableResult<Vec<String>> {
        let mut rotation = request.teachers.iter().map(|t| t.name.trim()).filter(|n| !n.is_empty());
        request
            .subjects
            .iter()
            .map(|subject| match subject.teacher.as_deref().map(str::trim) {
                Some(name) if !name.is_empty() => Ok(name.to_string()),
                _ => rotation.next().map(str::to_string).ok_or_else(|| {
                    TimetableError::validation(format!(
                        "no teacher available for subject {}",
                        subject.name
                    ))
                }),
            })
            .collect()
    }

    /// Synchronous core of [`SuggestionGenerator::generate`].
    pub fn build(&self, request: &SuggestionRequest) -> TimetableResult<Schedule> {
        let subjects: Vec<&Subject> = request
            .subjects
            .iter()
            .filter(|s| !s.name.trim().is_empty())
            .collect();
        if subjects.is_empty() {
            return Err(TimetableError::validation(format!(
                "no subjects in the catalog for {}",
                request.key
            )));
        }
        let teachers = self.resolve_teachers(request)?;

        let mut remaining = vec![self.periods_per_subject; subjects.len()];
        let mut next_subject = 0usize;
        let mut schedule = Schedule::new();

        let cells = request.grid.times().iter().flat_map(|time| {
            request
                .grid
                .days()
                .iter()
                .map(move |day| Coordinate::new(*day, time.clone()))
        });

        for cell in cells {
            if remaining.iter().all(|r| *r == 0) {
                break;
            }
            for offset in 0..subjects.len() {
                let idx = (next_subject + offset) % subjects.len();
                if remaining[idx] == 0 {
                    continue;
                }
                let candidate = ClassAssignment::new(subjects[idx].name.as_str(), teachers[idx].as_str())?;
                if scheduler::check_conflict(&schedule, &cell, &candidate, None).is_ok() {
                    schedule = scheduler::upsert(&schedule, None, &cell, candidate);
                    remaining[idx] -= 1;
                    next_subject = idx + 1;
                    break;
                }
            }
        }

        let unplaced: usize = remaining.iter().sum();
        if unplaced > 0 {
            warn!("{}: {} periods could not be placed", request.key, unplaced);
        }
        Ok(schedule)
    }
}

#[async_trait]
impl SuggestionGenerator for CatalogSuggestionGenerator {
    async fn generate(&self, request: &SuggestionRequest) -> TimetableResult<Schedule> {
        self.build(request)
    }
}

/// Start a suggestion job for `key` and return its ID.
///
/// The job loads the catalogs and the current schedule, runs the generator,
/// audits the result and stores it in the tracker.
pub fn spawn_suggestion_job(
    tracker: &JobTracker,
    generator: Arc<dyn SuggestionGenerator>,
    repository: Arc<dyn FullRepository>,
    grid: SlotGrid,
    key: TimetableKey,
    requested_by: &str,
) -> String {
    let job_id = tracker.create_job(&key, requested_by);
    let tracker = tracker.clone();
    let id = job_id.clone();

    tokio::spawn(async move {
        tracker.log(&id, LogLevel::Info, format!("Generating suggestion for {}", key));
        match run_suggestion(&tracker, &id, generator.as_ref(), repository.as_ref(), grid, &key).await
        {
            Ok(result) => {
                let message = format!(
                    "Suggestion ready: {} classes, {} audit findings",
                    result.schedule.len(),
                    result.conflicts.len()
                );
                tracker.log(&id, LogLevel::Success, message);
                tracker.complete_job(&id, result);
                info!("Suggestion job {} for {} completed", id, key);
            }
            Err(e) => {
                warn!("Suggestion job {} for {} failed: {}", id, key, e);
                tracker.fail_job(&id, e.to_string());
            }
        }
    });

    job_id
}

async fn run_suggestion(
    tracker: &JobTracker,
    job_id: &str,
    generator: &dyn SuggestionGenerator,
    repository: &dyn FullRepository,
    grid: SlotGrid,
    key: &TimetableKey,
) -> TimetableResult<SuggestionResult> {
    let subjects = services::list_subjects(repository, key).await?;
    let teachers = services::list_teachers(repository).await?;
    let current = services::load_timetable(repository, key).await?.schedule;
    tracker.log(
        job_id,
        LogLevel::Info,
        format!(
            "Loaded {} subjects, {} teachers, {} current classes",
            subjects.len(),
            teachers.len(),
            current.len()
        ),
    );

    let request = SuggestionRequest {
        key: key.clone(),
        grid,
        subjects,
        teachers,
        current,
    };
    let schedule = generator.generate(&request).await?;
    let conflicts = scheduler::find_conflicts(&schedule, &request.grid);
    if !conflicts.is_empty() {
        tracker.log(
            job_id,
            LogLevel::Warning,
            format!("Suggestion has {} conflicts", conflicts.len()),
        );
    }
    Ok(SuggestionResult {
        schedule,
        conflicts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TimetableKey;
    use crate::db::repositories::LocalRepository;
    use crate::models::Day;
    use crate::services::job_tracker::JobStatus;

    fn subject(name: &str, teacher: Option<&str>) -> Subject {
        Subject {
            name: name.to_string(),
            teacher: teacher.map(str::to_string),
        }
    }

    fn request(subjects: Vec<Subject>, teachers: Vec<&str>) -> SuggestionRequest {
        SuggestionRequest {
            key: TimetableKey::new("CSE", 1),
            grid: SlotGrid::default(),
            subjects,
            teachers: teachers
                .into_iter()
                .map(|name| Teacher {
                    name: name.to_string(),
                    department: None,
                })
                .collect(),
            current: Schedule::new(),
        }
    }

    #[test]
    fn test_places_every_period_without_conflicts() {
        let req = request(
            vec![
                subject("Physics", Some("Dr. A")),
                subject("Maths", Some("Ms. B")),
                subject("Chemistry", Some("Mr. C")),
            ],
            vec![],
        );
        let schedule = CatalogSuggestionGenerator::new(3).build(&req).unwrap();
        assert_eq!(schedule.len(), 9);
        assert!(scheduler::find_conflicts(&schedule, &req.grid).is_empty());
    }

    #[test]
    fn test_teacher_capacity_limits_placements() {
        // One class per teacher per day: five days hold at most five.
        let req = request(
            vec![subject("Physics", Some("Dr. A")), subject("Astronomy", Some("Dr. A"))],
            vec![],
        );
        let schedule = CatalogSuggestionGenerator::new(3).build(&req).unwrap();
        assert_eq!(schedule.len(), 5);
        assert!(scheduler::find_conflicts(&schedule, &req.grid).is_empty());
    }

    #[test]
    fn test_first_row_spreads_across_days() {
        let req = request(vec![subject("Physics", Some("Dr. A"))], vec![]);
        let schedule = CatalogSuggestionGenerator::new(5).build(&req).unwrap();
        for day in Day::WEEKDAYS {
            assert!(schedule.is_occupied(&Coordinate::new(day, "8:00 AM")));
        }
    }

    #[test]
    fn test_rotates_catalog_teachers() {
        let req = request(
            vec![subject("Physics", None), subject("Maths", None)],
            vec!["Dr. A", "Ms. B"],
        );
        let schedule = CatalogSuggestionGenerator::new(1).build(&req).unwrap();
        let teachers: Vec<&str> = schedule.iter().map(|(_, a)| a.teacher.as_str()).collect();
        assert!(teachers.contains(&"Dr. A"));
        assert!(teachers.contains(&"Ms. B"));
    }

    #[test]
    fn test_empty_catalog_is_rejected() {
        let req = request(vec![], vec!["Dr. A"]);
        assert!(matches!(
            CatalogSuggestionGenerator::default().build(&req),
            Err(TimetableError::Validation(_))
        ));
        let req = request(vec![subject("Physics", None)], vec![]);
        assert!(CatalogSuggestionGenerator::default().build(&req).is_err());
    }

    #[test]
    fn test_generation_is_deterministic() {
        let req = request(
            vec![subject("Physics", Some("Dr. A")), subject("Maths", Some("Ms. B"))],
            vec![],
        );
        let generator = CatalogSuggestionGenerator::default();
        assert_eq!(generator.build(&req).unwrap(), generator.build(&req).unwrap());
    }

    #[tokio::test]
    async fn test_job_completes_with_result() {
        let repo = LocalRepository::new();
        let key = TimetableKey::new("CSE", 1);
        repo.set_subjects(key.clone(), vec![subject("Physics", Some("Dr. A"))])
            .unwrap();
        let tracker = JobTracker::new();

        let job_id = spawn_suggestion_job(
            &tracker,
            Arc::new(CatalogSuggestionGenerator::default()),
            Arc::new(repo),
            SlotGrid::default(),
            key.clone(),
            "registrar",
        );

        let job = loop {
            let job = tracker.get_job(&job_id).unwrap();
            if job.is_finished() {
                break job;
            }
            tokio::task::yield_now().await;
        };
        assert_eq!(job.status, JobStatus::Completed);
        let (job_key, schedule) = tracker.suggestion(&job_id).unwrap();
        assert_eq!(job_key, key);
        assert_eq!(schedule.len(), 3);
    }

    #[tokio::test]
    async fn test_job_fails_on_empty_catalog() {
        let tracker = JobTracker::new();
        let job_id = spawn_suggestion_job(
            &tracker,
            Arc::new(CatalogSuggestionGenerator::default()),
            Arc::new(LocalRepository::new()),
            SlotGrid::default(),
            TimetableKey::new("CSE", 1),
            "registrar",
        );

        let job = loop {
            let job = tracker.get_job(&job_id).unwrap();
            if job.is_finished() {
                break job;
            }
            tokio::task::yield_now().await;
        };
        assert_eq!(job.status, JobStatus::Failed);
        assert!(tracker.suggestion(&job_id).is_none());
    }
}
