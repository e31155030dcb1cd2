//! HTTP handlers for the REST API.
//!
//! Each request opens a short-lived editor session on the addressed
//! timetable; writes go through the shared save queue in [`AppState`].

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;

use super::dto::{
    CheckResponse, ConflictsResponse, DeleteResponse, GridResponse, HealthResponse,
    JobStatusResponse, MoveRequest, MoveResponse, PlaceRequest, ReplaceRequest, SlotQuery,
    SubjectListResponse, SubjectsQuery, SuggestionJobResponse, TeacherListResponse,
    TimetableListResponse, TimetableView,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::{Actor, TimetableKey, TimetableRecord};
use crate::db::services as db_services;
use crate::error::TimetableError;
use crate::scheduler::MoveOutcome;
use crate::services::{spawn_suggestion_job, JobStatus};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

fn key_from_path(state: &AppState, stream: String, semester: u32) -> Result<TimetableKey, AppError> {
    let key = TimetableKey::new(stream.trim(), semester);
    key.validate(state.settings.max_semester)?;
    Ok(key)
}

// =============================================================================
// Health & Grid
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

/// GET /v1/grid
pub async fn get_grid(State(state): State<AppState>) -> HandlerResult<GridResponse> {
    let settings = &state.settings;
    Ok(Json(GridResponse {
        days: settings.grid.days().to_vec(),
        times: settings.grid.times().to_vec(),
        max_semester: settings.max_semester,
        strict_moves: settings.strict_moves,
    }))
}

// =============================================================================
// Timetables
// =============================================================================

/// GET /v1/timetables
pub async fn list_timetables(
    State(state): State<AppState>,
) -> HandlerResult<TimetableListResponse> {
    let timetables = db_services::list_timetables(state.repository.as_ref()).await?;
    let total = timetables.len();
    Ok(Json(TimetableListResponse { timetables, total }))
}

/// GET /v1/timetables/{stream}/{semester}
///
/// The stored record plus one cell per grid coordinate. A timetable that
/// was never saved comes back empty at revision 0.
pub async fn get_timetable(
    State(state): State<AppState>,
    Path((stream, semester)): Path<(String, u32)>,
) -> HandlerResult<TimetableView> {
    let key = key_from_path(&state, stream, semester)?;
    let record = db_services::load_timetable(state.repository.as_ref(), &key).await?;
    let cells = state.settings.grid.cells(&record.schedule);
    Ok(Json(TimetableView { record, cells }))
}

/// PUT /v1/timetables/{stream}/{semester}
pub async fn replace_timetable(
    State(state): State<AppState>,
    actor: Actor,
    Path((stream, semester)): Path<(String, u32)>,
    Json(request): Json<ReplaceRequest>,
) -> HandlerResult<TimetableRecord> {
    actor.ensure_can_edit()?;
    let key = key_from_path(&state, stream, semester)?;
    let mut editor = state.edit_session(key).await?;
    let record = editor.apply_suggestion(&actor, &request.schedule).await?;
    Ok(Json(record))
}

/// DELETE /v1/timetables/{stream}/{semester}
pub async fn delete_timetable(
    State(state): State<AppState>,
    actor: Actor,
    Path((stream, semester)): Path<(String, u32)>,
) -> HandlerResult<DeleteResponse> {
    actor.ensure_can_edit()?;
    let key = key_from_path(&state, stream, semester)?;
    let _guard = state.lock_key(&key).await;
    let deleted = db_services::delete_timetable(state.repository.as_ref(), &key).await?;
    Ok(Json(DeleteResponse { deleted }))
}

// =============================================================================
// Cell editing
// =============================================================================

/// POST /v1/timetables/{stream}/{semester}/check
///
/// Dry run: a conflict is reported in the body, not as an error status.
pub async fn check_slot(
    State(state): State<AppState>,
    Path((stream, semester)): Path<(String, u32)>,
    Json(request): Json<PlaceRequest>,
) -> HandlerResult<CheckResponse> {
    let key = key_from_path(&state, stream, semester)?;
    let editor = state.editor(key).await?;
    match editor.check(&request.target, &request.candidate(), request.origin.as_ref()) {
        Ok(()) => Ok(Json(CheckResponse {
            ok: true,
            conflict: None,
        })),
        Err(TimetableError::Conflict(conflict)) => Ok(Json(CheckResponse {
            ok: false,
            conflict: Some(conflict),
        })),
        Err(e) => Err(e.into()),
    }
}

/// POST /v1/timetables/{stream}/{semester}/slots
pub async fn place_slot(
    State(state): State<AppState>,
    actor: Actor,
    Path((stream, semester)): Path<(String, u32)>,
    Json(request): Json<PlaceRequest>,
) -> HandlerResult<TimetableRecord> {
    actor.ensure_can_edit()?;
    let key = key_from_path(&state, stream, semester)?;
    let mut editor = state.edit_session(key).await?;
    let record = editor
        .place(&actor, request.origin.as_ref(), &request.target, request.candidate())
        .await?;
    Ok(Json(record))
}

/// DELETE /v1/timetables/{stream}/{semester}/slots?day=&time=
pub async fn remove_slot(
    State(state): State<AppState>,
    actor: Actor,
    Path((stream, semester)): Path<(String, u32)>,
    Query(slot): Query<SlotQuery>,
) -> HandlerResult<TimetableRecord> {
    actor.ensure_can_edit()?;
    let key = key_from_path(&state, stream, semester)?;
    let mut editor = state.edit_session(key).await?;
    let record = editor.remove(&actor, &slot.into()).await?;
    Ok(Json(record))
}

/// POST /v1/timetables/{stream}/{semester}/moves
pub async fn move_class(
    State(state): State<AppState>,
    actor: Actor,
    Path((stream, semester)): Path<(String, u32)>,
    Json(request): Json<MoveRequest>,
) -> HandlerResult<MoveResponse> {
    actor.ensure_can_edit()?;
    let key = key_from_path(&state, stream, semester)?;
    let mut editor = state.edit_session(key).await?;
    let outcome = editor.move_class(&actor, &request.from, &request.to).await?;
    let reason = match outcome {
        MoveOutcome::Moved(_) => None,
        MoveOutcome::NoOp(reason) => Some(reason),
    };
    Ok(Json(MoveResponse {
        moved: reason.is_none(),
        reason,
        record: editor.snapshot(),
    }))
}

/// GET /v1/timetables/{stream}/{semester}/conflicts
pub async fn audit_conflicts(
    State(state): State<AppState>,
    Path((stream, semester)): Path<(String, u32)>,
) -> HandlerResult<ConflictsResponse> {
    let key = key_from_path(&state, stream, semester)?;
    let editor = state.editor(key.clone()).await?;
    Ok(Json(ConflictsResponse {
        key,
        conflicts: editor.audit(),
    }))
}

// =============================================================================
// Suggestions
// =============================================================================

/// POST /v1/timetables/{stream}/{semester}/suggestions
///
/// Start generating a suggestion in the background. Returns a job ID.
pub async fn start_suggestion(
    State(state): State<AppState>,
    actor: Actor,
    Path((stream, semester)): Path<(String, u32)>,
) -> Result<(StatusCode, Json<SuggestionJobResponse>), AppError> {
    actor.ensure_can_edit()?;
    let key = key_from_path(&state, stream, semester)?;
    let job_id = spawn_suggestion_job(
        &state.job_tracker,
        state.generator.clone(),
        state.repository.clone(),
        state.settings.grid.clone(),
        key,
        &actor.user,
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(SuggestionJobResponse {
            message: format!("Suggestion started. Track progress at /v1/jobs/{}/logs", job_id),
            job_id,
        }),
    ))
}

/// POST /v1/timetables/{stream}/{semester}/suggestions/{job_id}/apply
pub async fn apply_suggestion(
    State(state): State<AppState>,
    actor: Actor,
    Path((stream, semester, job_id)): Path<(String, u32, String)>,
) -> HandlerResult<TimetableRecord> {
    actor.ensure_can_edit()?;
    let key = key_from_path(&state, stream, semester)?;
    let (job_key, suggestion) = state
        .job_tracker
        .suggestion(&job_id)
        .ok_or_else(|| AppError::NotFound(format!("No completed suggestion for job {}", job_id)))?;
    if job_key != key {
        return Err(AppError::BadRequest(format!(
            "Job {} was generated for {}, not {}",
            job_id, job_key, key
        )));
    }

    let mut editor = state.edit_session(key).await?;
    let record = editor.apply_suggestion(&actor, &suggestion).await?;
    Ok(Json(record))
}

// =============================================================================
// Async Job Management
// =============================================================================

/// GET /v1/jobs/{job_id}
pub async fn get_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> HandlerResult<JobStatusResponse> {
    let job = state
        .job_tracker
        .get_job(&job_id)
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", job_id)))?;

    Ok(Json(JobStatusResponse {
        job_id: job.job_id,
        key: job.key,
        status: job.status,
        logs: job.logs,
        result: job.result,
    }))
}

/// GET /v1/jobs/{job_id}/logs
///
/// Stream job logs via Server-Sent Events (SSE).
pub async fn stream_job_logs(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    if state.job_tracker.get_job(&job_id).is_none() {
        return Err(AppError::NotFound(format!("Job {} not found", job_id)));
    }

    let tracker = state.job_tracker.clone();
    let stream = async_stream::stream! {
        let mut sent = 0;
        loop {
            // Read the status before the logs so a job finishing in between
            // still has its last entries flushed on the next pass.
            let job = tracker.get_job(&job_id);

            for log in tracker.logs_since(&job_id, sent) {
                sent += 1;
                let event_data = serde_json::to_string(&log).unwrap_or_default();
                yield Ok(Event::default().data(event_data));
            }

            match job {
                Some(job) if job.status == JobStatus::Running => {}
                Some(job) => {
                    let final_event = serde_json::json!({
                        "status": job.status,
                        "result": job.result,
                    });
                    yield Ok(Event::default()
                        .event("complete")
                        .data(serde_json::to_string(&final_event).unwrap_or_default()));
                    break;
                }
                None => break,
            }

            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    };

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(1))
            .text("keep-alive"),
    ))
}

// =============================================================================
// Catalogs
// =============================================================================

/// GET /v1/catalog/subjects?stream=&semester=
pub async fn list_subjects(
    State(state): State<AppState>,
    Query(query): Query<SubjectsQuery>,
) -> HandlerResult<SubjectListResponse> {
    let key = key_from_path(&state, query.stream, query.semester)?;
    let subjects = db_services::list_subjects(state.repository.as_ref(), &key).await?;
    Ok(Json(SubjectListResponse { subjects }))
}

/// GET /v1/catalog/teachers
pub async fn list_teachers(State(state): State<AppState>) -> HandlerResult<TeacherListResponse> {
    let teachers = db_services::list_teachers(state.repository.as_ref()).await?;
    Ok(Json(TeacherListResponse { teachers }))
}
