//! Router configuration for the HTTP API.
//!
//! Sets up all routes and middleware (CORS, compression, tracing) and
//! returns the axum router ready for serving.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Timetables are small; a full week of JSON fits well under this.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Permissive CORS for the browser editor; restrict in deployments
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let timetable = "/timetables/{stream}/{semester}";

    let api_v1 = Router::new()
        .route("/grid", get(handlers::get_grid))
        // Timetables
        .route("/timetables", get(handlers::list_timetables))
        .route(
            timetable,
            get(handlers::get_timetable)
                .put(handlers::replace_timetable)
                .delete(handlers::delete_timetable),
        )
        .route(&format!("{timetable}/check"), post(handlers::check_slot))
        .route(
            &format!("{timetable}/slots"),
            post(handlers::place_slot).delete(handlers::remove_slot),
        )
        .route(&format!("{timetable}/moves"), post(handlers::move_class))
        .route(&format!("{timetable}/conflicts"), get(handlers::audit_conflicts))
        // Suggestions
        .route(
            &format!("{timetable}/suggestions"),
            post(handlers::start_suggestion),
        )
        .route(
            &format!("{timetable}/suggestions/{{job_id}}/apply"),
            post(handlers::apply_suggestion),
        )
        // Job management
        .route("/jobs/{job_id}", get(handlers::get_job_status))
        .route("/jobs/{job_id}/logs", get(handlers::stream_job_logs))
        // Catalogs
        .route("/catalog/subjects", get(handlers::list_subjects))
        .route("/catalog/teachers", get(handlers::list_teachers));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
