//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::repository::RepositoryError;
use crate::error::TimetableError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found
    NotFound(String),
    /// Malformed request (bad header, path or query)
    BadRequest(String),
    /// Internal server error
    Internal(String),
    /// Editing rule, role or persistence failure
    Timetable(TimetableError),
}

impl AppError {
    fn repository_response(err: &RepositoryError) -> (StatusCode, ApiError) {
        if err.is_not_found() {
            (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", err.to_string()))
        } else {
            (
                StatusCode::BAD_GATEWAY,
                ApiError::new("REPOSITORY_ERROR", err.to_string()),
            )
        }
    }

    /// Status code and body for this error.
    pub fn parts(&self) -> (StatusCode, ApiError) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
            AppError::Timetable(err) => match err {
                TimetableError::Conflict(conflict) => (
                    StatusCode::CONFLICT,
                    ApiError::new("CONFLICT", conflict.reason()),
                ),
                TimetableError::Validation(msg) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ApiError::new("VALIDATION_ERROR", msg),
                ),
                TimetableError::NoActiveEdit => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ApiError::new("VALIDATION_ERROR", err.to_string()),
                ),
                TimetableError::Forbidden(msg) => {
                    (StatusCode::FORBIDDEN, ApiError::new("FORBIDDEN", msg))
                }
                TimetableError::Repository(source) => Self::repository_response(source),
                TimetableError::SaveFailed { source, reloaded } => {
                    let details = if *reloaded {
                        "the stored timetable was reloaded"
                    } else {
                        "the stored timetable could not be reloaded"
                    };
                    (
                        StatusCode::BAD_GATEWAY,
                        ApiError::new("REPOSITORY_ERROR", format!("Save failed: {}", source))
                            .with_details(details),
                    )
                }
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = self.parts();
        (status, Json(error)).into_response()
    }
}

impl From<TimetableError> for AppError {
    fn from(err: TimetableError) -> Self {
        AppError::Timetable(err)
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Timetable(TimetableError::Repository(err))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinate, Day};
    use crate::scheduler::Conflict;

    #[test]
    fn test_status_mapping() {
        let conflict = AppError::from(TimetableError::from(Conflict::SlotOccupied {
            coordinate: Coordinate::new(Day::Monday, "9:00 AM"),
            subject: "Physics".to_string(),
        }));
        assert_eq!(conflict.parts().0, StatusCode::CONFLICT);
        assert_eq!(conflict.parts().1.code, "CONFLICT");

        let validation = AppError::from(TimetableError::validation("subject is required"));
        assert_eq!(validation.parts().0, StatusCode::UNPROCESSABLE_ENTITY);

        let forbidden = AppError::from(TimetableError::forbidden("students are read-only"));
        assert_eq!(forbidden.parts().0, StatusCode::FORBIDDEN);

        let missing = AppError::from(RepositoryError::not_found("no such timetable"));
        assert_eq!(missing.parts().0, StatusCode::NOT_FOUND);

        let down = AppError::from(RepositoryError::connection("refused"));
        assert_eq!(down.parts().0, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_failed_save_mentions_reload() {
        let err = AppError::from(TimetableError::SaveFailed {
            source: RepositoryError::connection("refused"),
            reloaded: true,
        });
        let (status, body) = err.parts();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.code, "REPOSITORY_ERROR");
        assert!(body.details.unwrap().contains("reloaded"));
    }
}
