//! Lifeline — API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lifeline_core::error::DomainError;
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The scenario asset could not be loaded.
    #[error("content error: {0}")]
    Content(#[from] DomainError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `DomainError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            DomainError::ScenarioNotFound(_) => (StatusCode::NOT_FOUND, "scenario_not_found"),
            DomainError::ScenarioLocked(_) => (StatusCode::FORBIDDEN, "scenario_locked"),
            DomainError::InvalidPhase { .. } => (StatusCode::CONFLICT, "invalid_phase"),
            DomainError::InputSuppressed => (StatusCode::CONFLICT, "input_suppressed"),
            DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            DomainError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
            }
        };

        let body = ErrorBody {
            error: error_code,
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use lifeline_core::ids::ScenarioId;

    fn status_of(err: DomainError) -> StatusCode {
        let response = ApiError(err).into_response();
        response.status()
    }

    #[test]
    fn test_scenario_not_found_maps_to_404() {
        assert_eq!(
            status_of(DomainError::ScenarioNotFound(ScenarioId::new("missing"))),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_scenario_locked_maps_to_403() {
        assert_eq!(
            status_of(DomainError::ScenarioLocked(ScenarioId::new("rooftop"))),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_invalid_phase_maps_to_409() {
        assert_eq!(
            status_of(DomainError::InvalidPhase {
                expected: "handoff",
                actual: "dialogue",
            }),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_input_suppressed_maps_to_409() {
        assert_eq!(status_of(DomainError::InputSuppressed), StatusCode::CONFLICT);
    }

    #[test]
    fn test_validation_maps_to_400() {
        assert_eq!(
            status_of(DomainError::Validation("bad input".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_infrastructure_maps_to_500() {
        assert_eq!(
            status_of(DomainError::Infrastructure("disk full".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
