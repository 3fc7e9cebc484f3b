//! Routes for player settings.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use lifeline_core::error::DomainError;
use lifeline_core::settings::Settings;
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/v1/settings
async fn get_settings(State(state): State<AppState>) -> Json<Settings> {
    Json(state.engine().settings().clone())
}

/// PUT /api/v1/settings
#[instrument(
    skip(state, settings),
    fields(
        narration_enabled = settings.narration_enabled,
        music_enabled = settings.music_enabled,
        dev_unlock_all = settings.dev_unlock_all
    )
)]
async fn put_settings(
    State(state): State<AppState>,
    Json(settings): Json<Settings>,
) -> Result<Json<Settings>, ApiError> {
    if !settings.voice_rate.is_finite() || settings.voice_rate <= 0.0 {
        return Err(DomainError::Validation(format!(
            "voice_rate must be a positive number, got {}",
            settings.voice_rate
        ))
        .into());
    }

    info!("applying settings");

    state.engine().apply_settings(settings.clone());
    state.settings_repository.save_settings(&settings).await?;

    Ok(Json(settings))
}

/// Returns the router for settings.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/v1/settings", get(get_settings).put(put_settings))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use lifeline_test_support::{FailingRepository, InMemorySettingsRepository};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::routes::test_app_state;

    async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, Value) {
        let app = router().with_state(state.clone());
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body_bytes).unwrap())
    }

    fn put(body: &Value) -> Request<Body> {
        Request::builder()
            .method("PUT")
            .uri("/api/v1/settings")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_settings_returns_defaults() {
        // Arrange
        let state = test_app_state();
        let request = Request::builder()
            .uri("/api/v1/settings")
            .body(Body::empty())
            .unwrap();

        // Act
        let (status, json) = send(&state, request).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["narration_enabled"], true);
        assert_eq!(json["music_enabled"], true);
        assert_eq!(json["dev_unlock_all"], false);
    }

    #[tokio::test]
    async fn test_put_settings_applies_and_saves() {
        // Arrange
        let repository = Arc::new(InMemorySettingsRepository::default());
        let mut state = test_app_state();
        state.settings_repository = repository.clone();
        let body = serde_json::json!({
            "narration_enabled": false,
            "music_enabled": true,
            "voice_rate": 1.5,
            "dev_unlock_all": true,
        });

        // Act
        let (status, json) = send(&state, put(&body)).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["narration_enabled"], false);
        assert!(!state.engine().settings().narration_enabled);
        assert!(state.engine().dev_unlock_active());
        let saved = repository.stored().unwrap();
        assert!(saved.dev_unlock_all);
    }

    #[tokio::test]
    async fn test_put_settings_rejects_non_positive_voice_rate() {
        // Arrange
        let state = test_app_state();
        let body = serde_json::json!({
            "narration_enabled": true,
            "music_enabled": true,
            "voice_rate": 0.0,
            "dev_unlock_all": false,
        });

        // Act
        let (status, json) = send(&state, put(&body)).await;

        // Assert
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_put_settings_returns_500_when_save_fails() {
        // Arrange
        let mut state = test_app_state();
        state.settings_repository = Arc::new(FailingRepository);
        let body = serde_json::json!({
            "narration_enabled": true,
            "music_enabled": false,
            "voice_rate": 1.0,
            "dev_unlock_all": false,
        });

        // Act
        let (status, json) = send(&state, put(&body)).await;

        // Assert
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "infrastructure_error");
    }
}
