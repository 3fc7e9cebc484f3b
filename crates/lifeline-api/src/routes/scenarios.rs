//! Routes for the scenario menu and resource directory.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use lifeline_content::domain::catalog::ResourceDefinition;
use lifeline_progression::application::query_handlers::ScenarioSummaryView;
use lifeline_session::application::query_handlers;
use tracing::instrument;

use crate::state::AppState;

/// GET /api/v1/scenarios
#[instrument(skip(state))]
async fn list_scenarios(State(state): State<AppState>) -> Json<Vec<ScenarioSummaryView>> {
    Json(query_handlers::list_scenarios(&state.engine()))
}

/// GET /api/v1/resources
#[instrument(skip(state))]
async fn list_resources(State(state): State<AppState>) -> Json<Vec<ResourceDefinition>> {
    Json(query_handlers::list_resources(&state.engine()))
}

/// Returns the router for the scenario menu.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/scenarios", get(list_scenarios))
        .route("/api/v1/resources", get(list_resources))
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::routes::test_app_state;

    async fn get(uri: &str) -> (StatusCode, Value) {
        let app = router().with_state(test_app_state());
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body_bytes).unwrap())
    }

    #[tokio::test]
    async fn test_list_scenarios_marks_tutorial_unlocked() {
        // Act
        let (status, json) = get("/api/v1/scenarios").await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        let scenarios = json.as_array().unwrap();
        assert!(!scenarios.is_empty());
        let tutorial = scenarios
            .iter()
            .find(|summary| summary["scenario_id"] == "tutorial")
            .unwrap();
        assert_eq!(tutorial["locked"], false);
        assert_eq!(tutorial["completed"], false);
    }

    #[tokio::test]
    async fn test_list_resources_returns_directory() {
        // Act
        let (status, json) = get("/api/v1/resources").await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        let resources = json.as_array().unwrap();
        assert!(
            resources
                .iter()
                .any(|resource| resource["id"] == "Crisis Hotline")
        );
    }
}
