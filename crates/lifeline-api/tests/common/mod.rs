//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use lifeline_content::application::command_handlers::builtin_catalog;
use lifeline_progression::application::command_handlers::load_progression;
use lifeline_session::domain::aggregates::{EngineCollaborators, SessionEngine};
use lifeline_test_support::{MockRng, fixed_clock};
use tempfile::TempDir;
use tower::ServiceExt;

use lifeline_api::persistence::{self, FileStore};
use lifeline_api::presentation::CueOutbox;
use lifeline_api::routes;
use lifeline_api::state::AppState;

/// A running app backed by a temporary save directory.
pub struct TestApp {
    /// Shared state, also reachable by the ticker helpers.
    pub state: AppState,
    /// Keeps the save directory alive for the test's duration.
    pub save_dir: TempDir,
}

impl TestApp {
    /// The full router over this app's state, as `main.rs` builds it.
    pub fn router(&self) -> Router {
        routes::router().with_state(self.state.clone())
    }

    /// A store reading the same directory the app saves into.
    pub fn store(&self) -> FileStore {
        FileStore::new(self.save_dir.path())
    }
}

/// Builds the app over a fresh, empty save directory.
pub async fn build_test_app() -> TestApp {
    build_test_app_in(TempDir::new().unwrap()).await
}

/// Builds the app over `save_dir`, loading whatever progress and settings it
/// already holds.
pub async fn build_test_app_in(save_dir: TempDir) -> TestApp {
    let store = Arc::new(FileStore::new(save_dir.path()));
    let state = build_state(store).await;
    TestApp { state, save_dir }
}

async fn build_state(store: Arc<FileStore>) -> AppState {
    let ledger = load_progression(store.as_ref()).await;
    let settings = persistence::load_settings(store.as_ref()).await;
    let outbox = CueOutbox::new();
    let engine = SessionEngine::new(
        Arc::new(builtin_catalog().unwrap()),
        ledger,
        settings,
        EngineCollaborators {
            clock: Arc::new(fixed_clock()),
            rng: Box::new(MockRng),
            narrator: Arc::new(outbox.clone()),
            audio: Arc::new(outbox.clone()),
        },
    );
    AppState::new(engine, outbox, store.clone(), store)
}

/// Send a request with a JSON body and return the response.
pub async fn send_json(
    app: Router,
    method: &str,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send_json(app, "POST", uri, body).await
}

/// Send a POST request without a body and return the response.
pub async fn post_empty(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Picks the offered option whose text starts with `prefix`.
pub async fn choose(app: &TestApp, prefix: &str) -> (StatusCode, serde_json::Value) {
    let (_, view) = get_json(app.router(), "/api/v1/session").await;
    let index = view["session"]["options"]
        .as_array()
        .unwrap()
        .iter()
        .find(|option| option["text"].as_str().unwrap().starts_with(prefix))
        .unwrap_or_else(|| panic!("no offered option starts with '{prefix}'"))["index"]
        .clone();
    post_json(
        app.router(),
        "/api/v1/session/select-option",
        &serde_json::json!({ "index": index }),
    )
    .await
}
