//! Integration tests for a full session over HTTP.

mod common;

use axum::http::StatusCode;
use lifeline_api::driver;
use lifeline_core::ids::ScenarioId;
use lifeline_core::repository::ProgressionRepository;
use serde_json::json;

use common::TestApp;

async fn launch_and_approach(app: &TestApp) {
    let (status, json) = common::post_json(
        app.router(),
        "/api/v1/session/launch",
        &json!({ "scenario_id": "tutorial" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["session"]["phase"], "approach");

    let (status, _) = common::post_json(
        app.router(),
        "/api/v1/session/move",
        &json!({ "dx": 55.0, "dy": 0.0 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    driver::tick(&app.state, 100).await;
}

async fn session_phase(app: &TestApp) -> String {
    let (_, view) = common::get_json(app.router(), "/api/v1/session").await;
    view["phase"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn test_tutorial_success_is_saved_and_unlocks_next_scenario() {
    // Arrange
    let app = common::build_test_app().await;
    launch_and_approach(&app).await;
    assert_eq!(session_phase(&app).await, "dialogue");

    // Act: listen, validate, pick the hotline, call.
    let (status, _) = common::choose(&app, "Mind if I sit").await;
    assert_eq!(status, StatusCode::OK);
    driver::tick(&app.state, 3500).await;

    let (status, _) = common::choose(&app, "That sounds exhausting").await;
    assert_eq!(status, StatusCode::OK);
    driver::tick(&app.state, 3500).await;

    let (_, view) = common::get_json(app.router(), "/api/v1/session").await;
    assert_eq!(view["session"]["node"]["node_id"], "referral");
    assert_eq!(view["session"]["awaiting_resource"], true);

    let (status, _) = common::post_json(
        app.router(),
        "/api/v1/session/select-resource",
        &json!({ "resource_id": "Crisis Hotline" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = common::choose(&app, "There's a helpline").await;
    assert_eq!(status, StatusCode::OK);
    driver::tick(&app.state, 3500).await;
    assert_eq!(session_phase(&app).await, "handoff");

    let (status, json) = common::post_json(
        app.router(),
        "/api/v1/session/dial",
        &json!({ "digits": "988" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["accepted"], true);
    assert_eq!(json["session"]["phase"], "resolution");

    driver::tick(&app.state, 11_000).await;

    // Assert
    assert_eq!(session_phase(&app).await, "end");

    let (status, debrief) = common::get_json(app.router(), "/api/v1/session/debrief").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(debrief["outcome"], "success");
    assert_eq!(debrief["choices"].as_array().unwrap().len(), 3);

    let saved = app.store().load_progression().await.unwrap();
    assert!(saved.contains(&ScenarioId::new("tutorial")));

    let (_, scenarios) = common::get_json(app.router(), "/api/v1/scenarios").await;
    let exam = scenarios
        .as_array()
        .unwrap()
        .iter()
        .find(|summary| summary["scenario_id"] == "exam_pressure")
        .unwrap();
    assert_eq!(exam["locked"], false);
}

#[tokio::test]
async fn test_wrong_code_keeps_the_dial_pad_open() {
    // Arrange
    let app = common::build_test_app().await;
    launch_and_approach(&app).await;
    common::choose(&app, "Mind if I sit").await;
    driver::tick(&app.state, 3500).await;
    common::choose(&app, "That sounds exhausting").await;
    driver::tick(&app.state, 3500).await;
    common::post_json(
        app.router(),
        "/api/v1/session/select-resource",
        &json!({ "resource_id": "Crisis Hotline" }),
    )
    .await;
    common::choose(&app, "There's a helpline").await;
    driver::tick(&app.state, 3500).await;

    // Act
    let (status, json) = common::post_json(
        app.router(),
        "/api/v1/session/dial",
        &json!({ "digits": "12345" }),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["accepted"], false);
    assert_eq!(json["session"]["phase"], "handoff");
    assert_eq!(json["event_types"][0], "session.code_rejected");
}

#[tokio::test]
async fn test_end_screen_returns_to_menu_after_dwell() {
    // Arrange: walk straight into the failure ending.
    let app = common::build_test_app().await;
    launch_and_approach(&app).await;
    common::choose(&app, "Cool. Nice weather").await;
    driver::tick(&app.state, 3500).await;
    common::choose(&app, "Well, enjoy it").await;
    driver::tick(&app.state, 3500).await;
    assert_eq!(session_phase(&app).await, "end");

    // Act
    driver::tick(&app.state, 10_000).await;

    // Assert
    assert_eq!(session_phase(&app).await, "menu");
    let saved = app.store().load_progression().await.unwrap();
    assert!(saved.is_empty());
}

#[tokio::test]
async fn test_locked_scenario_is_refused() {
    // Arrange
    let app = common::build_test_app().await;

    // Act
    let (status, json) = common::post_json(
        app.router(),
        "/api/v1/session/launch",
        &json!({ "scenario_id": "rooftop" }),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"], "scenario_locked");
}
