//! Routes for the active session: commands, the snapshot, the debrief and the
//! presentation cue feed.

use axum::extract::State;
use axum::{
    Json, Router,
    routing::{get, post},
};
use lifeline_core::ids::{ResourceId, ScenarioId};
use lifeline_session::application::command_handlers::{self, SessionCommandResult};
use lifeline_session::application::query_handlers::{self, DebriefView, SessionView};
use lifeline_session::domain::commands::{self, Mover};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::presentation::PresentationCue;
use crate::state::AppState;

/// Request body for POST /api/v1/session/launch.
#[derive(Debug, Deserialize)]
pub struct LaunchRequest {
    /// The scenario to launch.
    pub scenario_id: ScenarioId,
}

/// Request body for the marker move endpoints.
#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    /// Horizontal step.
    pub dx: f32,
    /// Vertical step.
    pub dy: f32,
}

/// Request body for POST /api/v1/session/select-option.
#[derive(Debug, Deserialize)]
pub struct SelectOptionRequest {
    /// Index into the offered options.
    pub index: usize,
}

/// Request body for POST /api/v1/session/select-resource.
#[derive(Debug, Deserialize)]
pub struct SelectResourceRequest {
    /// The picked resource.
    pub resource_id: ResourceId,
}

/// Request body for POST /api/v1/session/dial.
#[derive(Debug, Deserialize)]
pub struct DialRequest {
    /// The digits entered on the dial pad.
    pub digits: String,
}

/// Response body returned after a command is successfully handled.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    /// IDs of the domain events produced.
    pub event_ids: Vec<Uuid>,
    /// Types of the domain events produced, in order.
    pub event_types: Vec<&'static str>,
    /// Outcome of an investigation or a dial attempt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted: Option<bool>,
    /// The session after the command.
    pub session: SessionView,
}

/// Saves any new completions and builds the response. A failed save is
/// logged and retried after the next command or tick.
async fn respond(state: &AppState, result: SessionCommandResult) -> Json<CommandResponse> {
    if let Err(error) = state.persist_progress().await {
        warn!(%error, "failed to save progression after command");
    }
    let session = query_handlers::get_session_view(&state.engine());
    Json(CommandResponse {
        event_ids: result.events.iter().map(|e| e.metadata.event_id).collect(),
        event_types: result.events.iter().map(|e| e.kind.event_type()).collect(),
        accepted: result.accepted,
        session,
    })
}

/// GET /api/v1/session
async fn get_session(State(state): State<AppState>) -> Json<SessionView> {
    Json(query_handlers::get_session_view(&state.engine()))
}

/// GET /api/v1/session/debrief
async fn get_debrief(State(state): State<AppState>) -> Result<Json<DebriefView>, ApiError> {
    let debrief = query_handlers::get_debrief(&state.engine())?;
    Ok(Json(debrief))
}

/// GET /api/v1/session/cues
async fn drain_cues(State(state): State<AppState>) -> Json<Vec<PresentationCue>> {
    Json(state.outbox.drain())
}

/// POST /api/v1/session/launch
#[instrument(skip(state, request), fields(scenario_id = %request.scenario_id))]
async fn launch_scenario(
    State(state): State<AppState>,
    Json(request): Json<LaunchRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::LaunchScenario {
        correlation_id: Uuid::new_v4(),
        scenario_id: request.scenario_id,
    };

    info!(correlation_id = %command.correlation_id, "handling launch_scenario command");

    let result = command_handlers::handle_launch_scenario(&command, &mut state.engine())?;
    Ok(respond(&state, result).await)
}

async fn move_marker(
    state: AppState,
    mover: Mover,
    request: MoveRequest,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::MoveMarker {
        correlation_id: Uuid::new_v4(),
        mover,
        dx: request.dx,
        dy: request.dy,
    };

    info!(correlation_id = %command.correlation_id, ?mover, "handling move_marker command");

    let result = command_handlers::handle_move_marker(&command, &mut state.engine())?;
    Ok(respond(&state, result).await)
}

/// POST /api/v1/session/move
#[instrument(skip(state, request), fields(dx = request.dx, dy = request.dy))]
async fn move_player(
    State(state): State<AppState>,
    Json(request): Json<MoveRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    move_marker(state, Mover::Player, request).await
}

/// POST /api/v1/session/move-npc
#[instrument(skip(state, request), fields(dx = request.dx, dy = request.dy))]
async fn move_npc(
    State(state): State<AppState>,
    Json(request): Json<MoveRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    move_marker(state, Mover::Npc, request).await
}

/// POST /api/v1/session/select-option
#[instrument(skip(state, request), fields(index = request.index))]
async fn select_option(
    State(state): State<AppState>,
    Json(request): Json<SelectOptionRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::SelectOption {
        correlation_id: Uuid::new_v4(),
        index: request.index,
    };

    info!(correlation_id = %command.correlation_id, "handling select_option command");

    let result = command_handlers::handle_select_option(&command, &mut state.engine())?;
    Ok(respond(&state, result).await)
}

/// POST /api/v1/session/select-resource
#[instrument(skip(state, request), fields(resource_id = %request.resource_id))]
async fn select_resource(
    State(state): State<AppState>,
    Json(request): Json<SelectResourceRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::SelectResource {
        correlation_id: Uuid::new_v4(),
        resource_id: request.resource_id,
    };

    info!(correlation_id = %command.correlation_id, "handling select_resource command");

    let result = command_handlers::handle_select_resource(&command, &mut state.engine())?;
    Ok(respond(&state, result).await)
}

/// POST /api/v1/session/investigate
#[instrument(skip(state))]
async fn investigate_clue(
    State(state): State<AppState>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::InvestigateClue {
        correlation_id: Uuid::new_v4(),
    };

    info!(correlation_id = %command.correlation_id, "handling investigate_clue command");

    let result = command_handlers::handle_investigate_clue(&command, &mut state.engine())?;
    Ok(respond(&state, result).await)
}

/// POST /api/v1/session/dial
#[instrument(skip(state, request))]
async fn dial_code(
    State(state): State<AppState>,
    Json(request): Json<DialRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::DialCode {
        correlation_id: Uuid::new_v4(),
        digits: request.digits,
    };

    info!(correlation_id = %command.correlation_id, "handling dial_code command");

    let result = command_handlers::handle_dial_code(&command, &mut state.engine())?;
    Ok(respond(&state, result).await)
}

/// POST /api/v1/session/abandon
#[instrument(skip(state))]
async fn abandon(State(state): State<AppState>) -> Json<CommandResponse> {
    let command = commands::Abandon {
        correlation_id: Uuid::new_v4(),
    };

    info!(correlation_id = %command.correlation_id, "handling abandon command");

    let result = command_handlers::handle_abandon(&command, &mut state.engine());
    respond(&state, result).await
}

/// Returns the router for the active session.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/session", get(get_session))
        .route("/api/v1/session/debrief", get(get_debrief))
        .route("/api/v1/session/cues", get(drain_cues))
        .route("/api/v1/session/launch", post(launch_scenario))
        .route("/api/v1/session/move", post(move_player))
        .route("/api/v1/session/move-npc", post(move_npc))
        .route("/api/v1/session/select-option", post(select_option))
        .route("/api/v1/session/select-resource", post(select_resource))
        .route("/api/v1/session/investigate", post(investigate_clue))
        .route("/api/v1/session/dial", post(dial_code))
        .route("/api/v1/session/abandon", post(abandon))
}
