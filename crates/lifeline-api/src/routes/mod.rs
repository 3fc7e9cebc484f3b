//! Route modules organized by concern.

use axum::Router;

use crate::state::AppState;

pub mod health;
pub mod scenarios;
pub mod session;
pub mod settings;

/// Returns the full API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(scenarios::router())
        .merge(session::router())
        .merge(settings::router())
}

#[cfg(test)]
pub(crate) fn test_app_state() -> AppState {
    test_app_state_with(std::sync::Arc::new(
        lifeline_test_support::InMemoryProgressionRepository::default(),
    ))
}

#[cfg(test)]
pub(crate) fn test_app_state_with(
    progression_repository: std::sync::Arc<dyn lifeline_core::repository::ProgressionRepository>,
) -> AppState {
    use std::sync::Arc;

    use lifeline_content::application::command_handlers::builtin_catalog;
    use lifeline_core::settings::Settings;
    use lifeline_progression::domain::ledger::ProgressionLedger;
    use lifeline_session::domain::aggregates::{EngineCollaborators, SessionEngine};
    use lifeline_test_support::{InMemorySettingsRepository, MockRng, fixed_clock};

    use crate::presentation::CueOutbox;

    let outbox = CueOutbox::new();
    let engine = SessionEngine::new(
        Arc::new(builtin_catalog().unwrap()),
        ProgressionLedger::default(),
        Settings::default(),
        EngineCollaborators {
            clock: Arc::new(fixed_clock()),
            rng: Box::new(MockRng),
            narrator: Arc::new(outbox.clone()),
            audio: Arc::new(outbox.clone()),
        },
    );
    AppState::new(
        engine,
        outbox,
        progression_repository,
        Arc::new(InMemorySettingsRepository::default()),
    )
}

/// Plays the tutorial on the engine directly, through its success ending
/// and back to the menu.
#[cfg(test)]
pub(crate) fn play_tutorial(state: &AppState) {
    use lifeline_core::ids::{ResourceId, ScenarioId};
    use lifeline_session::domain::aggregates::SessionEngine;
    use lifeline_session::domain::state::{
        END_DWELL_MS, PROXIMITY_POLL_MS, Phase, READING_DELAY_MS,
    };
    use uuid::Uuid;

    fn choose(engine: &mut SessionEngine, prefix: &str) {
        let index = engine
            .offered_options()
            .iter()
            .position(|option| option.text.starts_with(prefix))
            .unwrap();
        engine.select_option(index, Uuid::new_v4()).unwrap();
        engine.advance_time(READING_DELAY_MS, Uuid::new_v4());
    }

    let mut engine = state.engine();
    engine
        .launch_scenario(&ScenarioId::new("tutorial"), Uuid::new_v4())
        .unwrap();
    engine.move_player(55.0, 0.0).unwrap();
    engine.advance_time(PROXIMITY_POLL_MS, Uuid::new_v4());
    choose(&mut engine, "Mind if I sit");
    choose(&mut engine, "That sounds exhausting");
    engine
        .select_resource(ResourceId::new("Crisis Hotline"), Uuid::new_v4())
        .unwrap();
    choose(&mut engine, "There's a helpline");
    assert!(engine.dial_code("988", Uuid::new_v4()).unwrap());
    engine.advance_time(11_000, Uuid::new_v4());
    assert!(engine.ledger().is_completed(&ScenarioId::new("tutorial")));
    engine.advance_time(END_DWELL_MS, Uuid::new_v4());
    assert_eq!(engine.phase(), Phase::Menu);
}
