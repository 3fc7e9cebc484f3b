//! Command handlers for the Session context.
//!
//! Each handler runs one command against the engine and drains the events
//! it produced. Persisting anything those events imply is left to the host.

use lifeline_core::command::Command;
use lifeline_core::error::DomainError;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::aggregates::SessionEngine;
use crate::domain::commands::{
    Abandon, AdvanceTime, DialCode, InvestigateClue, LaunchScenario, MoveMarker, SelectOption,
    SelectResource,
};
use crate::domain::events::SessionEvent;

/// Result of a successfully handled command.
#[derive(Debug)]
pub struct SessionCommandResult {
    /// The session running after the command, if any.
    pub session_id: Option<Uuid>,
    /// Events produced by the command and any timers it fired.
    pub events: Vec<SessionEvent>,
    /// For dialing and investigating: whether the attempt succeeded.
    pub accepted: Option<bool>,
}

fn finish(engine: &mut SessionEngine, accepted: Option<bool>) -> SessionCommandResult {
    SessionCommandResult {
        session_id: engine.state().map(|state| state.session_id),
        events: engine.take_events(),
        accepted,
    }
}

fn log_command(command: &dyn Command) {
    debug!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id(),
        "handling session command"
    );
}

/// Handles the `LaunchScenario` command.
///
/// # Errors
///
/// Returns `DomainError::ScenarioNotFound` or `DomainError::ScenarioLocked`.
pub fn handle_launch_scenario(
    command: &LaunchScenario,
    engine: &mut SessionEngine,
) -> Result<SessionCommandResult, DomainError> {
    log_command(command);
    engine.launch_scenario(&command.scenario_id, command.correlation_id)?;
    Ok(finish(engine, None))
}

/// Handles the `MoveMarker` command.
///
/// # Errors
///
/// Returns `DomainError::InvalidPhase` at the menu and
/// `DomainError::Validation` for non-finite steps.
pub fn handle_move_marker(
    command: &MoveMarker,
    engine: &mut SessionEngine,
) -> Result<SessionCommandResult, DomainError> {
    log_command(command);
    engine.move_marker(command.mover, command.dx, command.dy)?;
    Ok(finish(engine, None))
}

/// Handles the `SelectOption` command.
///
/// # Errors
///
/// Returns `DomainError::InvalidPhase`, `DomainError::InputSuppressed` or
/// `DomainError::Validation`.
pub fn handle_select_option(
    command: &SelectOption,
    engine: &mut SessionEngine,
) -> Result<SessionCommandResult, DomainError> {
    log_command(command);
    engine.select_option(command.index, command.correlation_id)?;
    Ok(finish(engine, None))
}

/// Handles the `SelectResource` command.
///
/// # Errors
///
/// Returns `DomainError::InvalidPhase`, `DomainError::InputSuppressed` or
/// `DomainError::Validation`.
pub fn handle_select_resource(
    command: &SelectResource,
    engine: &mut SessionEngine,
) -> Result<SessionCommandResult, DomainError> {
    log_command(command);
    engine.select_resource(command.resource_id.clone(), command.correlation_id)?;
    Ok(finish(engine, None))
}

/// Handles the `InvestigateClue` command.
///
/// # Errors
///
/// Returns `DomainError::InvalidPhase` or `DomainError::InputSuppressed`.
pub fn handle_investigate_clue(
    command: &InvestigateClue,
    engine: &mut SessionEngine,
) -> Result<SessionCommandResult, DomainError> {
    log_command(command);
    let found = engine.investigate_clue(command.correlation_id)?;
    Ok(finish(engine, Some(found)))
}

/// Handles the `DialCode` command.
///
/// # Errors
///
/// Returns `DomainError::InvalidPhase` or `DomainError::Validation`.
pub fn handle_dial_code(
    command: &DialCode,
    engine: &mut SessionEngine,
) -> Result<SessionCommandResult, DomainError> {
    log_command(command);
    let accepted = engine.dial_code(&command.digits, command.correlation_id)?;
    Ok(finish(engine, Some(accepted)))
}

/// Handles the `Abandon` command. Abandoning at the menu is a no-op.
pub fn handle_abandon(command: &Abandon, engine: &mut SessionEngine) -> SessionCommandResult {
    log_command(command);
    engine.abandon(command.correlation_id);
    finish(engine, None)
}

/// Handles the `AdvanceTime` command.
pub fn handle_advance_time(command: &AdvanceTime, engine: &mut SessionEngine) -> SessionCommandResult {
    engine.advance_time(command.elapsed_ms, command.correlation_id);
    let result = finish(engine, None);
    if !result.events.is_empty() {
        info!(
            elapsed_ms = command.elapsed_ms,
            events = result.events.len(),
            "timers fired"
        );
    }
    result
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lifeline_content::application::command_handlers::builtin_catalog;
    use lifeline_core::event::DomainEvent;
    use lifeline_core::ids::ScenarioId;
    use lifeline_core::settings::Settings;
    use lifeline_progression::domain::ledger::ProgressionLedger;
    use lifeline_test_support::{MockRng, RecordingAudio, RecordingNarrator, fixed_clock};

    use super::*;
    use crate::domain::aggregates::EngineCollaborators;
    use crate::domain::commands::Mover;
    use crate::domain::state::{PROXIMITY_POLL_MS, Phase};

    fn engine() -> SessionEngine {
        SessionEngine::new(
            Arc::new(builtin_catalog().unwrap()),
            ProgressionLedger::default(),
            Settings::default(),
            EngineCollaborators {
                clock: Arc::new(fixed_clock()),
                rng: Box::new(MockRng),
                narrator: Arc::new(RecordingNarrator::new()),
                audio: Arc::new(RecordingAudio::new()),
            },
        )
    }

    #[test]
    fn test_handle_launch_scenario_returns_session_and_events() {
        // Arrange
        let mut engine = engine();
        let command = LaunchScenario {
            correlation_id: Uuid::new_v4(),
            scenario_id: ScenarioId::new("tutorial"),
        };

        // Act
        let result = handle_launch_scenario(&command, &mut engine).unwrap();

        // Assert
        assert!(result.session_id.is_some());
        assert_eq!(result.events.len(), 1);
        assert_eq!(result.events[0].event_type(), "session.scenario_launched");
        assert_eq!(result.events[0].metadata().correlation_id, command.correlation_id);
        assert!(engine.uncommitted_events().is_empty());
    }

    #[test]
    fn test_handle_launch_scenario_propagates_lock() {
        let mut engine = engine();
        let command = LaunchScenario {
            correlation_id: Uuid::new_v4(),
            scenario_id: ScenarioId::new("rooftop"),
        };

        let result = handle_launch_scenario(&command, &mut engine);

        assert!(matches!(result, Err(DomainError::ScenarioLocked(_))));
    }

    #[test]
    fn test_handle_advance_time_collects_timer_events() {
        // Arrange
        let mut engine = engine();
        handle_launch_scenario(
            &LaunchScenario {
                correlation_id: Uuid::new_v4(),
                scenario_id: ScenarioId::new("tutorial"),
            },
            &mut engine,
        )
        .unwrap();
        handle_move_marker(
            &MoveMarker {
                correlation_id: Uuid::new_v4(),
                mover: Mover::Player,
                dx: 55.0,
                dy: 0.0,
            },
            &mut engine,
        )
        .unwrap();
        let tick = AdvanceTime {
            correlation_id: Uuid::new_v4(),
            elapsed_ms: PROXIMITY_POLL_MS,
        };

        // Act
        let result = handle_advance_time(&tick, &mut engine);

        // Assert
        assert_eq!(engine.phase(), Phase::Dialogue);
        assert_eq!(
            result
                .events
                .iter()
                .map(|event| event.event_type())
                .collect::<Vec<_>>(),
            vec!["session.conversation_started", "session.node_entered"]
        );
    }

    #[test]
    fn test_handle_abandon_clears_session() {
        let mut engine = engine();
        handle_launch_scenario(
            &LaunchScenario {
                correlation_id: Uuid::new_v4(),
                scenario_id: ScenarioId::new("tutorial"),
            },
            &mut engine,
        )
        .unwrap();

        let result = handle_abandon(
            &Abandon {
                correlation_id: Uuid::new_v4(),
            },
            &mut engine,
        );

        assert!(result.session_id.is_none());
        assert_eq!(result.events.len(), 1);
        assert_eq!(engine.phase(), Phase::Menu);
    }

    #[test]
    fn test_handle_dial_code_outside_handoff_is_invalid() {
        let mut engine = engine();

        let result = handle_dial_code(
            &DialCode {
                correlation_id: Uuid::new_v4(),
                digits: "14416".to_owned(),
            },
            &mut engine,
        );

        assert!(matches!(result, Err(DomainError::InvalidPhase { .. })));
    }
}
