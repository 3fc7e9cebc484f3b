//! Query handlers for the Session context.
//!
//! Read-only views built from the engine for the presentation layer.

use lifeline_content::domain::catalog::ResourceDefinition;
use lifeline_core::error::DomainError;
use lifeline_core::ids::{ClueId, NodeId, ResourceId, ScenarioId};
use lifeline_dialogue::domain::scenario::{
    DialogueNode, NpcEmotion, Outcome, ScenePoint, TextEffect,
};
use lifeline_progression::application::query_handlers::{self, ScenarioSummaryView};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::aggregates::{SessionEngine, TransientUi};
use crate::domain::state::{ChoiceRecord, Phase};

/// What the player currently sees.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    /// Current phase; `menu` when nothing is running.
    pub phase: Phase,
    /// The running playthrough, if any.
    pub session: Option<ActiveSessionView>,
}

/// A running playthrough.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveSessionView {
    /// Session identifier.
    pub session_id: Uuid,
    /// Scenario being played.
    pub scenario_id: ScenarioId,
    /// Scenario title.
    pub title: String,
    /// The character's name.
    pub npc_name: String,
    /// Current trust, 0 to 100.
    pub trust: u8,
    /// Player marker.
    pub player_position: ScenePoint,
    /// Character marker.
    pub npc_position: ScenePoint,
    /// The node the conversation is on.
    pub node: NodeView,
    /// Lines on offer, in presentation order.
    pub options: Vec<OptionView>,
    /// Clues found so far.
    pub discovered_clues: Vec<ClueId>,
    /// The resource the player picked.
    pub selected_resource: Option<ResourceId>,
    /// Every choice so far, oldest first.
    pub history: Vec<ChoiceRecord>,
    /// Whether the resource picker is open.
    pub awaiting_resource: bool,
    /// Whether input is suppressed while a line is spoken.
    pub reading: bool,
    /// Whether looking around would find something.
    pub can_investigate: bool,
    /// Popups, cutscene stage and dial pad.
    pub ui: TransientUi,
}

/// The current node as displayed.
#[derive(Debug, Clone, Serialize)]
pub struct NodeView {
    /// Node identifier.
    pub node_id: NodeId,
    /// The character's emotion.
    pub npc_emotion: NpcEmotion,
    /// What the character says; absent on endings.
    pub npc_text: Option<String>,
    /// Visual effect for `npc_text`.
    pub text_effect: Option<TextEffect>,
    /// Resource the node is gated on.
    pub required_resource: Option<ResourceId>,
    /// Ending details on terminal nodes.
    pub ending: Option<EndingView>,
}

/// An ending.
#[derive(Debug, Clone, Serialize)]
pub struct EndingView {
    /// Success or failure.
    pub result: Outcome,
    /// Closing message.
    pub message: String,
}

/// One line on offer.
#[derive(Debug, Clone, Serialize)]
pub struct OptionView {
    /// Position to pass to `select_option`.
    pub index: usize,
    /// The line.
    pub text: String,
}

/// Post-scenario review of the player's choices.
#[derive(Debug, Clone, Serialize)]
pub struct DebriefView {
    /// Scenario played.
    pub scenario_id: ScenarioId,
    /// Scenario title.
    pub title: String,
    /// How it ended, once it has.
    pub outcome: Option<Outcome>,
    /// Trust now.
    pub final_trust: u8,
    /// Every choice, oldest first.
    pub choices: Vec<ChoiceRecord>,
    /// How many choices were the best available.
    pub optimal_choices: usize,
    /// Sum of the trust changes of every choice.
    pub net_trust_change: i32,
}

fn node_view(node_id: NodeId, node: &DialogueNode) -> NodeView {
    match node {
        DialogueNode::Interior(interior) => NodeView {
            node_id,
            npc_emotion: interior.npc_emotion,
            npc_text: Some(interior.npc_text.clone()),
            text_effect: interior.text_effect,
            required_resource: interior.required_resource.clone(),
            ending: None,
        },
        DialogueNode::Terminal(terminal) => NodeView {
            node_id,
            npc_emotion: terminal.npc_emotion,
            npc_text: None,
            text_effect: None,
            required_resource: None,
            ending: Some(EndingView {
                result: terminal.result,
                message: terminal.message.clone(),
            }),
        },
    }
}

/// Snapshot of the engine for rendering.
#[must_use]
pub fn get_session_view(engine: &SessionEngine) -> SessionView {
    let phase = engine.phase();
    let session = match (engine.state(), engine.scenario(), engine.current_node(), engine.ui()) {
        (Some(state), Some(scenario), Some(node), Some(ui)) => Some(ActiveSessionView {
            session_id: state.session_id,
            scenario_id: state.scenario_id.clone(),
            title: scenario.title.clone(),
            npc_name: scenario.npc_name.clone(),
            trust: state.trust.value(),
            player_position: state.player_position,
            npc_position: state.npc_position,
            node: node_view(state.current_node_id.clone(), &node),
            options: engine
                .offered_options()
                .into_iter()
                .enumerate()
                .map(|(index, option)| OptionView {
                    index,
                    text: option.text,
                })
                .collect(),
            discovered_clues: state.discovered_clues.iter().cloned().collect(),
            selected_resource: state.selected_resource.clone(),
            history: state.history.clone(),
            awaiting_resource: engine.awaiting_resource(),
            reading: engine.is_reading(),
            can_investigate: engine.can_investigate(),
            ui: ui.clone(),
        }),
        _ => None,
    };
    SessionView { phase, session }
}

/// Debrief for the running playthrough.
///
/// # Errors
///
/// Returns `DomainError::InvalidPhase` when no scenario is running.
pub fn get_debrief(engine: &SessionEngine) -> Result<DebriefView, DomainError> {
    let (Some(state), Some(scenario)) = (engine.state(), engine.scenario()) else {
        return Err(DomainError::InvalidPhase {
            expected: Phase::End.as_str(),
            actual: Phase::Menu.as_str(),
        });
    };
    let outcome = if state.phase == Phase::End {
        engine
            .current_node()
            .and_then(|node| node.as_terminal().map(|terminal| terminal.result))
    } else {
        None
    };
    Ok(DebriefView {
        scenario_id: state.scenario_id.clone(),
        title: scenario.title.clone(),
        outcome,
        final_trust: state.trust.value(),
        optimal_choices: state.history.iter().filter(|record| record.was_optimal).count(),
        net_trust_change: state.history.iter().map(|record| record.trust_change).sum(),
        choices: state.history.clone(),
    })
}

/// Scenario list with lock and completion state as the engine sees it.
#[must_use]
pub fn list_scenarios(engine: &SessionEngine) -> Vec<ScenarioSummaryView> {
    query_handlers::list_scenarios(engine.catalog(), engine.ledger(), engine.dev_unlock_active())
}

/// The referral resources on offer.
#[must_use]
pub fn list_resources(engine: &SessionEngine) -> Vec<ResourceDefinition> {
    engine.catalog().resources().to_vec()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lifeline_content::application::command_handlers::builtin_catalog;
    use lifeline_core::settings::Settings;
    use lifeline_progression::domain::ledger::ProgressionLedger;
    use lifeline_test_support::{MockRng, RecordingAudio, RecordingNarrator, fixed_clock};

    use super::*;
    use crate::domain::aggregates::EngineCollaborators;
    use crate::domain::commands::Mover;
    use crate::domain::state::PROXIMITY_POLL_MS;

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
    fn test_session_view_at_menu_has_no_session() {
        let engine = engine();

        let view = get_session_view(&engine);

        assert_eq!(view.phase, Phase::Menu);
        assert!(view.session.is_none());
    }

    #[test]
    fn test_session_view_during_dialogue_lists_offered_options() {
        // Arrange
        let mut engine = engine();
        engine
            .launch_scenario(&ScenarioId::new("tutorial"), Uuid::new_v4())
            .unwrap();
        engine.move_marker(Mover::Player, 55.0, 0.0).unwrap();
        engine.advance_time(PROXIMITY_POLL_MS, Uuid::new_v4());

        // Act
        let view = get_session_view(&engine);

        // Assert
        assert_eq!(view.phase, Phase::Dialogue);
        let session = view.session.unwrap();
        assert_eq!(session.npc_name, "Maya");
        assert_eq!(session.trust, 25);
        assert!(session.node.npc_text.is_some());
        assert!(!session.options.is_empty());
        assert!(
            session
                .options
                .iter()
                .enumerate()
                .all(|(position, option)| option.index == position)
        );
        assert!(session.can_investigate);
        assert!(!session.reading);
    }

    #[test]
    fn test_debrief_requires_a_session() {
        let engine = engine();

        let result = get_debrief(&engine);

        assert!(matches!(result, Err(DomainError::InvalidPhase { .. })));
    }

    #[test]
    fn test_debrief_counts_optimal_choices() {
        // Arrange
        let mut engine = engine();
        engine
            .launch_scenario(&ScenarioId::new("tutorial"), Uuid::new_v4())
            .unwrap();
        engine.move_marker(Mover::Player, 55.0, 0.0).unwrap();
        engine.advance_time(PROXIMITY_POLL_MS, Uuid::new_v4());
        engine.select_option(0, Uuid::new_v4()).unwrap();

        // Act
        let debrief = get_debrief(&engine).unwrap();

        // Assert
        assert_eq!(debrief.choices.len(), 1);
        assert!(debrief.outcome.is_none());
        assert_eq!(
            debrief.optimal_choices,
            usize::from(debrief.choices[0].was_optimal)
        );
        assert_eq!(debrief.net_trust_change, debrief.choices[0].trust_change);
    }

    #[test]
    fn test_list_scenarios_follows_dev_override() {
        let mut engine = engine();
        engine.set_dev_override(true);

        let views = list_scenarios(&engine);

        assert!(views.iter().all(|view| !view.locked));
    }

    #[test]
    fn test_list_resources_returns_catalog_resources() {
        let engine = engine();

        let resources = list_resources(&engine);

        assert_eq!(resources.len(), 5);
        assert_eq!(resources[0].id, "Crisis Hotline");
    }
}
