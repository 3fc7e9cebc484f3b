//! Domain events for the Session context.

use lifeline_core::event::{DomainEvent, EventMetadata};
use lifeline_core::ids::{ClueId, NodeId, ResourceId, ScenarioId};
use lifeline_dialogue::domain::scenario::Outcome;
use serde::{Deserialize, Serialize};

use super::timers::CutsceneStage;

/// Emitted when a scenario is launched and the approach begins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioLaunched {
    /// The scenario launched.
    pub scenario_id: ScenarioId,
    /// Node the conversation will open on.
    pub start_node_id: NodeId,
}

/// Emitted when the player gets close enough to talk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationStarted {
    /// The scenario being played.
    pub scenario_id: ScenarioId,
}

/// Emitted whenever the conversation moves to a node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeEntered {
    /// The node entered.
    pub node_id: NodeId,
    /// Trust on entry.
    pub trust: u8,
}

/// Emitted when the player picks a line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionChosen {
    /// Node the option belongs to.
    pub node_id: NodeId,
    /// The player's line.
    pub choice_text: String,
    /// Whether it was the best line available.
    pub was_optimal: bool,
    /// Trust before the choice.
    pub trust_before: u8,
    /// Trust after the choice.
    pub trust_after: u8,
}

/// Emitted when the player picks a referral resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceSelected {
    /// The resource picked.
    pub resource_id: ResourceId,
}

/// Emitted when an option is submitted on a gated node without the right
/// resource selected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRejected {
    /// The gated node.
    pub node_id: NodeId,
    /// What was selected, if anything.
    pub selected_resource: Option<ResourceId>,
    /// Trust after the penalty.
    pub trust_after: u8,
}

/// Emitted when the scenario's clue is found.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClueDiscovered {
    /// The clue found.
    pub clue_id: ClueId,
}

/// Emitted when trust hits zero and the conversation is forced to the
/// failure ending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustDepleted {
    /// Node the conversation was on.
    pub node_id: NodeId,
}

/// Emitted when the dial pad opens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandoffStarted {
    /// The resource that satisfied the gate.
    pub resource_id: Option<ResourceId>,
}

/// Emitted when a dialed number is not accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeRejected {
    /// What was dialed.
    pub code: String,
}

/// Emitted when an accepted number starts the call cutscene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionStarted {
    /// What was dialed.
    pub code: String,
}

/// Emitted at each cutscene marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CutsceneAdvanced {
    /// The stage reached.
    pub stage: CutsceneStage,
}

/// Emitted when an ending is reached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioEnded {
    /// The terminal node.
    pub node_id: NodeId,
    /// Success or failure.
    pub outcome: Outcome,
    /// Trust at the end.
    pub final_trust: u8,
}

/// Emitted when a success ending is recorded in the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioCompleted {
    /// The scenario completed.
    pub scenario_id: ScenarioId,
    /// `false` when the scenario had already been completed before.
    pub first_completion: bool,
}

/// Why a session went back to the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuReason {
    /// The end screen timed out.
    EndScreenTimeout,
    /// The player left the end screen early.
    Dismissed,
    /// The player quit mid-scenario.
    Abandoned,
    /// Another scenario was launched over this one.
    Replaced,
}

/// Emitted when a session is torn down.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnedToMenu {
    /// The scenario that was running.
    pub scenario_id: ScenarioId,
    /// Why.
    pub reason: MenuReason,
}

/// Event type identifier for [`ScenarioLaunched`].
pub const SCENARIO_LAUNCHED_EVENT_TYPE: &str = "session.scenario_launched";

/// Event type identifier for [`ConversationStarted`].
pub const CONVERSATION_STARTED_EVENT_TYPE: &str = "session.conversation_started";

/// Event type identifier for [`NodeEntered`].
pub const NODE_ENTERED_EVENT_TYPE: &str = "session.node_entered";

/// Event type identifier for [`OptionChosen`].
pub const OPTION_CHOSEN_EVENT_TYPE: &str = "session.option_chosen";

/// Event type identifier for [`ResourceSelected`].
pub const RESOURCE_SELECTED_EVENT_TYPE: &str = "session.resource_selected";

/// Event type identifier for [`ResourceRejected`].
pub const RESOURCE_REJECTED_EVENT_TYPE: &str = "session.resource_rejected";

/// Event type identifier for [`ClueDiscovered`].
pub const CLUE_DISCOVERED_EVENT_TYPE: &str = "session.clue_discovered";

/// Event type identifier for [`TrustDepleted`].
pub const TRUST_DEPLETED_EVENT_TYPE: &str = "session.trust_depleted";

/// Event type identifier for [`HandoffStarted`].
pub const HANDOFF_STARTED_EVENT_TYPE: &str = "session.handoff_started";

/// Event type identifier for [`CodeRejected`].
pub const CODE_REJECTED_EVENT_TYPE: &str = "session.code_rejected";

/// Event type identifier for [`ResolutionStarted`].
pub const RESOLUTION_STARTED_EVENT_TYPE: &str = "session.resolution_started";

/// Event type identifier for [`CutsceneAdvanced`].
pub const CUTSCENE_ADVANCED_EVENT_TYPE: &str = "session.cutscene_advanced";

/// Event type identifier for [`ScenarioEnded`].
pub const SCENARIO_ENDED_EVENT_TYPE: &str = "session.scenario_ended";

/// Event type identifier for [`ScenarioCompleted`].
pub const SCENARIO_COMPLETED_EVENT_TYPE: &str = "session.scenario_completed";

/// Event type identifier for [`ReturnedToMenu`].
pub const RETURNED_TO_MENU_EVENT_TYPE: &str = "session.returned_to_menu";

/// Event payload variants for the Session context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEventKind {
    /// A scenario was launched.
    ScenarioLaunched(ScenarioLaunched),
    /// The conversation started.
    ConversationStarted(ConversationStarted),
    /// A node was entered.
    NodeEntered(NodeEntered),
    /// A line was chosen.
    OptionChosen(OptionChosen),
    /// A resource was picked.
    ResourceSelected(ResourceSelected),
    /// A gated option was refused.
    ResourceRejected(ResourceRejected),
    /// The clue was found.
    ClueDiscovered(ClueDiscovered),
    /// Trust ran out.
    TrustDepleted(TrustDepleted),
    /// The dial pad opened.
    HandoffStarted(HandoffStarted),
    /// A wrong number was dialed.
    CodeRejected(CodeRejected),
    /// The call cutscene started.
    ResolutionStarted(ResolutionStarted),
    /// The cutscene moved on.
    CutsceneAdvanced(CutsceneAdvanced),
    /// An ending was reached.
    ScenarioEnded(ScenarioEnded),
    /// A success was recorded.
    ScenarioCompleted(ScenarioCompleted),
    /// The session was torn down.
    ReturnedToMenu(ReturnedToMenu),
}

/// Domain event envelope for the Session context.
#[derive(Debug, Clone, Serialize)]
pub struct SessionEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: SessionEventKind,
}

impl SessionEventKind {
    /// The event type string for this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ScenarioLaunched(_) => SCENARIO_LAUNCHED_EVENT_TYPE,
            Self::ConversationStarted(_) => CONVERSATION_STARTED_EVENT_TYPE,
            Self::NodeEntered(_) => NODE_ENTERED_EVENT_TYPE,
            Self::OptionChosen(_) => OPTION_CHOSEN_EVENT_TYPE,
            Self::ResourceSelected(_) => RESOURCE_SELECTED_EVENT_TYPE,
            Self::ResourceRejected(_) => RESOURCE_REJECTED_EVENT_TYPE,
            Self::ClueDiscovered(_) => CLUE_DISCOVERED_EVENT_TYPE,
            Self::TrustDepleted(_) => TRUST_DEPLETED_EVENT_TYPE,
            Self::HandoffStarted(_) => HANDOFF_STARTED_EVENT_TYPE,
            Self::CodeRejected(_) => CODE_REJECTED_EVENT_TYPE,
            Self::ResolutionStarted(_) => RESOLUTION_STARTED_EVENT_TYPE,
            Self::CutsceneAdvanced(_) => CUTSCENE_ADVANCED_EVENT_TYPE,
            Self::ScenarioEnded(_) => SCENARIO_ENDED_EVENT_TYPE,
            Self::ScenarioCompleted(_) => SCENARIO_COMPLETED_EVENT_TYPE,
            Self::ReturnedToMenu(_) => RETURNED_TO_MENU_EVENT_TYPE,
        }
    }
}

impl DomainEvent for SessionEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        serde_json::to_value(&self.kind).unwrap_or_default()
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_event_type_and_payload() {
        // Arrange
        let event = SessionEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: SCENARIO_COMPLETED_EVENT_TYPE.to_owned(),
                aggregate_id: Uuid::new_v4(),
                sequence_number: 7,
                correlation_id: Uuid::new_v4(),
                causation_id: Uuid::new_v4(),
                occurred_at: Utc::now(),
            },
            kind: SessionEventKind::ScenarioCompleted(ScenarioCompleted {
                scenario_id: ScenarioId::new("tutorial"),
                first_completion: true,
            }),
        };

        // Act
        let payload = event.to_payload();

        // Assert
        assert_eq!(event.event_type(), "session.scenario_completed");
        assert_eq!(payload["ScenarioCompleted"]["scenario_id"], "tutorial");
        assert_eq!(payload["ScenarioCompleted"]["first_completion"], true);
    }
}
