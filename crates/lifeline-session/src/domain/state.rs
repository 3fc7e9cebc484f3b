//! Per-playthrough session state.

use std::collections::BTreeSet;

use lifeline_core::ids::{ClueId, NodeId, ResourceId, ScenarioId};
use lifeline_dialogue::domain::scenario::{NpcEmotion, ScenePoint, Scenario};
use lifeline_dialogue::domain::trust::Trust;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Distance below which the player is close enough to start talking.
pub const PROXIMITY_THRESHOLD: f32 = 10.0;
/// Cadence of the proximity check while approaching.
pub const PROXIMITY_POLL_MS: u64 = 100;
/// How long a chosen line is "being spoken" before the conversation moves on.
pub const READING_DELAY_MS: u64 = 3_500;
/// How long the end screen stays up before returning to the menu.
pub const END_DWELL_MS: u64 = 10_000;
/// How long a coach message stays visible.
pub const COACH_DISPLAY_MS: u64 = 5_000;
/// How long the clue discovery popup stays visible.
pub const DISCOVERY_DISPLAY_MS: u64 = 4_000;
/// Longest dial-pad entry kept in the buffer.
pub const MAX_DIAL_DIGITS: usize = 16;
/// Numbers the dial pad accepts: the helpline first, then two fallbacks.
pub const ACCEPTED_CODES: [&str; 3] = ["14416", "18008914416", "988"];

/// Top-level phase of a playthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Scenario selection; no session is active.
    Menu,
    /// Walking toward the character.
    Approach,
    /// Talking.
    Dialogue,
    /// Dialing the helpline.
    Handoff,
    /// The call cutscene.
    Resolution,
    /// The ending is on screen.
    End,
}

impl Phase {
    /// Lower-case name used in errors and logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Menu => "menu",
            Self::Approach => "approach",
            Self::Dialogue => "dialogue",
            Self::Handoff => "handoff",
            Self::Resolution => "resolution",
            Self::End => "end",
        }
    }
}

/// One choice the player made, kept for the debrief.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceRecord {
    /// Node the choice was made on.
    pub node_id: NodeId,
    /// What the player said.
    pub choice_text: String,
    /// Whether it matched the best trust impact available on the node.
    pub was_optimal: bool,
    /// Change actually applied to trust, after clamping.
    pub trust_change: i32,
    /// The character's emotion when the choice was made.
    pub npc_emotion: NpcEmotion,
}

/// Mutable state of one playthrough. Owned by the engine; everyone else sees
/// a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionState {
    /// Identifier of this playthrough.
    pub session_id: Uuid,
    /// The scenario being played.
    pub scenario_id: ScenarioId,
    /// The node the conversation is on.
    pub current_node_id: NodeId,
    /// Rapport with the character.
    pub trust: Trust,
    /// Clues found so far.
    pub discovered_clues: BTreeSet<ClueId>,
    /// The referral resource the player has picked.
    pub selected_resource: Option<ResourceId>,
    /// Every choice, oldest first. Append-only.
    pub history: Vec<ChoiceRecord>,
    /// Current phase.
    pub phase: Phase,
    /// Player marker on the scene.
    pub player_position: ScenePoint,
    /// Character marker on the scene.
    pub npc_position: ScenePoint,
}

impl SessionState {
    /// Fresh state for a new playthrough of `scenario`.
    #[must_use]
    pub fn new(session_id: Uuid, scenario: &Scenario) -> Self {
        Self {
            session_id,
            scenario_id: scenario.id.clone(),
            current_node_id: scenario.start_node_id.clone(),
            trust: Trust::INITIAL,
            discovered_clues: BTreeSet::new(),
            selected_resource: None,
            history: Vec::new(),
            phase: Phase::Approach,
            player_position: scenario.staging.player_start,
            npc_position: scenario.staging.npc_start,
        }
    }

    /// Distance between the player and the character.
    #[must_use]
    pub fn separation(&self) -> f32 {
        self.player_position.distance_to(self.npc_position)
    }

    /// Whether the player is close enough to start the conversation.
    #[must_use]
    pub fn within_reach(&self) -> bool {
        self.separation() < PROXIMITY_THRESHOLD
    }
}

/// Whether `code` is one of the accepted dial-pad numbers.
#[must_use]
pub fn is_accepted_code(code: &str) -> bool {
    ACCEPTED_CODES.contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_codes() {
        assert!(is_accepted_code("14416"));
        assert!(is_accepted_code("18008914416"));
        assert!(is_accepted_code("988"));
        assert!(!is_accepted_code("112"));
        assert!(!is_accepted_code(""));
    }

    #[test]
    fn test_phase_names() {
        assert_eq!(Phase::Resolution.as_str(), "resolution");
        assert_eq!(serde_json::to_string(&Phase::End).unwrap(), "\"end\"");
    }
}
