//! Scenario definitions.
//!
//! A scenario is loaded once from the content asset and never mutated.

use std::collections::BTreeMap;

use lifeline_core::ids::{ClueId, NodeId, ResourceId, ScenarioId};
use lifeline_core::presentation::{AmbientTheme, VoiceProfile};
use serde::{Deserialize, Serialize};

/// One complete branching-dialogue encounter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario identifier.
    pub id: ScenarioId,
    /// Title shown on the selection screen.
    pub title: String,
    /// One-line description for the selection screen.
    #[serde(default)]
    pub summary: String,
    /// Display name of the distressed character.
    pub npc_name: String,
    /// Voice the narrator uses for the character's lines.
    pub npc_voice: VoiceProfile,
    /// Background soundscape.
    #[serde(default = "default_ambient")]
    pub ambient: AmbientTheme,
    /// Node the conversation opens on.
    pub start_node_id: NodeId,
    /// Every authored node, keyed by id.
    pub nodes: BTreeMap<NodeId, DialogueNode>,
    /// The scenario's single discoverable clue, if any.
    #[serde(default)]
    pub clue: Option<ClueDefinition>,
    /// Explicit prerequisites. `None` means "the previous scenario in
    /// catalog order".
    #[serde(default)]
    pub prerequisites: Option<Vec<ScenarioId>>,
    /// Where the player and the character start on the scene.
    #[serde(default)]
    pub staging: Staging,
    /// Line the character says to the counselor once the call connects.
    #[serde(default = "default_handover_line")]
    pub handover_line: String,
}

fn default_ambient() -> AmbientTheme {
    AmbientTheme::Calm
}

fn default_handover_line() -> String {
    "Hi... my friend here helped me call. I think I need to talk to someone.".to_owned()
}

/// A discoverable piece of scenario context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClueDefinition {
    /// Clue identifier referenced by `DialogueOption::required_clue`.
    pub id: ClueId,
    /// Text shown in the discovery popup.
    pub description: String,
}

/// A position on the 0..100 scene grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenePoint {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl ScenePoint {
    /// Upper bound of the scene grid on both axes.
    pub const EXTENT: f32 = 100.0;

    /// Creates a point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance between two points.
    #[must_use]
    pub fn distance_to(self, other: Self) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Moves by the given delta, staying inside the scene grid.
    #[must_use]
    pub fn translated(self, dx: f32, dy: f32) -> Self {
        Self {
            x: (self.x + dx).clamp(0.0, Self::EXTENT),
            y: (self.y + dy).clamp(0.0, Self::EXTENT),
        }
    }
}

/// Start positions for a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Staging {
    /// Player start position.
    pub player_start: ScenePoint,
    /// Character start position.
    pub npc_start: ScenePoint,
}

impl Default for Staging {
    fn default() -> Self {
        Self {
            player_start: ScenePoint::new(10.0, 50.0),
            npc_start: ScenePoint::new(80.0, 50.0),
        }
    }
}

/// Emotional state shown on the character's sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpcEmotion {
    /// Sad or withdrawn.
    Sad,
    /// Visibly distressed.
    Distressed,
    /// Nervous, on edge.
    Anxious,
    /// Defensive or hostile.
    Angry,
    /// Unsure whether to open up.
    Hesitant,
    /// Beginning to trust.
    Hopeful,
    /// Relieved after reaching help.
    Relief,
    /// No strong emotion, also used for unknown authored values.
    #[default]
    #[serde(other)]
    Neutral,
}

/// Visual treatment for a line of NPC text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEffect {
    /// Trembling text.
    Shake,
    /// Small, faded text.
    Whisper,
    /// Distorted text.
    Glitch,
    /// Text that fades in slowly.
    Fade,
}

/// How a scenario ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The character was routed to help.
    Success,
    /// The character left.
    Failure,
}

/// A line the player may say.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueOption {
    /// The player's line.
    pub text: String,
    /// Node the conversation moves to.
    pub next: NodeId,
    /// Signed change applied to trust when chosen.
    #[serde(default)]
    pub trust_impact: i32,
    /// Clue that must be discovered before this option is offered.
    #[serde(default)]
    pub required_clue: Option<ClueId>,
    /// What the player character is thinking, shown alongside the choice.
    #[serde(default)]
    pub inner_thought: Option<String>,
}

/// A conversational beat with options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteriorNode {
    /// What the character says.
    pub npc_text: String,
    /// The character's emotion on this beat.
    #[serde(default)]
    pub npc_emotion: NpcEmotion,
    /// Resource that must be selected before the conversation can advance.
    #[serde(default)]
    pub required_resource: Option<ResourceId>,
    /// The player's options.
    pub options: Vec<DialogueOption>,
    /// Optional visual effect for `npc_text`.
    #[serde(default)]
    pub text_effect: Option<TextEffect>,
}

/// An ending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalNode {
    /// Whether the ending is a success or a failure.
    pub result: Outcome,
    /// Closing message.
    pub message: String,
    /// The character's emotion at the end.
    #[serde(default)]
    pub npc_emotion: NpcEmotion,
}

/// A node in the dialogue graph. Terminal nodes carry `result` and `message`;
/// everything else is an interior node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DialogueNode {
    /// An ending.
    Terminal(TerminalNode),
    /// A beat with options.
    Interior(InteriorNode),
}

impl DialogueNode {
    /// Returns `true` for endings.
    #[must_use]
    pub fn is_end(&self) -> bool {
        matches!(self, Self::Terminal(_))
    }

    /// The character's emotion on this node.
    #[must_use]
    pub fn npc_emotion(&self) -> NpcEmotion {
        match self {
            Self::Terminal(node) => node.npc_emotion,
            Self::Interior(node) => node.npc_emotion,
        }
    }

    /// Returns the interior node, if this is one.
    #[must_use]
    pub fn as_interior(&self) -> Option<&InteriorNode> {
        match self {
            Self::Interior(node) => Some(node),
            Self::Terminal(_) => None,
        }
    }

    /// Returns the terminal node, if this is one.
    #[must_use]
    pub fn as_terminal(&self) -> Option<&TerminalNode> {
        match self {
            Self::Terminal(node) => Some(node),
            Self::Interior(_) => None,
        }
    }
}
