//! Commands for the Session context.

use lifeline_core::command::Command;
use lifeline_core::ids::{ResourceId, ScenarioId};
use uuid::Uuid;

/// Command to start a scenario.
#[derive(Debug, Clone)]
pub struct LaunchScenario {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The scenario to play.
    pub scenario_id: ScenarioId,
}

impl Command for LaunchScenario {
    fn command_type(&self) -> &'static str {
        "session.launch_scenario"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Which marker a move command applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mover {
    /// The player.
    Player,
    /// The character.
    Npc,
}

/// Command to move a marker on the scene.
#[derive(Debug, Clone)]
pub struct MoveMarker {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Which marker.
    pub mover: Mover,
    /// Horizontal step.
    pub dx: f32,
    /// Vertical step.
    pub dy: f32,
}

impl Command for MoveMarker {
    fn command_type(&self) -> &'static str {
        match self.mover {
            Mover::Player => "session.move_player",
            Mover::Npc => "session.move_npc",
        }
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to choose one of the offered lines.
#[derive(Debug, Clone)]
pub struct SelectOption {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Position in the offered list.
    pub index: usize,
}

impl Command for SelectOption {
    fn command_type(&self) -> &'static str {
        "session.select_option"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to pick a referral resource.
#[derive(Debug, Clone)]
pub struct SelectResource {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The resource picked.
    pub resource_id: ResourceId,
}

impl Command for SelectResource {
    fn command_type(&self) -> &'static str {
        "session.select_resource"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to look around for the scenario's clue.
#[derive(Debug, Clone)]
pub struct InvestigateClue {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for InvestigateClue {
    fn command_type(&self) -> &'static str {
        "session.investigate_clue"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to dial a number on the hand-off pad.
#[derive(Debug, Clone)]
pub struct DialCode {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Digits to dial.
    pub digits: String,
}

impl Command for DialCode {
    fn command_type(&self) -> &'static str {
        "session.dial_code"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to leave the current session.
#[derive(Debug, Clone)]
pub struct Abandon {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for Abandon {
    fn command_type(&self) -> &'static str {
        "session.abandon"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to move the virtual clock forward.
#[derive(Debug, Clone)]
pub struct AdvanceTime {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Milliseconds elapsed.
    pub elapsed_ms: u64,
}

impl Command for AdvanceTime {
    fn command_type(&self) -> &'static str {
        "session.advance_time"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
