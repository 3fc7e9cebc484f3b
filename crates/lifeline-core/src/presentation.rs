//! Presentation collaborators.
//!
//! The engine never renders, speaks or plays anything itself. It calls these
//! fire-and-forget traits and the host decides what they do (browser speech
//! synthesis, a cue outbox, a log line).

use serde::{Deserialize, Serialize};

/// Voice parameters handed to the narrator for a line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceProfile {
    /// Voice name hint for the speech backend.
    pub voice: String,
    /// Pitch multiplier, 1.0 being neutral.
    #[serde(default = "neutral")]
    pub pitch: f32,
    /// Rate multiplier, 1.0 being neutral.
    #[serde(default = "neutral")]
    pub rate: f32,
}

fn neutral() -> f32 {
    1.0
}

impl VoiceProfile {
    /// Creates a profile with the given voice hint and pitch/rate.
    #[must_use]
    pub fn new(voice: impl Into<String>, pitch: f32, rate: f32) -> Self {
        Self {
            voice: voice.into(),
            pitch,
            rate,
        }
    }

    /// Voice used for the player's own lines.
    #[must_use]
    pub fn player() -> Self {
        Self::new("player", 1.0, 1.0)
    }

    /// Voice used for the helpline counselor during the resolution cutscene.
    #[must_use]
    pub fn counselor() -> Self {
        Self::new("counselor", 1.1, 0.95)
    }

    /// Voice used for system narration (endings, discoveries).
    #[must_use]
    pub fn narrator() -> Self {
        Self::new("narrator", 1.0, 0.9)
    }
}

/// Short sound effects the engine asks the audio service to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CueKind {
    /// An option was chosen.
    Select,
    /// A choice raised trust.
    Positive,
    /// A choice lowered trust.
    Negative,
    /// A referral resource was picked.
    ResourceSelected,
    /// An option was submitted without the required resource.
    ResourceRejected,
    /// A clue was found.
    ClueFound,
    /// A dial-pad key was pressed.
    KeyPress,
    /// A dialed code was rejected.
    WrongCode,
    /// The outgoing call is ringing.
    Ringing,
    /// The call was answered.
    Connected,
    /// The scenario ended well.
    Success,
    /// The scenario ended badly.
    Failure,
}

/// Background soundscape for a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbientTheme {
    /// Quiet room or park.
    Calm,
    /// Rain on pavement.
    Rain,
    /// City street at night.
    Night,
    /// Wind on a rooftop or bridge.
    Wind,
}

/// Speech output.
pub trait Narrator: Send + Sync {
    /// Speaks `text` with the given voice, interrupting nothing.
    fn speak(&self, text: &str, voice: &VoiceProfile);

    /// Stops any speech in progress.
    fn stop_speaking(&self);
}

/// Sound effects and music.
pub trait AudioCue: Send + Sync {
    /// Plays a one-shot cue.
    fn play_cue(&self, kind: CueKind);

    /// Starts (or re-tunes) the ambient track. `trust_level` is 0..=100 and
    /// lets the backend shift the mood as rapport grows.
    fn start_ambient(&self, theme: AmbientTheme, trust_level: u8);

    /// Stops all music.
    fn stop_music(&self);
}
