//! Player-facing settings.

use serde::{Deserialize, Serialize};

/// Settings the player can change between sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Whether NPC and player lines are spoken aloud.
    pub narration_enabled: bool,
    /// Whether ambient music plays.
    pub music_enabled: bool,
    /// Speech rate multiplier applied on top of each voice profile.
    pub voice_rate: f32,
    /// Developer override: every scenario is unlocked.
    pub dev_unlock_all: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            narration_enabled: true,
            music_enabled: true,
            voice_rate: 1.0,
            dev_unlock_all: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_fill_in_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"music_enabled": false}"#).unwrap();

        assert!(!settings.music_enabled);
        assert!(settings.narration_enabled);
        assert!(!settings.dev_unlock_all);
    }
}
