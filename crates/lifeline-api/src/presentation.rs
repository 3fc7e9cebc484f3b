//! Presentation outbox.
//!
//! The engine speaks and plays sounds through `Narrator` and `AudioCue`. In
//! the HTTP host those calls are queued here for the client to drain and
//! render; nothing is played server-side.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lifeline_core::presentation::{AmbientTheme, AudioCue, CueKind, Narrator, VoiceProfile};
use serde::Serialize;
use tracing::{debug, warn};

/// Oldest cues are dropped beyond this many undrained entries.
pub const OUTBOX_CAPACITY: usize = 256;

/// One presentation instruction for the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PresentationCue {
    /// Speak a line.
    Speak {
        /// Text to speak.
        text: String,
        /// Voice to speak it with.
        voice: VoiceProfile,
    },
    /// Stop any speech in progress.
    StopSpeaking,
    /// Play a one-shot sound.
    Cue {
        /// Which sound.
        cue: CueKind,
    },
    /// Start or retune the ambient soundscape.
    Ambient {
        /// Soundscape.
        theme: AmbientTheme,
        /// Trust level the music should reflect.
        trust_level: u8,
    },
    /// Stop the music.
    StopMusic,
}

/// Queue of presentation instructions shared between the engine and the
/// HTTP layer.
#[derive(Debug, Clone, Default)]
pub struct CueOutbox {
    queue: Arc<Mutex<VecDeque<PresentationCue>>>,
}

impl CueOutbox {
    /// An empty outbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn queue(&self) -> MutexGuard<'_, VecDeque<PresentationCue>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, cue: PresentationCue) {
        debug!(?cue, "presentation cue queued");
        let mut queue = self.queue();
        if queue.len() >= OUTBOX_CAPACITY {
            queue.pop_front();
            warn!("presentation outbox full, dropping oldest cue");
        }
        queue.push_back(cue);
    }

    /// Removes and returns every queued instruction, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<PresentationCue> {
        self.queue().drain(..).collect()
    }

    /// Number of queued instructions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue().len()
    }

    /// Whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue().is_empty()
    }
}

impl Narrator for CueOutbox {
    fn speak(&self, text: &str, voice: &VoiceProfile) {
        self.push(PresentationCue::Speak {
            text: text.to_owned(),
            voice: voice.clone(),
        });
    }

    fn stop_speaking(&self) {
        self.push(PresentationCue::StopSpeaking);
    }
}

impl AudioCue for CueOutbox {
    fn play_cue(&self, kind: CueKind) {
        self.push(PresentationCue::Cue { cue: kind });
    }

    fn start_ambient(&self, theme: AmbientTheme, trust_level: u8) {
        self.push(PresentationCue::Ambient { theme, trust_level });
    }

    fn stop_music(&self) {
        self.push(PresentationCue::StopMusic);
    }
}
