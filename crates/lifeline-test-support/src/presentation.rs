//! Recording narrator and audio collaborators.

use std::sync::{Arc, Mutex};

use lifeline_core::presentation::{AmbientTheme, AudioCue, CueKind, Narrator, VoiceProfile};

/// One call made to a `RecordingNarrator`.
#[derive(Debug, Clone, PartialEq)]
pub enum NarratorCall {
    /// `speak(text, voice)`.
    Speak {
        /// Spoken text.
        text: String,
        /// Voice hint of the profile used.
        voice: String,
    },
    /// `stop_speaking()`.
    Stop,
}

/// A narrator that records every call. Clones share the same log, so a test
/// can keep one handle and give the other to the engine.
#[derive(Debug, Clone, Default)]
pub struct RecordingNarrator {
    calls: Arc<Mutex<Vec<NarratorCall>>>,
}

impl RecordingNarrator {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all calls.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<NarratorCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns only the spoken texts, in order.
    #[must_use]
    pub fn spoken(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                NarratorCall::Speak { text, .. } => Some(text),
                NarratorCall::Stop => None,
            })
            .collect()
    }

    /// Forgets all recorded calls.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl Narrator for RecordingNarrator {
    fn speak(&self, text: &str, voice: &VoiceProfile) {
        self.calls.lock().unwrap().push(NarratorCall::Speak {
            text: text.to_owned(),
            voice: voice.voice.clone(),
        });
    }

    fn stop_speaking(&self) {
        self.calls.lock().unwrap().push(NarratorCall::Stop);
    }
}

/// One call made to a `RecordingAudio`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCall {
    /// `play_cue(kind)`.
    Cue(CueKind),
    /// `start_ambient(theme, trust)`.
    Ambient(AmbientTheme, u8),
    /// `stop_music()`.
    StopMusic,
}

/// An audio service that records every call. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingAudio {
    calls: Arc<Mutex<Vec<AudioCall>>>,
}

impl RecordingAudio {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all calls.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<AudioCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns only the one-shot cues, in order.
    #[must_use]
    pub fn cues(&self) -> Vec<CueKind> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                AudioCall::Cue(kind) => Some(kind),
                _ => None,
            })
            .collect()
    }

    /// Forgets all recorded calls.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl AudioCue for RecordingAudio {
    fn play_cue(&self, kind: CueKind) {
        self.calls.lock().unwrap().push(AudioCall::Cue(kind));
    }

    fn start_ambient(&self, theme: AmbientTheme, trust_level: u8) {
        self.calls
            .lock()
            .unwrap()
            .push(AudioCall::Ambient(theme, trust_level));
    }

    fn stop_music(&self) {
        self.calls.lock().unwrap().push(AudioCall::StopMusic);
    }
}
