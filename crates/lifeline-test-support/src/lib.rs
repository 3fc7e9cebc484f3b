//! Shared test mocks and utilities for the Lifeline scenario trainer.

mod clock;
mod presentation;
mod repository;
mod rng;

pub use clock::{FixedClock, fixed_clock};
pub use presentation::{AudioCall, NarratorCall, RecordingAudio, RecordingNarrator};
pub use repository::{
    FailingRepository, InMemoryProgressionRepository, InMemorySettingsRepository,
};
pub use rng::{MockRng, SequenceRng};
