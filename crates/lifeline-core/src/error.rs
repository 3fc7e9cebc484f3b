//! Domain error types.

use thiserror::Error;

use crate::ids::ScenarioId;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No scenario with this identifier exists in the catalog.
    #[error("scenario not found: {0}")]
    ScenarioNotFound(ScenarioId),

    /// The scenario exists but its prerequisites are not completed.
    #[error("scenario is locked: {0}")]
    ScenarioLocked(ScenarioId),

    /// The command is not valid in the current session phase.
    #[error("invalid phase: expected {expected}, found {actual}")]
    InvalidPhase {
        /// The phase the command requires.
        expected: &'static str,
        /// The phase the session is in.
        actual: &'static str,
    },

    /// Input arrived while the previous line is still being spoken.
    #[error("input suppressed while the previous line is spoken")]
    InputSuppressed,

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
