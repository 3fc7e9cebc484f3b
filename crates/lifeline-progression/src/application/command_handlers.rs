//! Command handlers for the Progression context.
//!
//! Loading never fails: a missing or unreadable save degrades to an empty
//! ledger so the player can always start the tutorial.

use lifeline_core::error::DomainError;
use lifeline_core::repository::ProgressionRepository;
use tracing::{info, warn};

use crate::domain::ledger::ProgressionLedger;

/// Loads the saved ledger, or an empty one if the save cannot be read.
pub async fn load_progression(repo: &dyn ProgressionRepository) -> ProgressionLedger {
    match repo.load_progression().await {
        Ok(completed) => {
            info!(completed = completed.len(), "progression loaded");
            ProgressionLedger::from_completed(completed)
        }
        Err(error) => {
            warn!(%error, "could not read saved progression, starting fresh");
            ProgressionLedger::default()
        }
    }
}

/// Persists the ledger.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the repository cannot write.
pub async fn save_progression(
    ledger: &ProgressionLedger,
    repo: &dyn ProgressionRepository,
) -> Result<(), DomainError> {
    repo.save_progression(ledger.completed()).await?;
    info!(completed = ledger.completed().len(), "progression saved");
    Ok(())
}
