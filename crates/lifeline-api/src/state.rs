//! Shared application state.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lifeline_core::error::DomainError;
use lifeline_core::repository::{ProgressionRepository, SettingsRepository};
use lifeline_progression::application::command_handlers::save_progression;
use lifeline_progression::domain::ledger::ProgressionLedger;
use lifeline_session::domain::aggregates::SessionEngine;

use crate::presentation::CueOutbox;

/// Application state shared across all request handlers and the ticker.
///
/// The engine lock is only ever held for synchronous work; it is released
/// before any save is awaited.
#[derive(Clone)]
pub struct AppState {
    /// The session engine.
    pub engine: Arc<Mutex<SessionEngine>>,
    /// Presentation instructions waiting for the client.
    pub outbox: CueOutbox,
    /// Where completed scenarios are saved.
    pub progression_repository: Arc<dyn ProgressionRepository>,
    /// Where settings are saved.
    pub settings_repository: Arc<dyn SettingsRepository>,
    /// The ledger as of the last successful save.
    saved_progress: Arc<Mutex<ProgressionLedger>>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        engine: SessionEngine,
        outbox: CueOutbox,
        progression_repository: Arc<dyn ProgressionRepository>,
        settings_repository: Arc<dyn SettingsRepository>,
    ) -> Self {
        let saved_progress = Arc::new(Mutex::new(engine.ledger().clone()));
        Self {
            engine: Arc::new(Mutex::new(engine)),
            outbox,
            progression_repository,
            settings_repository,
            saved_progress,
        }
    }

    /// Locks the engine.
    pub fn engine(&self) -> MutexGuard<'_, SessionEngine> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Saves the ledger if it has changed since the last successful save.
    /// A failed save is retried on the next call.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the save fails.
    pub async fn persist_progress(&self) -> Result<(), DomainError> {
        let ledger = self.engine().ledger().clone();
        if *self.saved_progress() == ledger {
            return Ok(());
        }
        save_progression(&ledger, self.progression_repository.as_ref()).await?;
        *self.saved_progress() = ledger;
        Ok(())
    }

    fn saved_progress(&self) -> MutexGuard<'_, ProgressionLedger> {
        self.saved_progress
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
