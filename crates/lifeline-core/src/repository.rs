//! Persistence abstractions.
//!
//! Saves are a simple key-value affair: one set of completed scenarios and one
//! settings record.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::DomainError;
use crate::ids::ScenarioId;
use crate::settings::Settings;

/// Repository for the set of completed scenarios.
#[async_trait]
pub trait ProgressionRepository: Send + Sync {
    /// Load the completed scenario ids. A missing save is an empty set, not an
    /// error.
    async fn load_progression(&self) -> Result<BTreeSet<ScenarioId>, DomainError>;

    /// Replace the stored set of completed scenario ids.
    async fn save_progression(&self, completed: &BTreeSet<ScenarioId>)
    -> Result<(), DomainError>;
}

/// Repository for player settings.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Load settings, or `None` if nothing has been saved yet.
    async fn load_settings(&self) -> Result<Option<Settings>, DomainError>;

    /// Persist settings.
    async fn save_settings(&self, settings: &Settings) -> Result<(), DomainError>;
}
