//! Test repositories — in-memory and failing persistence for tests.

use std::collections::BTreeSet;
use std::sync::Mutex;

use async_trait::async_trait;
use lifeline_core::error::DomainError;
use lifeline_core::ids::ScenarioId;
use lifeline_core::repository::{ProgressionRepository, SettingsRepository};
use lifeline_core::settings::Settings;

/// A progression repository backed by a `Mutex<BTreeSet>`. Counts saves so
/// tests can assert on write frequency.
#[derive(Debug, Default)]
pub struct InMemoryProgressionRepository {
    completed: Mutex<BTreeSet<ScenarioId>>,
    saves: Mutex<usize>,
}

impl InMemoryProgressionRepository {
    /// Create a repository pre-populated with `completed`.
    #[must_use]
    pub fn with_completed<I, S>(completed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ScenarioId>,
    {
        Self {
            completed: Mutex::new(completed.into_iter().map(Into::into).collect()),
            saves: Mutex::new(0),
        }
    }

    /// Returns the stored set.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn stored(&self) -> BTreeSet<ScenarioId> {
        self.completed.lock().unwrap().clone()
    }

    /// Number of `save_progression` calls.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap()
    }
}

#[async_trait]
impl ProgressionRepository for InMemoryProgressionRepository {
    async fn load_progression(&self) -> Result<BTreeSet<ScenarioId>, DomainError> {
        Ok(self.completed.lock().unwrap().clone())
    }

    async fn save_progression(
        &self,
        completed: &BTreeSet<ScenarioId>,
    ) -> Result<(), DomainError> {
        *self.completed.lock().unwrap() = completed.clone();
        *self.saves.lock().unwrap() += 1;
        Ok(())
    }
}

/// A settings repository backed by a `Mutex<Option<Settings>>`.
#[derive(Debug, Default)]
pub struct InMemorySettingsRepository {
    settings: Mutex<Option<Settings>>,
}

impl InMemorySettingsRepository {
    /// Returns the stored settings.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn stored(&self) -> Option<Settings> {
        self.settings.lock().unwrap().clone()
    }
}

#[async_trait]
impl SettingsRepository for InMemorySettingsRepository {
    async fn load_settings(&self) -> Result<Option<Settings>, DomainError> {
        Ok(self.settings.lock().unwrap().clone())
    }

    async fn save_settings(&self, settings: &Settings) -> Result<(), DomainError> {
        *self.settings.lock().unwrap() = Some(settings.clone());
        Ok(())
    }
}

/// A repository that always returns an infrastructure error, as a corrupt or
/// unreadable save would. Useful for testing degradation paths.
#[derive(Debug)]
pub struct FailingRepository;

#[async_trait]
impl ProgressionRepository for FailingRepository {
    async fn load_progression(&self) -> Result<BTreeSet<ScenarioId>, DomainError> {
        Err(DomainError::Infrastructure("save file is corrupt".into()))
    }

    async fn save_progression(
        &self,
        _completed: &BTreeSet<ScenarioId>,
    ) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("disk is read-only".into()))
    }
}

#[async_trait]
impl SettingsRepository for FailingRepository {
    async fn load_settings(&self) -> Result<Option<Settings>, DomainError> {
        Err(DomainError::Infrastructure("save file is corrupt".into()))
    }

    async fn save_settings(&self, _settings: &Settings) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("disk is read-only".into()))
    }
}
