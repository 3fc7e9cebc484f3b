//! JSON file persistence for progress and settings.
//!
//! Two files live in the save directory: `progression.json`, an array of
//! completed scenario ids, and `settings.json`. Writes go to a temporary
//! file first and are renamed into place.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lifeline_core::error::DomainError;
use lifeline_core::ids::ScenarioId;
use lifeline_core::repository::{ProgressionRepository, SettingsRepository};
use lifeline_core::settings::Settings;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

const PROGRESSION_FILE: &str = "progression.json";
const SETTINGS_FILE: &str = "settings.json";

/// Key-value save store backed by JSON files in one directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `dir`. The directory is created on first
    /// save.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The save directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn read<T: DeserializeOwned + Send>(&self, file: &str) -> Result<Option<T>, DomainError> {
        let path = self.dir.join(file);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DomainError::Infrastructure(format!(
                    "failed to read {}: {e}",
                    path.display()
                )));
            }
        };
        serde_json::from_str(&raw).map(Some).map_err(|e| {
            DomainError::Infrastructure(format!("{} is corrupt: {e}", path.display()))
        })
    }

    async fn write<T: Serialize + Sync>(&self, file: &str, value: &T) -> Result<(), DomainError> {
        let infrastructure =
            |e: std::io::Error| DomainError::Infrastructure(format!("failed to save {file}: {e}"));
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(infrastructure)?;
        let body = serde_json::to_vec_pretty(value)
            .map_err(|e| DomainError::Infrastructure(format!("failed to encode {file}: {e}")))?;
        let path = self.dir.join(file);
        let staging = self.dir.join(format!("{file}.tmp"));
        tokio::fs::write(&staging, body)
            .await
            .map_err(infrastructure)?;
        tokio::fs::rename(&staging, &path)
            .await
            .map_err(infrastructure)?;
        debug!(path = %path.display(), "saved");
        Ok(())
    }
}

#[async_trait]
impl ProgressionRepository for FileStore {
    async fn load_progression(&self) -> Result<BTreeSet<ScenarioId>, DomainError> {
        Ok(self.read(PROGRESSION_FILE).await?.unwrap_or_default())
    }

    async fn save_progression(
        &self,
        completed: &BTreeSet<ScenarioId>,
    ) -> Result<(), DomainError> {
        self.write(PROGRESSION_FILE, completed).await
    }
}

#[async_trait]
impl SettingsRepository for FileStore {
    async fn load_settings(&self) -> Result<Option<Settings>, DomainError> {
        self.read(SETTINGS_FILE).await
    }

    async fn save_settings(&self, settings: &Settings) -> Result<(), DomainError> {
        self.write(SETTINGS_FILE, settings).await
    }
}

/// Loads settings, falling back to defaults when nothing is saved or the
/// save cannot be read.
pub async fn load_settings(repo: &dyn SettingsRepository) -> Settings {
    match repo.load_settings().await {
        Ok(Some(settings)) => settings,
        Ok(None) => Settings::default(),
        Err(e) => {
            warn!(error = %e, "settings unreadable, using defaults");
            Settings::default()
        }
    }
}
