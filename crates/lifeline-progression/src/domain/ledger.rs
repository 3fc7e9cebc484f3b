//! Progression ledger.

use std::collections::BTreeSet;

use lifeline_core::ids::ScenarioId;
use serde::{Deserialize, Serialize};

/// The set of completed scenarios. Entries are only ever added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressionLedger {
    completed: BTreeSet<ScenarioId>,
}

impl ProgressionLedger {
    /// Creates a ledger from previously saved entries.
    #[must_use]
    pub fn from_completed(completed: BTreeSet<ScenarioId>) -> Self {
        Self { completed }
    }

    /// Records a completion. Returns `true` the first time a scenario is
    /// completed and `false` for repeats.
    pub fn record_completion(&mut self, scenario_id: ScenarioId) -> bool {
        self.completed.insert(scenario_id)
    }

    /// Whether the scenario has been completed.
    #[must_use]
    pub fn is_completed(&self, scenario_id: &ScenarioId) -> bool {
        self.completed.contains(scenario_id)
    }

    /// All completed scenarios.
    #[must_use]
    pub fn completed(&self) -> &BTreeSet<ScenarioId> {
        &self.completed
    }
}
