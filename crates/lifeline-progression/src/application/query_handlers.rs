//! Query handlers for the Progression context.

use lifeline_content::domain::catalog::ScenarioCatalog;
use lifeline_core::ids::ScenarioId;
use serde::Serialize;

use crate::domain::ledger::ProgressionLedger;
use crate::domain::locks::is_locked;

/// Read-only view of one scenario on the selection screen.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioSummaryView {
    /// Scenario identifier.
    pub scenario_id: ScenarioId,
    /// Title.
    pub title: String,
    /// One-line description.
    pub summary: String,
    /// The character's name.
    pub npc_name: String,
    /// Whether the scenario can be launched.
    pub locked: bool,
    /// Whether the player has completed it.
    pub completed: bool,
}

/// Lists every scenario in catalog order with its lock and completion state.
#[must_use]
pub fn list_scenarios(
    catalog: &ScenarioCatalog,
    ledger: &ProgressionLedger,
    dev_override: bool,
) -> Vec<ScenarioSummaryView> {
    catalog
        .scenarios()
        .iter()
        .map(|scenario| ScenarioSummaryView {
            scenario_id: scenario.id.clone(),
            title: scenario.title.clone(),
            summary: scenario.summary.clone(),
            npc_name: scenario.npc_name.clone(),
            locked: is_locked(&scenario.id, catalog, ledger.completed(), dev_override),
            completed: ledger.is_completed(&scenario.id),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifeline_content::application::command_handlers::builtin_catalog;

    #[test]
    fn test_fresh_player_sees_only_tutorial_unlocked() {
        let catalog = builtin_catalog().unwrap();

        let views = list_scenarios(&catalog, &ProgressionLedger::default(), false);

        assert_eq!(views.len(), 4);
        assert_eq!(views[0].scenario_id, ScenarioId::from("tutorial"));
        assert!(!views[0].locked);
        assert!(views[1..].iter().all(|view| view.locked));
        assert!(views.iter().all(|view| !view.completed));
    }

    #[test]
    fn test_completed_tutorial_unlocks_next_scenario() {
        let catalog = builtin_catalog().unwrap();
        let mut ledger = ProgressionLedger::default();
        ledger.record_completion(ScenarioId::from("tutorial"));

        let views = list_scenarios(&catalog, &ledger, false);

        assert!(views[0].completed);
        assert!(!views[1].locked);
        assert!(views[2].locked);
    }
}
