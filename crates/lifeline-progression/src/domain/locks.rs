//! Unlock rules.
//!
//! The tutorial is always open. Everything else needs the tutorial, plus
//! either its declared prerequisites or, when none are declared, the scenario
//! before it in catalog order.

use std::collections::BTreeSet;

use lifeline_content::domain::catalog::ScenarioCatalog;
use lifeline_core::ids::ScenarioId;

/// Whether `scenario_id` is locked. Unknown scenarios are locked.
#[must_use]
pub fn is_locked(
    scenario_id: &ScenarioId,
    catalog: &ScenarioCatalog,
    completed: &BTreeSet<ScenarioId>,
    dev_override: bool,
) -> bool {
    if dev_override {
        return false;
    }
    if scenario_id == catalog.tutorial_id() {
        return false;
    }
    let Some(position) = catalog.position(scenario_id) else {
        return true;
    };
    if !completed.contains(catalog.tutorial_id()) {
        return true;
    }

    let scenario = &catalog.scenarios()[position];
    match &scenario.prerequisites {
        Some(prerequisites) => prerequisites.iter().any(|id| !completed.contains(id)),
        None => position
            .checked_sub(1)
            .map(|previous| &catalog.scenarios()[previous].id)
            .is_some_and(|previous| !completed.contains(previous)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifeline_content::application::command_handlers::builtin_catalog;

    fn completed(ids: &[&str]) -> BTreeSet<ScenarioId> {
        ids.iter().copied().map(ScenarioId::from).collect()
    }

    #[test]
    fn test_tutorial_is_never_locked() {
        let catalog = builtin_catalog().unwrap();
        let tutorial = ScenarioId::from("tutorial");

        assert!(!is_locked(&tutorial, &catalog, &completed(&[]), false));
        assert!(!is_locked(
            &tutorial,
            &catalog,
            &completed(&["exam_pressure", "rooftop"]),
            false
        ));
    }

    #[test]
    fn test_everything_else_needs_the_tutorial() {
        let catalog = builtin_catalog().unwrap();

        let locked = is_locked(
            &ScenarioId::from("exam_pressure"),
            &catalog,
            &completed(&[]),
            false,
        );

        assert!(locked);
        assert!(!is_locked(
            &ScenarioId::from("exam_pressure"),
            &catalog,
            &completed(&["tutorial"]),
            false
        ));
    }

    #[test]
    fn test_default_ordering_requires_previous_scenario() {
        let catalog = builtin_catalog().unwrap();
        let bridge = ScenarioId::from("night_bridge");

        assert!(is_locked(&bridge, &catalog, &completed(&["tutorial"]), false));
        assert!(!is_locked(
            &bridge,
            &catalog,
            &completed(&["tutorial", "exam_pressure"]),
            false
        ));
    }

    #[test]
    fn test_declared_prerequisites_replace_default_ordering() {
        // rooftop comes after night_bridge but only declares exam_pressure.
        let catalog = builtin_catalog().unwrap();
        let rooftop = ScenarioId::from("rooftop");

        assert!(is_locked(&rooftop, &catalog, &completed(&["tutorial"]), false));
        assert!(!is_locked(
            &rooftop,
            &catalog,
            &completed(&["tutorial", "exam_pressure"]),
            false
        ));
    }

    #[test]
    fn test_dev_override_unlocks_everything() {
        let catalog = builtin_catalog().unwrap();

        for scenario in catalog.scenarios() {
            assert!(!is_locked(&scenario.id, &catalog, &completed(&[]), true));
        }
    }

    #[test]
    fn test_unknown_scenario_is_locked() {
        let catalog = builtin_catalog().unwrap();

        assert!(is_locked(
            &ScenarioId::from("ghost"),
            &catalog,
            &completed(&["tutorial"]),
            false
        ));
    }
}
