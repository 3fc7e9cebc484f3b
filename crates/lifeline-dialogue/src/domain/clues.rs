//! Clue tracking. Discovery is additive only.

use std::collections::BTreeSet;

use lifeline_core::ids::ClueId;

use super::scenario::Scenario;

/// Records `clue` as discovered. Returns `true` if it was new.
pub fn discover(discovered: &mut BTreeSet<ClueId>, clue: ClueId) -> bool {
    discovered.insert(clue)
}

/// Whether the scenario's clue is still waiting to be found.
#[must_use]
pub fn can_investigate(scenario: &Scenario, discovered: &BTreeSet<ClueId>) -> bool {
    scenario
        .clue
        .as_ref()
        .is_some_and(|clue| !discovered.contains(&clue.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::scenario::{ClueDefinition, Staging};
    use lifeline_core::ids::{NodeId, ScenarioId};
    use lifeline_core::presentation::{AmbientTheme, VoiceProfile};

    fn scenario(clue: Option<&str>) -> Scenario {
        Scenario {
            id: ScenarioId::from("s"),
            title: "S".to_owned(),
            summary: String::new(),
            npc_name: "Jo".to_owned(),
            npc_voice: VoiceProfile::new("jo", 1.0, 1.0),
            ambient: AmbientTheme::Rain,
            start_node_id: NodeId::from("start"),
            nodes: Default::default(),
            clue: clue.map(|id| ClueDefinition {
                id: ClueId::from(id),
                description: "A crumpled note.".to_owned(),
            }),
            prerequisites: None,
            staging: Staging::default(),
            handover_line: String::new(),
        }
    }

    #[test]
    fn test_discover_is_idempotent() {
        let mut discovered = BTreeSet::new();

        assert!(discover(&mut discovered, ClueId::from("note")));
        assert!(!discover(&mut discovered, ClueId::from("note")));
        assert_eq!(discovered.len(), 1);
    }

    #[test]
    fn test_can_investigate_until_clue_found() {
        let scenario = scenario(Some("note"));
        let mut discovered = BTreeSet::new();

        assert!(can_investigate(&scenario, &discovered));
        discover(&mut discovered, ClueId::from("note"));
        assert!(!can_investigate(&scenario, &discovered));
    }

    #[test]
    fn test_scenario_without_clue_cannot_be_investigated() {
        assert!(!can_investigate(&scenario(None), &BTreeSet::new()));
    }
}
