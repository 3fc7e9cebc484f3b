//! Authoring checks.
//!
//! None of these issues stop a scenario from loading; the interpreter has a
//! fallback for each. They are reported so authors can fix the content.

use std::collections::{BTreeSet, VecDeque};

use lifeline_core::ids::{ClueId, NodeId, ResourceId, ScenarioId};
use lifeline_dialogue::domain::graph::is_reserved;
use lifeline_dialogue::domain::scenario::{DialogueNode, Scenario};
use thiserror::Error;

/// A gap or inconsistency in authored content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthoringIssue {
    /// `start_node_id` does not name an authored node.
    #[error("{scenario}: start node '{node}' is not defined")]
    MissingStartNode {
        /// Scenario with the issue.
        scenario: ScenarioId,
        /// The missing start node.
        node: NodeId,
    },

    /// An option points at a node that does not exist and is not reserved.
    #[error("{scenario}: option on '{node}' leads to undefined node '{target}'")]
    DanglingReference {
        /// Scenario with the issue.
        scenario: ScenarioId,
        /// Node holding the option.
        node: NodeId,
        /// The undefined target.
        target: NodeId,
    },

    /// An interior node has no options.
    #[error("{scenario}: node '{node}' has no options")]
    NoOptions {
        /// Scenario with the issue.
        scenario: ScenarioId,
        /// The dead-end node.
        node: NodeId,
    },

    /// An option requires a clue the scenario never grants.
    #[error("{scenario}: option on '{node}' requires unknown clue '{clue}'")]
    UnknownClue {
        /// Scenario with the issue.
        scenario: ScenarioId,
        /// Node holding the option.
        node: NodeId,
        /// The unknown clue.
        clue: ClueId,
    },

    /// A node requires a resource that is not in the resource catalog.
    #[error("{scenario}: node '{node}' requires unknown resource '{resource}'")]
    UnknownResource {
        /// Scenario with the issue.
        scenario: ScenarioId,
        /// The gated node.
        node: NodeId,
        /// The unknown resource.
        resource: ResourceId,
    },

    /// A node cannot be reached from the start node.
    #[error("{scenario}: node '{node}' is unreachable")]
    Unreachable {
        /// Scenario with the issue.
        scenario: ScenarioId,
        /// The unreachable node.
        node: NodeId,
    },

    /// A declared prerequisite is not in the catalog.
    #[error("{scenario}: prerequisite '{prerequisite}' is not in the catalog")]
    UnknownPrerequisite {
        /// Scenario with the issue.
        scenario: ScenarioId,
        /// The unknown prerequisite.
        prerequisite: ScenarioId,
    },
}

/// Checks one scenario against the resource catalog.
#[must_use]
pub fn validate_scenario(scenario: &Scenario, resources: &[ResourceId]) -> Vec<AuthoringIssue> {
    let mut issues = Vec::new();
    let scenario_id = &scenario.id;
    let clue = scenario.clue.as_ref().map(|clue| &clue.id);

    if !scenario.nodes.contains_key(&scenario.start_node_id) {
        issues.push(AuthoringIssue::MissingStartNode {
            scenario: scenario_id.clone(),
            node: scenario.start_node_id.clone(),
        });
    }

    for (node_id, node) in &scenario.nodes {
        let DialogueNode::Interior(interior) = node else {
            continue;
        };
        if interior.options.is_empty() {
            issues.push(AuthoringIssue::NoOptions {
                scenario: scenario_id.clone(),
                node: node_id.clone(),
            });
        }
        if let Some(resource) = &interior.required_resource
            && !resources.contains(resource)
        {
            issues.push(AuthoringIssue::UnknownResource {
                scenario: scenario_id.clone(),
                node: node_id.clone(),
                resource: resource.clone(),
            });
        }
        for option in &interior.options {
            if !scenario.nodes.contains_key(&option.next) && !is_reserved(&option.next) {
                issues.push(AuthoringIssue::DanglingReference {
                    scenario: scenario_id.clone(),
                    node: node_id.clone(),
                    target: option.next.clone(),
                });
            }
            if let Some(required) = &option.required_clue
                && clue != Some(required)
            {
                issues.push(AuthoringIssue::UnknownClue {
                    scenario: scenario_id.clone(),
                    node: node_id.clone(),
                    clue: required.clone(),
                });
            }
        }
    }

    let reachable = reachable_nodes(scenario);
    for node_id in scenario.nodes.keys() {
        if !reachable.contains(node_id) && !is_reserved(node_id) {
            issues.push(AuthoringIssue::Unreachable {
                scenario: scenario_id.clone(),
                node: node_id.clone(),
            });
        }
    }

    issues
}

/// Checks that declared prerequisites exist.
#[must_use]
pub fn validate_prerequisites(scenario: &Scenario, known: &[ScenarioId]) -> Vec<AuthoringIssue> {
    scenario
        .prerequisites
        .iter()
        .flatten()
        .filter(|prerequisite| !known.contains(prerequisite))
        .map(|prerequisite| AuthoringIssue::UnknownPrerequisite {
            scenario: scenario.id.clone(),
            prerequisite: prerequisite.clone(),
        })
        .collect()
}

/// Breadth-first walk over authored nodes from the start node.
fn reachable_nodes(scenario: &Scenario) -> BTreeSet<NodeId> {
    let mut seen = BTreeSet::new();
    let mut queue = VecDeque::new();
    if scenario.nodes.contains_key(&scenario.start_node_id) {
        queue.push_back(scenario.start_node_id.clone());
    }
    while let Some(node_id) = queue.pop_front() {
        if !seen.insert(node_id.clone()) {
            continue;
        }
        if let Some(DialogueNode::Interior(interior)) = scenario.nodes.get(&node_id) {
            for option in &interior.options {
                if scenario.nodes.contains_key(&option.next) && !seen.contains(&option.next) {
                    queue.push_back(option.next.clone());
                }
            }
        }
    }
    seen
}
