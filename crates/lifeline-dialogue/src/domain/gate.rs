//! Resource-gate evaluation.

use lifeline_core::ids::ResourceId;

use super::scenario::InteriorNode;

/// Whether the player's current resource selection satisfies the node.
/// Nodes without a requirement are always satisfied.
#[must_use]
pub fn is_satisfied(node: &InteriorNode, selected: Option<&ResourceId>) -> bool {
    match &node.required_resource {
        None => true,
        Some(required) => selected == Some(required),
    }
}

/// Whether the node asks the player to pick a referral resource.
#[must_use]
pub fn requires_resource(node: &InteriorNode) -> bool {
    node.required_resource.is_some()
}
