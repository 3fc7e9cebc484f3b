//! Dialogue graph interpreter.
//!
//! `resolve_node` never fails: missing references resolve to synthesized
//! endings, the start node, or a placeholder, so the session always has a
//! renderable node.

use std::borrow::Cow;
use std::collections::BTreeSet;

use lifeline_core::ids::{ClueId, NodeId};
use lifeline_core::rng::{DeterministicRng, shuffle};
use tracing::warn;

use super::scenario::{
    DialogueNode, DialogueOption, InteriorNode, NpcEmotion, Outcome, Scenario, TerminalNode,
};

/// Reserved id of the success ending reached after the helpline call.
pub const SUCCESS_NODE_ID: &str = "success_hotline";

/// Reserved id of the failure ending reached when trust runs out.
pub const FAILURE_NODE_ID: &str = "leave_failure";

const SUCCESS_MESSAGE: &str = "You stayed with them and helped them reach a trained counselor. \
     Reaching out together made the difference.";
const FAILURE_MESSAGE: &str = "They walked away. Listening without judgement is hard, and it is \
     a skill you can keep practicing.";
const PLACEHOLDER_TEXT: &str = "...";

/// Synthesized success ending, used when a scenario does not author one.
#[must_use]
pub fn synthesized_success() -> DialogueNode {
    DialogueNode::Terminal(TerminalNode {
        result: Outcome::Success,
        message: SUCCESS_MESSAGE.to_owned(),
        npc_emotion: NpcEmotion::Relief,
    })
}

/// Synthesized failure ending, used when a scenario does not author one.
#[must_use]
pub fn synthesized_failure() -> DialogueNode {
    DialogueNode::Terminal(TerminalNode {
        result: Outcome::Failure,
        message: FAILURE_MESSAGE.to_owned(),
        npc_emotion: NpcEmotion::Distressed,
    })
}

fn placeholder() -> DialogueNode {
    DialogueNode::Interior(InteriorNode {
        npc_text: PLACEHOLDER_TEXT.to_owned(),
        npc_emotion: NpcEmotion::Neutral,
        required_resource: None,
        options: vec![DialogueOption {
            text: "Give them some space.".to_owned(),
            next: NodeId::from(FAILURE_NODE_ID),
            trust_impact: 0,
            required_clue: None,
            inner_thought: None,
        }],
        text_effect: None,
    })
}

/// Returns `true` if `node_id` is one of the two reserved ending ids.
#[must_use]
pub fn is_reserved(node_id: &NodeId) -> bool {
    node_id == SUCCESS_NODE_ID || node_id == FAILURE_NODE_ID
}

/// Resolves `node_id` in `scenario`, synthesizing a node when it is missing.
#[must_use]
pub fn resolve_node<'a>(scenario: &'a Scenario, node_id: &NodeId) -> Cow<'a, DialogueNode> {
    if let Some(node) = scenario.nodes.get(node_id) {
        return Cow::Borrowed(node);
    }
    if node_id == SUCCESS_NODE_ID {
        return Cow::Owned(synthesized_success());
    }
    if node_id == FAILURE_NODE_ID {
        return Cow::Owned(synthesized_failure());
    }

    warn!(
        scenario_id = %scenario.id,
        node_id = %node_id,
        "dangling node reference, falling back to start node"
    );
    match scenario.nodes.get(&scenario.start_node_id) {
        Some(start) => Cow::Borrowed(start),
        None => {
            warn!(scenario_id = %scenario.id, "start node missing, using placeholder");
            Cow::Owned(placeholder())
        }
    }
}

/// Indices into `node.options` the player may currently choose from, in a
/// freshly shuffled order.
///
/// Options whose `required_clue` has not been discovered are left out.
#[must_use]
pub fn visible_option_indices(
    node: &InteriorNode,
    discovered: &BTreeSet<ClueId>,
    rng: &mut dyn DeterministicRng,
) -> Vec<usize> {
    let mut indices: Vec<usize> = node
        .options
        .iter()
        .enumerate()
        .filter(|(_, option)| {
            option
                .required_clue
                .as_ref()
                .is_none_or(|clue| discovered.contains(clue))
        })
        .map(|(index, _)| index)
        .collect();
    shuffle(&mut indices, rng);
    indices
}

/// The options the player may currently choose from, shuffled.
#[must_use]
pub fn visible_options<'a>(
    node: &'a InteriorNode,
    discovered: &BTreeSet<ClueId>,
    rng: &mut dyn DeterministicRng,
) -> Vec<&'a DialogueOption> {
    visible_option_indices(node, discovered, rng)
        .into_iter()
        .map(|index| &node.options[index])
        .collect()
}

/// The option with the highest trust impact among *all* authored options,
/// including clue-gated ones the player may not have been offered. Ties go to
/// the first authored option.
#[must_use]
pub fn best_option(node: &InteriorNode) -> Option<&DialogueOption> {
    node.options.iter().fold(None, |best, option| match best {
        Some(current) if current.trust_impact >= option.trust_impact => Some(current),
        _ => Some(option),
    })
}

/// Whether `option` matches the best available trust impact on `node`.
#[must_use]
pub fn is_optimal(node: &InteriorNode, option: &DialogueOption) -> bool {
    best_option(node).is_some_and(|best| option.trust_impact >= best.trust_impact)
}
