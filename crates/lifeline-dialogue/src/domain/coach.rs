//! Coach feedback shown after each choice.

use lifeline_core::rng::{DeterministicRng, choose};
use serde::{Deserialize, Serialize};

const POSITIVE: &[&str] = &[
    "Good listening. Reflecting their words back shows you heard them.",
    "That felt validating. Staying calm helps them stay calm.",
    "Nice. Open questions give them room to share.",
    "You took them seriously. That builds trust.",
    "Patience pays off. You didn't rush them.",
];

const NEGATIVE: &[&str] = &[
    "That may have felt dismissive. Try acknowledging their feelings first.",
    "Avoid minimizing. Their pain is real to them.",
    "Giving advice too early can shut the conversation down.",
    "Judgement pushes people away. Stay curious instead.",
    "Careful. Pressure can make them withdraw.",
];

const NEUTRAL: &str = "Okay. Keep listening and see where they lead.";

/// How a choice affected trust.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackCategory {
    /// Trust went up.
    Positive,
    /// Trust went down.
    Negative,
    /// No change.
    Neutral,
}

/// A coach message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    /// Category derived from the sign of the trust impact.
    pub category: FeedbackCategory,
    /// Advisory text.
    pub message: String,
}

/// Classifies a trust impact and picks a message from the matching pool.
#[must_use]
pub fn classify(trust_impact: i32, rng: &mut dyn DeterministicRng) -> Feedback {
    let (category, message) = match trust_impact.signum() {
        1 => (
            FeedbackCategory::Positive,
            choose(POSITIVE, rng).copied().unwrap_or(NEUTRAL),
        ),
        -1 => (
            FeedbackCategory::Negative,
            choose(NEGATIVE, rng).copied().unwrap_or(NEUTRAL),
        ),
        _ => (FeedbackCategory::Neutral, NEUTRAL),
    };
    Feedback {
        category,
        message: message.to_owned(),
    }
}
