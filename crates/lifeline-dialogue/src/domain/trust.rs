//! Trust ledger.

use serde::{Deserialize, Serialize};

/// Rapport with the character, always within `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "i32", into = "u8")]
pub struct Trust(u8);

impl Trust {
    /// Lowest trust. Reaching it ends the conversation.
    pub const MIN: Self = Self(0);
    /// Highest trust, granted when the right resource is offered.
    pub const MAX: Self = Self(100);
    /// Trust at the start of every session.
    pub const INITIAL: Self = Self(25);
    /// Penalty for submitting an option without the required resource. It is
    /// smaller than a typical wrong answer.
    pub const RESOURCE_FAILURE_PENALTY: i32 = 10;

    /// Creates a trust value, clamping into range.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn new(value: i32) -> Self {
        Self(value.clamp(0, 100) as u8)
    }

    /// The numeric value.
    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// Applies a signed option impact.
    #[must_use]
    pub fn apply_impact(self, impact: i32) -> Self {
        Self::new(i32::from(self.0).saturating_add(impact))
    }

    /// Applies the resource-selection penalty.
    #[must_use]
    pub fn apply_resource_failure(self) -> Self {
        self.apply_impact(-Self::RESOURCE_FAILURE_PENALTY)
    }

    /// Whether trust has run out.
    #[must_use]
    pub fn is_depleted(self) -> bool {
        self.0 == 0
    }
}

impl Default for Trust {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl From<i32> for Trust {
    fn from(value: i32) -> Self {
        Self::new(value)
    }
}

impl From<Trust> for u8 {
    fn from(trust: Trust) -> Self {
        trust.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_impact_moves_trust() {
        let trust = Trust::INITIAL.apply_impact(10);

        assert_eq!(trust.value(), 35);
        assert_eq!(trust.apply_impact(-40), Trust::MIN);
    }

    #[test]
    fn test_apply_impact_clamps_both_ends() {
        assert_eq!(Trust::new(95).apply_impact(50), Trust::MAX);
        assert_eq!(Trust::new(5).apply_impact(-50), Trust::MIN);
        assert_eq!(Trust::new(50).apply_impact(i32::MAX), Trust::MAX);
        assert_eq!(Trust::new(50).apply_impact(i32::MIN), Trust::MIN);
    }

    #[test]
    fn test_resource_failure_penalty_floors_at_zero() {
        assert_eq!(Trust::new(25).apply_resource_failure().value(), 15);
        assert_eq!(Trust::new(4).apply_resource_failure(), Trust::MIN);
        assert!(Trust::new(4).apply_resource_failure().is_depleted());
    }

    #[test]
    fn test_every_impact_stays_in_range() {
        for start in [0, 1, 25, 50, 99, 100] {
            for impact in -150..=150 {
                let value = Trust::new(start).apply_impact(impact).value();
                assert!(value <= 100, "{start} + {impact} gave {value}");
            }
        }
    }

    #[test]
    fn test_deserialization_clamps() {
        let trust: Trust = serde_json::from_str("250").unwrap();

        assert_eq!(trust, Trust::MAX);
        assert_eq!(serde_json::to_string(&Trust::new(40)).unwrap(), "40");
    }
}
