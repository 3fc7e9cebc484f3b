//! Virtual-time timer queue.
//!
//! Every delayed effect in a session is a timer with a scope. Leaving a phase
//! cancels its scope, so a stale callback can never fire into a later phase
//! or a later session.

use std::collections::BTreeMap;

use lifeline_core::ids::NodeId;
use serde::{Deserialize, Serialize};

/// What a timer belongs to. Cancelling a scope cancels every timer in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerScope {
    /// The repeating proximity poll.
    Approach,
    /// The pause while a chosen line is spoken.
    Reading,
    /// The call cutscene markers.
    Cutscene,
    /// The end screen dwell.
    EndScreen,
    /// Coach message auto-dismiss.
    Coach,
    /// Clue discovery popup auto-dismiss.
    Discovery,
}

/// Stages of the call cutscene, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CutsceneStage {
    /// The number is being dialed.
    Dialing,
    /// The line is ringing.
    Ringing,
    /// A counselor picked up.
    Connected,
    /// The character speaks to the counselor.
    Handover,
    /// The cutscene is over.
    Complete,
}

impl CutsceneStage {
    /// Offset from the start of the cutscene at which each later stage
    /// begins. `Dialing` starts immediately.
    pub const SCHEDULE: [(u64, Self); 4] = [
        (2_000, Self::Ringing),
        (4_500, Self::Connected),
        (6_500, Self::Handover),
        (11_000, Self::Complete),
    ];
}

/// Where the conversation goes once the reading delay is over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadingOutcome {
    /// Move to the chosen option's target node.
    Advance(NodeId),
    /// The resource gate was satisfied; open the dial pad.
    BeginHandoff,
}

/// What happens when a timer fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimedEffect {
    /// Check whether the player is close enough to talk.
    ProximityPoll,
    /// The chosen line has been spoken.
    FinishReading(ReadingOutcome),
    /// Move the cutscene to the given stage.
    CutsceneMarker(CutsceneStage),
    /// Leave the end screen.
    ReturnToMenu,
    /// Hide the coach message.
    DismissCoach,
    /// Hide the discovery popup.
    DismissDiscovery,
}

/// A timer that came due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredTimer {
    /// Virtual time the timer was due at.
    pub due_ms: u64,
    /// Scope it belonged to.
    pub scope: TimerScope,
    /// What to do.
    pub effect: TimedEffect,
}

#[derive(Debug, Clone)]
struct ScheduledTimer {
    scope: TimerScope,
    effect: TimedEffect,
}

/// Timers ordered by due time, then by scheduling order.
#[derive(Debug, Default)]
pub struct TimerQueue {
    now_ms: u64,
    next_seq: u64,
    entries: BTreeMap<(u64, u64), ScheduledTimer>,
}

impl TimerQueue {
    /// An empty queue at virtual time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds.
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Schedules `effect` to fire `delay_ms` after the current virtual time.
    /// Timers are only ever cancelled by scope.
    pub fn schedule(&mut self, delay_ms: u64, scope: TimerScope, effect: TimedEffect) {
        let seq = self.next_seq;
        self.next_seq += 1;
        let due = self.now_ms.saturating_add(delay_ms);
        self.entries.insert((due, seq), ScheduledTimer { scope, effect });
    }

    /// Cancels every timer in `scope`. Returns how many were removed.
    pub fn cancel_scope(&mut self, scope: TimerScope) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, timer| timer.scope != scope);
        before - self.entries.len()
    }

    /// Cancels everything.
    pub fn cancel_all(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }

    /// Number of timers pending in `scope`.
    #[must_use]
    pub fn pending(&self, scope: TimerScope) -> usize {
        self.entries.values().filter(|timer| timer.scope == scope).count()
    }

    /// Whether any timer is pending in `scope`.
    #[must_use]
    pub fn has_pending(&self, scope: TimerScope) -> bool {
        self.entries.values().any(|timer| timer.scope == scope)
    }

    /// Total number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes and returns the earliest timer due at or before `until_ms`,
    /// moving the clock to its due time. Timers scheduled while handling the
    /// returned one are measured from that due time.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<FiredTimer> {
        let (&(due_ms, seq), _) = self.entries.first_key_value()?;
        if due_ms > until_ms {
            return None;
        }
        let timer = self.entries.remove(&(due_ms, seq))?;
        self.now_ms = self.now_ms.max(due_ms);
        Some(FiredTimer {
            due_ms,
            scope: timer.scope,
            effect: timer.effect,
        })
    }

    /// Moves the clock forward to `until_ms` without firing anything.
    pub fn settle(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_due_returns_timers_in_due_order() {
        // Arrange
        let mut queue = TimerQueue::new();
        queue.schedule(300, TimerScope::Coach, TimedEffect::DismissCoach);
        queue.schedule(100, TimerScope::Approach, TimedEffect::ProximityPoll);

        // Act
        let first = queue.pop_due(1_000).unwrap();
        let second = queue.pop_due(1_000).unwrap();

        // Assert
        assert_eq!(first.effect, TimedEffect::ProximityPoll);
        assert_eq!(first.due_ms, 100);
        assert_eq!(second.effect, TimedEffect::DismissCoach);
        assert!(queue.pop_due(1_000).is_none());
    }

    #[test]
    fn test_pop_due_ignores_future_timers() {
        let mut queue = TimerQueue::new();
        queue.schedule(500, TimerScope::Discovery, TimedEffect::DismissDiscovery);

        assert!(queue.pop_due(499).is_none());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_equal_due_times_fire_in_scheduling_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(100, TimerScope::Coach, TimedEffect::DismissCoach);
        queue.schedule(100, TimerScope::Discovery, TimedEffect::DismissDiscovery);

        assert_eq!(queue.pop_due(100).unwrap().scope, TimerScope::Coach);
        assert_eq!(queue.pop_due(100).unwrap().scope, TimerScope::Discovery);
    }

    #[test]
    fn test_schedule_is_relative_to_last_fired_timer() {
        // Arrange
        let mut queue = TimerQueue::new();
        queue.schedule(100, TimerScope::Approach, TimedEffect::ProximityPoll);

        // Act
        let fired = queue.pop_due(1_000).unwrap();
        queue.schedule(100, TimerScope::Approach, TimedEffect::ProximityPoll);

        // Assert
        assert_eq!(fired.due_ms, 100);
        assert_eq!(queue.now_ms(), 100);
        assert_eq!(queue.pop_due(1_000).unwrap().due_ms, 200);
    }

    #[test]
    fn test_cancel_scope_only_removes_that_scope() {
        // Arrange
        let mut queue = TimerQueue::new();
        for (offset, stage) in CutsceneStage::SCHEDULE {
            queue.schedule(offset, TimerScope::Cutscene, TimedEffect::CutsceneMarker(stage));
        }
        queue.schedule(5_000, TimerScope::Coach, TimedEffect::DismissCoach);

        // Act
        let removed = queue.cancel_scope(TimerScope::Cutscene);

        // Assert
        assert_eq!(removed, 4);
        assert!(!queue.has_pending(TimerScope::Cutscene));
        assert_eq!(queue.pending(TimerScope::Coach), 1);
    }

    #[test]
    fn test_cancel_all_clears_every_scope() {
        let mut queue = TimerQueue::new();
        queue.schedule(100, TimerScope::Coach, TimedEffect::DismissCoach);
        queue.schedule(100, TimerScope::Reading, TimedEffect::FinishReading(ReadingOutcome::BeginHandoff));

        assert_eq!(queue.cancel_all(), 2);
        assert!(queue.is_empty());
        assert!(queue.pop_due(u64::MAX).is_none());
    }

    #[test]
    fn test_settle_never_moves_backwards() {
        let mut queue = TimerQueue::new();
        queue.settle(2_000);
        queue.settle(1_000);

        assert_eq!(queue.now_ms(), 2_000);
    }
}
