//! Aggregate root for the Session context.
//!
//! `SessionEngine` owns the single active playthrough, the progression
//! ledger, the player's settings and every pending timer. All mutation goes
//! through its methods; each one leaves the engine with the trust floor and
//! the end guard re-checked.

use std::borrow::Cow;
use std::sync::Arc;

use lifeline_content::domain::catalog::ScenarioCatalog;
use lifeline_core::clock::Clock;
use lifeline_core::error::DomainError;
use lifeline_core::event::EventMetadata;
use lifeline_core::ids::{NodeId, ResourceId, ScenarioId};
use lifeline_core::presentation::{AudioCue, CueKind, Narrator, VoiceProfile};
use lifeline_core::rng::DeterministicRng;
use lifeline_core::settings::Settings;
use lifeline_dialogue::domain::clues;
use lifeline_dialogue::domain::coach::{self, Feedback, FeedbackCategory};
use lifeline_dialogue::domain::gate;
use lifeline_dialogue::domain::graph::{
    FAILURE_NODE_ID, SUCCESS_NODE_ID, is_optimal, resolve_node, visible_option_indices,
};
use lifeline_dialogue::domain::scenario::{
    DialogueNode, DialogueOption, Outcome, ScenePoint, Scenario, TerminalNode,
};
use lifeline_dialogue::domain::trust::Trust;
use lifeline_progression::domain::ledger::ProgressionLedger;
use lifeline_progression::domain::locks::is_locked;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::commands::Mover;
use super::events::{
    ClueDiscovered, CodeRejected, ConversationStarted, CutsceneAdvanced, HandoffStarted,
    MenuReason, NodeEntered, OptionChosen, ResolutionStarted, ResourceRejected,
    ResourceSelected, ReturnedToMenu, ScenarioCompleted, ScenarioEnded, ScenarioLaunched,
    SessionEvent, SessionEventKind, TrustDepleted,
};
use super::state::{
    COACH_DISPLAY_MS, ChoiceRecord, DISCOVERY_DISPLAY_MS, END_DWELL_MS, MAX_DIAL_DIGITS,
    PROXIMITY_POLL_MS, Phase, READING_DELAY_MS, SessionState, is_accepted_code,
};
use super::timers::{
    CutsceneStage, FiredTimer, ReadingOutcome, TimedEffect, TimerQueue, TimerScope,
};

/// What the counselor says when the call connects.
pub const COUNSELOR_GREETING: &str =
    "Hello, you've reached the helpline. I'm here to listen. What's going on tonight?";

/// Collaborators the engine drives but does not own the state of.
pub struct EngineCollaborators {
    /// Timestamps for event metadata.
    pub clock: Arc<dyn Clock>,
    /// Option shuffling and coach message choice.
    pub rng: Box<dyn DeterministicRng>,
    /// Text-to-speech.
    pub narrator: Arc<dyn Narrator>,
    /// Sound effects and ambient music.
    pub audio: Arc<dyn AudioCue>,
}

/// Short-lived presentation state that is not part of the playthrough
/// record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransientUi {
    /// Coach message currently on screen.
    pub coach: Option<Feedback>,
    /// Clue discovery popup text.
    pub discovery: Option<String>,
    /// Inner thought of the line being spoken.
    pub inner_thought: Option<String>,
    /// Current cutscene stage during the call.
    pub cutscene: Option<CutsceneStage>,
    /// Digits entered on the dial pad.
    pub dial_buffer: String,
}

struct ActiveSession {
    scenario: Arc<Scenario>,
    state: SessionState,
    /// Indices into the current node's options, in presentation order.
    offered: Vec<usize>,
    ui: TransientUi,
    sequence: i64,
}

/// The aggregate root driving one playthrough at a time.
pub struct SessionEngine {
    catalog: Arc<ScenarioCatalog>,
    ledger: ProgressionLedger,
    settings: Settings,
    dev_override: bool,
    clock: Arc<dyn Clock>,
    rng: Box<dyn DeterministicRng>,
    narrator: Arc<dyn Narrator>,
    audio: Arc<dyn AudioCue>,
    timers: TimerQueue,
    active: Option<ActiveSession>,
    /// Uncommitted events pending hand-off to the host.
    uncommitted_events: Vec<SessionEvent>,
}

fn no_session(expected: Phase) -> DomainError {
    DomainError::InvalidPhase {
        expected: expected.as_str(),
        actual: Phase::Menu.as_str(),
    }
}

impl SessionEngine {
    /// Creates an engine sitting at the menu.
    #[must_use]
    pub fn new(
        catalog: Arc<ScenarioCatalog>,
        ledger: ProgressionLedger,
        settings: Settings,
        collaborators: EngineCollaborators,
    ) -> Self {
        Self {
            catalog,
            ledger,
            settings,
            dev_override: false,
            clock: collaborators.clock,
            rng: collaborators.rng,
            narrator: collaborators.narrator,
            audio: collaborators.audio,
            timers: TimerQueue::new(),
            active: None,
            uncommitted_events: Vec::new(),
        }
    }

    /// Sets the host-level developer unlock, independent of the player's
    /// settings.
    pub fn set_dev_override(&mut self, enabled: bool) {
        self.dev_override = enabled;
    }

    /// Whether every scenario is currently unlocked.
    #[must_use]
    pub fn dev_unlock_active(&self) -> bool {
        self.dev_override || self.settings.dev_unlock_all
    }

    /// The loaded scenario catalog.
    #[must_use]
    pub fn catalog(&self) -> &ScenarioCatalog {
        &self.catalog
    }

    /// Scenarios completed so far.
    #[must_use]
    pub fn ledger(&self) -> &ProgressionLedger {
        &self.ledger
    }

    /// The player's settings.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Current phase; `Menu` when nothing is running.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.active
            .as_ref()
            .map_or(Phase::Menu, |active| active.state.phase)
    }

    /// State of the running playthrough.
    #[must_use]
    pub fn state(&self) -> Option<&SessionState> {
        self.active.as_ref().map(|active| &active.state)
    }

    /// The scenario being played.
    #[must_use]
    pub fn scenario(&self) -> Option<&Scenario> {
        self.active.as_ref().map(|active| active.scenario.as_ref())
    }

    /// Transient presentation state of the running playthrough.
    #[must_use]
    pub fn ui(&self) -> Option<&TransientUi> {
        self.active.as_ref().map(|active| &active.ui)
    }

    /// The node the conversation is on, with reserved endings synthesized
    /// and dangling ids resolved.
    #[must_use]
    pub fn current_node(&self) -> Option<Cow<'_, DialogueNode>> {
        self.active
            .as_ref()
            .map(|active| resolve_node(&active.scenario, &active.state.current_node_id))
    }

    /// The options on offer, in presentation order. Empty outside dialogue.
    #[must_use]
    pub fn offered_options(&self) -> Vec<DialogueOption> {
        let Some(active) = self.active.as_ref() else {
            return Vec::new();
        };
        if active.state.phase != Phase::Dialogue {
            return Vec::new();
        }
        let node = resolve_node(&active.scenario, &active.state.current_node_id);
        let Some(interior) = node.as_interior() else {
            return Vec::new();
        };
        active
            .offered
            .iter()
            .filter_map(|&index| interior.options.get(index).cloned())
            .collect()
    }

    /// Whether a chosen line is still being spoken. Input is suppressed
    /// meanwhile.
    #[must_use]
    pub fn is_reading(&self) -> bool {
        self.timers.has_pending(TimerScope::Reading)
    }

    /// Whether the resource picker is open: the conversation is on a gated
    /// node and waiting for the player.
    #[must_use]
    pub fn awaiting_resource(&self) -> bool {
        self.phase() == Phase::Dialogue
            && !self.is_reading()
            && self
                .current_node()
                .is_some_and(|node| node.as_interior().is_some_and(gate::requires_resource))
    }

    /// Whether looking around would turn up something new.
    #[must_use]
    pub fn can_investigate(&self) -> bool {
        self.active.as_ref().is_some_and(|active| {
            matches!(active.state.phase, Phase::Approach | Phase::Dialogue)
                && clues::can_investigate(&active.scenario, &active.state.discovered_clues)
        })
    }

    /// Virtual time in milliseconds.
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.timers.now_ms()
    }

    /// Number of timers pending in `scope`.
    #[must_use]
    pub fn pending_timers(&self, scope: TimerScope) -> usize {
        self.timers.pending(scope)
    }

    /// Total number of pending timers.
    #[must_use]
    pub fn pending_timer_count(&self) -> usize {
        self.timers.len()
    }

    /// Events not yet handed to the host.
    #[must_use]
    pub fn uncommitted_events(&self) -> &[SessionEvent] {
        &self.uncommitted_events
    }

    /// Drains the uncommitted events.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.uncommitted_events)
    }

    /// Starts `scenario_id`, replacing whatever was running.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ScenarioNotFound` for an unknown id and
    /// `DomainError::ScenarioLocked` if its prerequisites are not met.
    pub fn launch_scenario(
        &mut self,
        scenario_id: &ScenarioId,
        correlation_id: Uuid,
    ) -> Result<SessionState, DomainError> {
        let scenario = self
            .catalog
            .get(scenario_id)
            .ok_or_else(|| DomainError::ScenarioNotFound(scenario_id.clone()))?;
        if is_locked(
            scenario_id,
            &self.catalog,
            self.ledger.completed(),
            self.dev_unlock_active(),
        ) {
            return Err(DomainError::ScenarioLocked(scenario_id.clone()));
        }

        self.teardown(correlation_id, MenuReason::Replaced);

        let state = SessionState::new(Uuid::new_v4(), &scenario);
        let snapshot = state.clone();
        let start_node_id = scenario.start_node_id.clone();
        self.active = Some(ActiveSession {
            scenario,
            state,
            offered: Vec::new(),
            ui: TransientUi::default(),
            sequence: 0,
        });

        self.emit(
            correlation_id,
            SessionEventKind::ScenarioLaunched(ScenarioLaunched {
                scenario_id: scenario_id.clone(),
                start_node_id,
            }),
        );
        self.refresh_ambient();
        self.timers.schedule(
            PROXIMITY_POLL_MS,
            TimerScope::Approach,
            TimedEffect::ProximityPoll,
        );
        info!(
            scenario_id = %scenario_id,
            session_id = %snapshot.session_id,
            "scenario launched"
        );
        Ok(snapshot)
    }

    /// Moves the player or the character on the scene, clamped to the grid.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPhase` at the menu and
    /// `DomainError::Validation` for non-finite steps.
    pub fn move_marker(&mut self, mover: Mover, dx: f32, dy: f32) -> Result<ScenePoint, DomainError> {
        if !dx.is_finite() || !dy.is_finite() {
            return Err(DomainError::Validation(
                "movement steps must be finite numbers".to_owned(),
            ));
        }
        let active = self
            .active
            .as_mut()
            .ok_or_else(|| no_session(Phase::Approach))?;
        let position = match mover {
            Mover::Player => &mut active.state.player_position,
            Mover::Npc => &mut active.state.npc_position,
        };
        *position = position.translated(dx, dy);
        Ok(*position)
    }

    /// Moves the player marker.
    ///
    /// # Errors
    ///
    /// See [`SessionEngine::move_marker`].
    pub fn move_player(&mut self, dx: f32, dy: f32) -> Result<ScenePoint, DomainError> {
        self.move_marker(Mover::Player, dx, dy)
    }

    /// Moves the character marker, as reported by the presentation layer.
    ///
    /// # Errors
    ///
    /// See [`SessionEngine::move_marker`].
    pub fn move_npc(&mut self, dx: f32, dy: f32) -> Result<ScenePoint, DomainError> {
        self.move_marker(Mover::Npc, dx, dy)
    }

    /// Chooses the option at `index` in the offered list.
    ///
    /// On a gated node without the right resource selected the option is
    /// refused: trust takes the resource penalty and nothing advances.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPhase` outside dialogue,
    /// `DomainError::InputSuppressed` while a line is being spoken and
    /// `DomainError::Validation` for an index outside the offered list.
    pub fn select_option(&mut self, index: usize, correlation_id: Uuid) -> Result<(), DomainError> {
        self.require_phase(Phase::Dialogue)?;
        if self.is_reading() {
            return Err(DomainError::InputSuppressed);
        }

        let active = self
            .active
            .as_mut()
            .ok_or_else(|| no_session(Phase::Dialogue))?;
        let scenario = Arc::clone(&active.scenario);
        let node_id = active.state.current_node_id.clone();
        let node = resolve_node(&scenario, &node_id);
        let Some(interior) = node.as_interior() else {
            return Err(DomainError::Validation(
                "the current node has no options".to_owned(),
            ));
        };
        let option = active
            .offered
            .get(index)
            .and_then(|&authored| interior.options.get(authored))
            .ok_or_else(|| {
                DomainError::Validation(format!("option {index} is not on offer"))
            })?;

        let selected = active.state.selected_resource.clone();
        if !gate::is_satisfied(interior, selected.as_ref()) {
            active.state.trust = active.state.trust.apply_resource_failure();
            let trust_after = active.state.trust.value();
            self.emit(
                correlation_id,
                SessionEventKind::ResourceRejected(ResourceRejected {
                    node_id,
                    selected_resource: selected,
                    trust_after,
                }),
            );
            self.audio.play_cue(CueKind::ResourceRejected);
            self.refresh_ambient();
            self.enforce_trust_floor(correlation_id);
            return Ok(());
        }

        let gated = gate::requires_resource(interior);
        let trust_before = active.state.trust;
        let trust_after = if gated {
            Trust::MAX
        } else {
            trust_before.apply_impact(option.trust_impact)
        };
        let was_optimal = is_optimal(interior, option);
        active.state.trust = trust_after;
        active.state.history.push(ChoiceRecord {
            node_id: node_id.clone(),
            choice_text: option.text.clone(),
            was_optimal,
            trust_change: i32::from(trust_after.value()) - i32::from(trust_before.value()),
            npc_emotion: interior.npc_emotion,
        });
        let feedback = coach::classify(option.trust_impact, self.rng.as_mut());
        let cue = match feedback.category {
            FeedbackCategory::Positive => CueKind::Positive,
            FeedbackCategory::Negative => CueKind::Negative,
            FeedbackCategory::Neutral => CueKind::Select,
        };
        active.ui.coach = Some(feedback);
        active.ui.inner_thought.clone_from(&option.inner_thought);
        let outcome = if gated {
            ReadingOutcome::BeginHandoff
        } else {
            ReadingOutcome::Advance(option.next.clone())
        };
        let text = option.text.clone();

        self.emit(
            correlation_id,
            SessionEventKind::OptionChosen(OptionChosen {
                node_id,
                choice_text: text.clone(),
                was_optimal,
                trust_before: trust_before.value(),
                trust_after: trust_after.value(),
            }),
        );
        self.speak(&text, &VoiceProfile::player());
        self.audio.play_cue(cue);
        self.refresh_ambient();
        self.timers.cancel_scope(TimerScope::Coach);
        self.timers
            .schedule(COACH_DISPLAY_MS, TimerScope::Coach, TimedEffect::DismissCoach);
        self.timers.schedule(
            READING_DELAY_MS,
            TimerScope::Reading,
            TimedEffect::FinishReading(outcome),
        );
        self.enforce_trust_floor(correlation_id);
        Ok(())
    }

    /// Records the player's referral resource choice. The gate itself is
    /// evaluated when an option is submitted.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPhase` outside dialogue,
    /// `DomainError::InputSuppressed` while a line is being spoken and
    /// `DomainError::Validation` for a resource the catalog does not list.
    pub fn select_resource(
        &mut self,
        resource_id: ResourceId,
        correlation_id: Uuid,
    ) -> Result<(), DomainError> {
        self.require_phase(Phase::Dialogue)?;
        if self.is_reading() {
            return Err(DomainError::InputSuppressed);
        }
        if !self.catalog.is_known_resource(&resource_id) {
            return Err(DomainError::Validation(format!(
                "unknown resource: {resource_id}"
            )));
        }
        let active = self
            .active
            .as_mut()
            .ok_or_else(|| no_session(Phase::Dialogue))?;
        active.state.selected_resource = Some(resource_id.clone());
        self.emit(
            correlation_id,
            SessionEventKind::ResourceSelected(ResourceSelected { resource_id }),
        );
        self.audio.play_cue(CueKind::ResourceSelected);
        Ok(())
    }

    /// Looks around for the scenario's clue. Returns `true` if it was found
    /// just now.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPhase` outside approach and dialogue and
    /// `DomainError::InputSuppressed` while a line is being spoken.
    pub fn investigate_clue(&mut self, correlation_id: Uuid) -> Result<bool, DomainError> {
        let phase = self.phase();
        if !matches!(phase, Phase::Approach | Phase::Dialogue) {
            return Err(DomainError::InvalidPhase {
                expected: Phase::Dialogue.as_str(),
                actual: phase.as_str(),
            });
        }
        if phase == Phase::Dialogue && self.is_reading() {
            return Err(DomainError::InputSuppressed);
        }

        let active = self
            .active
            .as_mut()
            .ok_or_else(|| no_session(Phase::Dialogue))?;
        let scenario = Arc::clone(&active.scenario);
        let Some(clue) = scenario.clue.as_ref() else {
            return Ok(false);
        };
        if !clues::discover(&mut active.state.discovered_clues, clue.id.clone()) {
            return Ok(false);
        }
        active.ui.discovery = Some(clue.description.clone());
        if phase == Phase::Dialogue {
            let node = resolve_node(&scenario, &active.state.current_node_id);
            if let Some(interior) = node.as_interior() {
                active.offered = visible_option_indices(
                    interior,
                    &active.state.discovered_clues,
                    self.rng.as_mut(),
                );
            }
        }

        self.emit(
            correlation_id,
            SessionEventKind::ClueDiscovered(ClueDiscovered {
                clue_id: clue.id.clone(),
            }),
        );
        self.audio.play_cue(CueKind::ClueFound);
        self.timers.cancel_scope(TimerScope::Discovery);
        self.timers.schedule(
            DISCOVERY_DISPLAY_MS,
            TimerScope::Discovery,
            TimedEffect::DismissDiscovery,
        );
        Ok(true)
    }

    /// Enters one digit on the dial pad.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPhase` outside the hand-off and
    /// `DomainError::Validation` for a non-digit or a full buffer.
    pub fn press_digit(&mut self, digit: char) -> Result<(), DomainError> {
        self.require_phase(Phase::Handoff)?;
        if !digit.is_ascii_digit() {
            return Err(DomainError::Validation(format!("'{digit}' is not a digit")));
        }
        let active = self
            .active
            .as_mut()
            .ok_or_else(|| no_session(Phase::Handoff))?;
        if active.ui.dial_buffer.len() >= MAX_DIAL_DIGITS {
            return Err(DomainError::Validation("the dial pad is full".to_owned()));
        }
        active.ui.dial_buffer.push(digit);
        self.audio.play_cue(CueKind::KeyPress);
        Ok(())
    }

    /// Dials whatever is in the buffer. The buffer is cleared either way.
    /// Returns whether the number was accepted.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPhase` outside the hand-off.
    pub fn submit_dial(&mut self, correlation_id: Uuid) -> Result<bool, DomainError> {
        self.require_phase(Phase::Handoff)?;
        let active = self
            .active
            .as_mut()
            .ok_or_else(|| no_session(Phase::Handoff))?;
        let code = std::mem::take(&mut active.ui.dial_buffer);
        if is_accepted_code(&code) {
            self.begin_resolution(code, correlation_id);
            return Ok(true);
        }
        info!(code = %code, "dialed number rejected");
        self.emit(
            correlation_id,
            SessionEventKind::CodeRejected(CodeRejected { code }),
        );
        self.audio.play_cue(CueKind::WrongCode);
        Ok(false)
    }

    /// Replaces the buffer with `digits` and dials it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPhase` outside the hand-off and
    /// `DomainError::Validation` if `digits` is empty, too long or contains
    /// anything but ASCII digits.
    pub fn dial_code(&mut self, digits: &str, correlation_id: Uuid) -> Result<bool, DomainError> {
        self.require_phase(Phase::Handoff)?;
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::Validation(
                "a dial code is one or more digits".to_owned(),
            ));
        }
        if digits.len() > MAX_DIAL_DIGITS {
            return Err(DomainError::Validation(format!(
                "a dial code has at most {MAX_DIAL_DIGITS} digits"
            )));
        }
        if let Some(active) = self.active.as_mut() {
            active.ui.dial_buffer.clear();
        }
        for digit in digits.chars() {
            self.press_digit(digit)?;
        }
        self.submit_dial(correlation_id)
    }

    /// Leaves the current session for the menu, cancelling every pending
    /// timer. Does nothing at the menu.
    pub fn abandon(&mut self, correlation_id: Uuid) {
        let reason = match self.phase() {
            Phase::Menu => return,
            Phase::End => MenuReason::Dismissed,
            _ => MenuReason::Abandoned,
        };
        self.teardown(correlation_id, reason);
    }

    /// Moves virtual time forward by `elapsed_ms`, firing due timers in
    /// order. Timers scheduled by a firing timer fire within the same call
    /// if they fall inside the window.
    pub fn advance_time(&mut self, elapsed_ms: u64, correlation_id: Uuid) {
        let target = self.timers.now_ms().saturating_add(elapsed_ms);
        while let Some(timer) = self.timers.pop_due(target) {
            self.fire(timer, correlation_id);
        }
        self.timers.settle(target);
    }

    /// Replaces the player's settings, applying music and narration changes
    /// immediately.
    pub fn apply_settings(&mut self, settings: Settings) {
        let music_was_enabled = self.settings.music_enabled;
        self.settings = settings;
        if !self.settings.narration_enabled {
            self.narrator.stop_speaking();
        }
        if !self.settings.music_enabled {
            self.audio.stop_music();
        } else if !music_was_enabled {
            self.refresh_ambient();
        }
    }

    fn require_phase(&self, expected: Phase) -> Result<(), DomainError> {
        let actual = self.phase();
        if actual == expected {
            Ok(())
        } else {
            Err(DomainError::InvalidPhase {
                expected: expected.as_str(),
                actual: actual.as_str(),
            })
        }
    }

    fn emit(&mut self, correlation_id: Uuid, kind: SessionEventKind) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        active.sequence += 1;
        let event = SessionEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: kind.event_type().to_owned(),
                aggregate_id: active.state.session_id,
                sequence_number: active.sequence,
                correlation_id,
                causation_id: correlation_id,
                occurred_at: self.clock.now(),
            },
            kind,
        };
        self.uncommitted_events.push(event);
    }

    fn speak(&self, text: &str, voice: &VoiceProfile) {
        if !self.settings.narration_enabled || text.is_empty() {
            return;
        }
        let mut voice = voice.clone();
        voice.rate *= self.settings.voice_rate;
        self.narrator.speak(text, &voice);
    }

    fn refresh_ambient(&self) {
        if !self.settings.music_enabled {
            return;
        }
        if let Some(active) = self.active.as_ref() {
            self.audio
                .start_ambient(active.scenario.ambient, active.state.trust.value());
        }
    }

    fn fire(&mut self, timer: FiredTimer, correlation_id: Uuid) {
        debug!(due_ms = timer.due_ms, scope = ?timer.scope, "timer fired");
        match timer.effect {
            TimedEffect::ProximityPoll => self.poll_proximity(correlation_id),
            TimedEffect::FinishReading(outcome) => self.finish_reading(outcome, correlation_id),
            TimedEffect::CutsceneMarker(stage) => self.advance_cutscene(stage, correlation_id),
            TimedEffect::ReturnToMenu => {
                self.teardown(correlation_id, MenuReason::EndScreenTimeout);
            }
            TimedEffect::DismissCoach => {
                if let Some(active) = self.active.as_mut() {
                    active.ui.coach = None;
                }
            }
            TimedEffect::DismissDiscovery => {
                if let Some(active) = self.active.as_mut() {
                    active.ui.discovery = None;
                }
            }
        }
    }

    fn poll_proximity(&mut self, correlation_id: Uuid) {
        let Some(active) = self.active.as_ref() else {
            return;
        };
        if active.state.phase != Phase::Approach {
            return;
        }
        if active.state.within_reach() {
            self.begin_dialogue(correlation_id);
        } else {
            self.timers.schedule(
                PROXIMITY_POLL_MS,
                TimerScope::Approach,
                TimedEffect::ProximityPoll,
            );
        }
    }

    fn begin_dialogue(&mut self, correlation_id: Uuid) {
        self.timers.cancel_scope(TimerScope::Approach);
        let Some(active) = self.active.as_mut() else {
            return;
        };
        active.state.phase = Phase::Dialogue;
        let scenario_id = active.state.scenario_id.clone();
        let start_node_id = active.scenario.start_node_id.clone();
        self.emit(
            correlation_id,
            SessionEventKind::ConversationStarted(ConversationStarted { scenario_id }),
        );
        self.enter_node(start_node_id, correlation_id);
    }

    fn enter_node(&mut self, node_id: NodeId, correlation_id: Uuid) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let scenario = Arc::clone(&active.scenario);
        let node = resolve_node(&scenario, &node_id);
        active.state.current_node_id = node_id.clone();
        active.ui.inner_thought = None;
        active.offered = match node.as_interior() {
            Some(interior) => visible_option_indices(
                interior,
                &active.state.discovered_clues,
                self.rng.as_mut(),
            ),
            None => Vec::new(),
        };
        let trust = active.state.trust.value();

        self.emit(
            correlation_id,
            SessionEventKind::NodeEntered(NodeEntered { node_id, trust }),
        );
        if let Some(interior) = node.as_interior() {
            self.speak(&interior.npc_text, &scenario.npc_voice);
        }
        self.check_end_guard(correlation_id);
    }

    fn finish_reading(&mut self, outcome: ReadingOutcome, correlation_id: Uuid) {
        if self.phase() != Phase::Dialogue {
            return;
        }
        match outcome {
            ReadingOutcome::Advance(next) => self.enter_node(next, correlation_id),
            ReadingOutcome::BeginHandoff => self.begin_handoff(correlation_id),
        }
    }

    fn begin_handoff(&mut self, correlation_id: Uuid) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        active.state.phase = Phase::Handoff;
        active.offered.clear();
        active.ui.inner_thought = None;
        active.ui.dial_buffer.clear();
        let resource_id = active.state.selected_resource.clone();
        self.emit(
            correlation_id,
            SessionEventKind::HandoffStarted(HandoffStarted { resource_id }),
        );
    }

    fn begin_resolution(&mut self, code: String, correlation_id: Uuid) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        active.state.phase = Phase::Resolution;
        active.ui.cutscene = Some(CutsceneStage::Dialing);
        info!(code = %code, "call placed");
        self.emit(
            correlation_id,
            SessionEventKind::ResolutionStarted(ResolutionStarted { code }),
        );
        self.audio.stop_music();
        for (offset, stage) in CutsceneStage::SCHEDULE {
            self.timers.schedule(
                offset,
                TimerScope::Cutscene,
                TimedEffect::CutsceneMarker(stage),
            );
        }
    }

    fn advance_cutscene(&mut self, stage: CutsceneStage, correlation_id: Uuid) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.state.phase != Phase::Resolution {
            return;
        }
        active.ui.cutscene = Some(stage);
        let scenario = Arc::clone(&active.scenario);
        self.emit(
            correlation_id,
            SessionEventKind::CutsceneAdvanced(CutsceneAdvanced { stage }),
        );
        match stage {
            CutsceneStage::Dialing => {}
            CutsceneStage::Ringing => self.audio.play_cue(CueKind::Ringing),
            CutsceneStage::Connected => {
                self.audio.play_cue(CueKind::Connected);
                self.speak(COUNSELOR_GREETING, &VoiceProfile::counselor());
            }
            CutsceneStage::Handover => {
                self.speak(&scenario.handover_line, &scenario.npc_voice);
            }
            CutsceneStage::Complete => {
                if let Some(active) = self.active.as_mut() {
                    active.state.phase = Phase::Dialogue;
                    active.ui.cutscene = None;
                }
                self.enter_node(NodeId::new(SUCCESS_NODE_ID), correlation_id);
            }
        }
    }

    /// Forces the failure ending once trust is gone, cancelling any pending
    /// advance.
    fn enforce_trust_floor(&mut self, correlation_id: Uuid) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if !active.state.trust.is_depleted()
            || matches!(active.state.phase, Phase::Approach | Phase::End)
            || active.state.current_node_id == FAILURE_NODE_ID
        {
            return;
        }
        active.state.phase = Phase::Dialogue;
        let node_id = active.state.current_node_id.clone();
        self.timers.cancel_scope(TimerScope::Reading);
        self.timers.cancel_scope(TimerScope::Cutscene);
        self.narrator.stop_speaking();
        info!(node_id = %node_id, "trust depleted");
        self.emit(
            correlation_id,
            SessionEventKind::TrustDepleted(TrustDepleted { node_id }),
        );
        self.enter_node(NodeId::new(FAILURE_NODE_ID), correlation_id);
    }

    /// Enters the end screen whenever the current node is terminal.
    fn check_end_guard(&mut self, correlation_id: Uuid) {
        let Some(active) = self.active.as_ref() else {
            return;
        };
        if matches!(active.state.phase, Phase::Approach | Phase::End) {
            return;
        }
        let scenario = Arc::clone(&active.scenario);
        let node_id = active.state.current_node_id.clone();
        let node = resolve_node(&scenario, &node_id);
        if let Some(terminal) = node.as_terminal() {
            self.enter_end(node_id, terminal, correlation_id);
        }
    }

    fn enter_end(&mut self, node_id: NodeId, terminal: &TerminalNode, correlation_id: Uuid) {
        self.timers.cancel_scope(TimerScope::Approach);
        self.timers.cancel_scope(TimerScope::Reading);
        self.timers.cancel_scope(TimerScope::Cutscene);
        let Some(active) = self.active.as_mut() else {
            return;
        };
        active.state.phase = Phase::End;
        active.offered.clear();
        active.ui.cutscene = None;
        active.ui.dial_buffer.clear();
        let scenario_id = active.state.scenario_id.clone();
        let final_trust = active.state.trust.value();

        info!(
            scenario_id = %scenario_id,
            outcome = ?terminal.result,
            final_trust,
            "scenario ended"
        );
        self.emit(
            correlation_id,
            SessionEventKind::ScenarioEnded(ScenarioEnded {
                node_id,
                outcome: terminal.result,
                final_trust,
            }),
        );
        self.narrator.stop_speaking();
        self.speak(&terminal.message, &VoiceProfile::narrator());
        self.audio.stop_music();
        match terminal.result {
            Outcome::Success => {
                self.audio.play_cue(CueKind::Success);
                let first_completion = self.ledger.record_completion(scenario_id.clone());
                self.emit(
                    correlation_id,
                    SessionEventKind::ScenarioCompleted(ScenarioCompleted {
                        scenario_id,
                        first_completion,
                    }),
                );
            }
            Outcome::Failure => self.audio.play_cue(CueKind::Failure),
        }
        self.timers
            .schedule(END_DWELL_MS, TimerScope::EndScreen, TimedEffect::ReturnToMenu);
    }

    fn teardown(&mut self, correlation_id: Uuid, reason: MenuReason) {
        let Some(active) = self.active.as_ref() else {
            return;
        };
        let scenario_id = active.state.scenario_id.clone();
        self.emit(
            correlation_id,
            SessionEventKind::ReturnedToMenu(ReturnedToMenu {
                scenario_id: scenario_id.clone(),
                reason,
            }),
        );
        let cancelled = self.timers.cancel_all();
        self.narrator.stop_speaking();
        self.audio.stop_music();
        self.active = None;
        info!(scenario_id = %scenario_id, ?reason, cancelled, "returned to menu");
    }
}
