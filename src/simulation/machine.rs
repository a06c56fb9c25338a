//! Simulation state machine
//!
//! Owns the session's `SimulationState` and is the only code that writes it.
//! Edits land on `input` immediately and re-arm the debounce; a debounce
//! delivery issues a scoring request when the input is complete; completions
//! go through the sequencer's acceptance rule before touching the result.
//!
//! ```text
//! edit() ──► input ──► DebounceScheduler ──► on_debounce_fired()
//!                                                  │ (complete input only)
//!                                                  ▼
//!                           RequestSequencer::issue() ──► Scorer (spawned)
//!                                                  │
//! on_completion() ◄── Completion (any order) ◄─────┘
//!     │ Accepted → result / error
//!     └ Superseded → dropped
//! ```

use super::debounce::{DebounceScheduler, Fired};
use super::scoring::{Scorer, ScoringResponse};
use super::sequencer::{Acceptance, Completion, RequestSequencer};
use super::state::{Phase, ScoringFailure, SimulationState};
use crate::profile;
use crate::record::{EditValue, ObservationRecord};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Duration;

/// Tuning for a simulation session
#[derive(Debug, Clone)]
pub struct SimulationSettings {
    /// Quiet period before an edit burst turns into a request
    pub quiet_period: Duration,
    /// Attributes a record must hold before it is scored
    pub required_attributes: Vec<String>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            quiet_period: Duration::from_millis(300),
            required_attributes: profile::required_attributes(),
        }
    }
}

/// Channels the machine's helpers report back on
///
/// Kept apart from the machine so an event loop can await them while the
/// machine itself stays free to be borrowed by the handlers.
pub struct SimulationInbox {
    pub fired: mpsc::UnboundedReceiver<Fired<ObservationRecord>>,
    pub completions: mpsc::UnboundedReceiver<Completion>,
}

pub struct SimulationMachine {
    state: SimulationState,
    debounce: DebounceScheduler<ObservationRecord>,
    sequencer: RequestSequencer,
    settings: SimulationSettings,
    torn_down: bool,
}

impl SimulationMachine {
    pub fn new(input: ObservationRecord, scorer: Arc<dyn Scorer>, settings: SimulationSettings) -> (Self, SimulationInbox) {
        let (debounce, fired) = DebounceScheduler::new();
        let (sequencer, completions) = RequestSequencer::new(scorer);

        let machine = Self {
            state: SimulationState::new(input),
            debounce,
            sequencer,
            settings,
            torn_down: false,
        };
        (machine, SimulationInbox { fired, completions })
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Score the starting record right away, skipping the debounce
    ///
    /// Does nothing if the starting record is incomplete.
    pub fn start(&mut self) {
        if self.torn_down {
            return;
        }
        let input = self.state.input.clone();
        self.submit(input);
    }

    /// Merge one attribute into `input` and re-arm the debounce
    pub fn edit(&mut self, attribute: &str, value: EditValue) {
        if self.torn_down {
            log::debug!("Ignoring edit of {} after teardown", attribute);
            return;
        }

        profile::apply_edit(&mut self.state.input, attribute, value);

        self.debounce.schedule(self.state.input.clone(), self.settings.quiet_period);
    }

    /// Handle a debounce delivery
    ///
    /// Superseded deliveries and incomplete records issue nothing; an
    /// incomplete record is a normal mid-edit state, not an error.
    pub fn on_debounce_fired(&mut self, fired: Fired<ObservationRecord>) {
        if self.torn_down {
            return;
        }
        if let Some(record) = self.debounce.take_fired(fired) {
            self.submit(record);
        }
    }

    /// Apply a scoring completion if it is still current
    pub fn on_completion(&mut self, completion: Completion) -> Acceptance {
        let generation = completion.generation;

        if self.torn_down {
            log::debug!("Dropping completion gen={} after teardown", generation);
            return Acceptance::Superseded {
                current: self.sequencer.settled(),
            };
        }

        let acceptance = self.sequencer.on_response(generation);
        if let Acceptance::Superseded { current } = acceptance {
            log::debug!("Stale discard: completion gen={} (current gen={})", generation, current);
            return acceptance;
        }

        match completion.outcome {
            Ok(profile) => {
                log::info!(
                    "✅ Score gen={} probability={:.3} ({})",
                    generation,
                    profile.outcome.probability,
                    profile.outcome.risk_label()
                );
                self.state.accepted_generation = generation;
                self.state.accepted_result = Some(ScoringResponse::new(generation, profile));
                self.state.last_error = None;
                self.state.phase = Phase::Ready;
            }
            Err(error) => {
                log::warn!("⚠️  Scoring failed gen={}: {}", generation, error);
                self.state.last_error = Some(ScoringFailure { generation, error });
                self.state.phase = Phase::ErrorDisplayed;
            }
        }

        self.state.pending_generation = self.sequencer.pending();
        acceptance
    }

    /// Back to the default profile with nothing pending or displayed
    ///
    /// Responses to requests issued before the reset are discarded when they
    /// arrive; generation numbers keep counting.
    pub fn reset(&mut self, input: ObservationRecord) {
        self.debounce.cancel();
        self.sequencer.discard_outstanding();
        self.state = SimulationState::new(input);
        log::info!("🔄 Simulation reset (next gen={})", self.sequencer.last_issued() + 1);
    }

    /// Stop reacting to anything; in-flight calls are left to finish and be ignored
    pub fn teardown(&mut self) {
        self.debounce.cancel();
        self.torn_down = true;
        log::info!("Simulation torn down");
    }

    fn submit(&mut self, record: ObservationRecord) {
        let missing = record.missing_attributes(&self.settings.required_attributes);
        if !missing.is_empty() {
            log::debug!("Withholding request: {} required attribute(s) missing: {:?}", missing.len(), missing);
            return;
        }

        if profile::totals_look_low(&record) {
            log::warn!("TotalCharges seems low for the given tenure and MonthlyCharges");
        }

        let first = self.state.accepted_result.is_none() && self.state.last_error.is_none();
        self.sequencer.issue(record);
        self.state.pending_generation = self.sequencer.pending();
        if first {
            self.state.phase = Phase::PendingFirstLoad;
        }
    }
}
