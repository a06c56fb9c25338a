//! Session state published to the display layer

use super::scoring::{Generation, ScoringError, ScoringResponse};
use crate::record::ObservationRecord;

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing requested yet
    Idle,
    /// First request in flight, no result or error to show
    PendingFirstLoad,
    /// Showing an accepted result
    Ready,
    /// Last accepted completion was a failure
    ErrorDisplayed,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::PendingFirstLoad => "loading",
            Phase::Ready => "ready",
            Phase::ErrorDisplayed => "error",
        }
    }
}

/// A failed scoring call that was accepted as the current error
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringFailure {
    pub generation: Generation,
    pub error: ScoringError,
}

/// Everything the display layer needs about the live simulation
///
/// Invariants:
/// - `accepted_result`, when present, has `generation == accepted_generation`
/// - `accepted_generation` never decreases except on a full reset
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    /// Latest edited record (may be ahead of what was scored)
    pub input: ObservationRecord,
    pub phase: Phase,
    pub pending_generation: Option<Generation>,
    /// Generation of `accepted_result`; 0 before the first success
    pub accepted_generation: Generation,
    pub accepted_result: Option<ScoringResponse>,
    pub last_error: Option<ScoringFailure>,
}

impl SimulationState {
    pub fn new(input: ObservationRecord) -> Self {
        Self {
            input,
            phase: Phase::Idle,
            pending_generation: None,
            accepted_generation: 0,
            accepted_result: None,
            last_error: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending_generation.is_some()
    }
}
