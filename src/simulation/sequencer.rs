//! Generation-tagged scoring requests
//!
//! Every request gets the next generation number and runs on its own spawned
//! task; completions come back over a channel in whatever order the network
//! delivers them. `on_response()` is the single authority on whether a
//! completion may be applied:
//!
//! - accepted iff its generation is not older than the newest generation
//!   already applied (success or failure)
//! - otherwise superseded and dropped
//!
//! Nothing is ever cancelled. Late responses are simply ignored.

use super::scoring::{Generation, ScoredProfile, Scorer, ScoringError};
use crate::record::ObservationRecord;
use std::sync::Arc;
use tokio::sync::mpsc;

/// A finished scoring call, successful or not
#[derive(Debug)]
pub struct Completion {
    pub generation: Generation,
    pub outcome: Result<ScoredProfile, ScoringError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    Accepted,
    /// A generation at or above `current` was already applied (or a reset
    /// discarded everything up to it)
    Superseded { current: Generation },
}

pub struct RequestSequencer {
    scorer: Arc<dyn Scorer>,
    tx: mpsc::UnboundedSender<Completion>,
    /// Last generation handed out; 0 before the first request
    last_issued: Generation,
    /// Newest generation applied so far
    settled: Generation,
    /// Completions below this generation are dropped
    floor: Generation,
}

impl RequestSequencer {
    /// Create a sequencer and the receiver its completions arrive on
    pub fn new(scorer: Arc<dyn Scorer>) -> (Self, mpsc::UnboundedReceiver<Completion>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sequencer = Self {
            scorer,
            tx,
            last_issued: 0,
            settled: 0,
            floor: 0,
        };
        (sequencer, rx)
    }

    /// Tag `record` with the next generation and dispatch the scoring call
    ///
    /// Returns immediately; the completion arrives on the channel. Must be
    /// called inside a tokio runtime.
    pub fn issue(&mut self, record: ObservationRecord) -> Generation {
        self.last_issued += 1;
        let generation = self.last_issued;
        let scorer = self.scorer.clone();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let outcome = scorer.score(&record).await;
            // receiver gone means the session is over; nothing left to update
            let _ = tx.send(Completion { generation, outcome });
        });

        log::debug!("Issued scoring request gen={}", generation);
        generation
    }

    /// Decide whether a completion for `generation` may be applied
    pub fn on_response(&mut self, generation: Generation) -> Acceptance {
        if generation < self.floor {
            return Acceptance::Superseded {
                current: self.floor.max(self.settled),
            };
        }

        self.settled = self.settled.max(generation);
        self.floor = generation;
        Acceptance::Accepted
    }

    /// Generation still awaited, if the newest request has not settled
    pub fn pending(&self) -> Option<Generation> {
        (self.last_issued > self.settled).then_some(self.last_issued)
    }

    pub fn last_issued(&self) -> Generation {
        self.last_issued
    }

    /// Newest generation applied so far (0 if none)
    pub fn settled(&self) -> Generation {
        self.settled
    }

    /// Drop every request issued so far; later completions for them are superseded
    ///
    /// Generation numbers keep counting, so nothing is ever reused.
    pub fn discard_outstanding(&mut self) {
        self.floor = self.last_issued + 1;
        self.settled = self.last_issued;
    }
}
