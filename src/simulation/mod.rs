//! # Live Simulation Pipeline
//!
//! Converts a rapid stream of profile edits into a minimal, correctly ordered
//! sequence of remote scoring calls. The published state always reflects the
//! newest accepted response, never a stale one.
//!
//! ## Architecture
//!
//! ```text
//! SimulationHandle::edit()
//!     ↓ mpsc
//! simulation_task (single writer)
//!     ↓
//! SimulationMachine ── DebounceScheduler (trailing edge, lossy)
//!     ↓
//! RequestSequencer (generation tags, spawned Scorer calls)
//!     ↓
//! Completion (any order) → acceptance rule → SimulationState
//!     ↓
//! SharedSnapshot (Arc<RwLock<_>>) → display layer
//! ```
//!
//! ## Module Organization
//!
//! - `scoring` - Scorer trait, response types, HTTP client
//! - `debounce` - Trailing-edge debounce with ticketed deliveries
//! - `sequencer` - Generation assignment and acceptance
//! - `state` - Published session state
//! - `machine` - State machine tying the pieces together
//! - `runtime` - Event loop task and display-side handle

pub mod debounce;
pub mod machine;
pub mod runtime;
pub mod scoring;
pub mod sequencer;
pub mod state;

pub use debounce::{DebounceScheduler, Fired};
pub use machine::{SimulationInbox, SimulationMachine, SimulationSettings};
pub use runtime::{simulation_task, SharedSnapshot, SimulationCommand, SimulationHandle};
pub use scoring::{
    Generation, HttpScorer, Outcome, PredictedClass, RiskFactor, ScoredProfile, Scorer, ScoringError,
    ScoringResponse,
};
pub use sequencer::{Acceptance, Completion, RequestSequencer};
pub use state::{Phase, ScoringFailure, SimulationState};
