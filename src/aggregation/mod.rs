//! Categorical aggregation engine
//!
//! Turns a flat collection of observation records into grouped summary
//! buckets for the dashboard charts.
//!
//! ```text
//! Vec<ObservationRecord> + AggregationSpec
//!     ↓
//! aggregate() (single pass, first-seen order)
//!     ↓
//! SortPolicy (explicit per call site)
//!     ↓
//! Vec<GroupBucket> (rates computed on read)
//! ```
//!
//! Everything here is pure: no I/O, no logging above debug, no shared state.
//! Malformed specs (unknown keys) degrade to empty results instead of errors
//! since the output only feeds visualizations.

pub mod bucket;
pub mod engine;
pub mod spec;
pub mod summary;

pub use bucket::{GroupBucket, MeanBucket};
pub use engine::{aggregate, mean_by_group};
pub use spec::{AggregationSpec, PositiveRule, SortPolicy};
pub use summary::DatasetSummary;
