//! churnscope - customer churn risk dashboard core
//!
//! ```text
//! dataset file ──► dataset::load_records ──► Dashboard (aggregation)
//!                                                 │
//! keyboard ──► ui::terminal ──► SimulationHandle ─┼─► simulation_task
//!                  ▲                              │      │ debounce → sequencer → Scorer
//!                  └──────── SharedSnapshot ◄─────┴──────┘
//! ```

pub mod aggregation;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod profile;
pub mod record;
pub mod simulation;
pub mod ui;
