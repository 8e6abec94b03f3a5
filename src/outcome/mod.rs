//! Outcome tracking
//!
//! One pending prediction per accepted alert, scored against a target
//! within a fixed follow-up window, with closed records kept in a bounded
//! ring-buffer history.

mod tracker;
mod types;

pub use tracker::OutcomeTracker;
pub use types::{HistoryRecord, OpenPrediction, OutcomeConfig, OutcomeStatus};
