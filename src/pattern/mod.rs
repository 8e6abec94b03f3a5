//! Pattern detection
//!
//! Edge-triggered detection of two short-lived momentum pattern families
//! over a sliding window of the price buffer:
//! - step pattern: two consecutive equal-or-greater percentage jumps
//! - strong sequence: an ordered list of percentage steps reached in order

mod matcher;
mod types;

pub use matcher::{sequence_predicate, step_predicate, PatternMatcher};
pub use types::{Firing, PatternKind, PatternState, ThresholdBounds, ThresholdConfig};
