//! Adaptive threshold control
//!
//! Bang-bang controller that retunes detection thresholds from batches of
//! closed prediction outcomes.

mod controller;

pub use controller::{AdaptiveConfig, AdaptiveController, Adjustment};
