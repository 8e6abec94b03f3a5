//! Market heat estimation
//!
//! Smoothed fraction of the tracked universe showing above-threshold
//! short-term movement, and the threshold multiplier derived from it.

mod estimator;

pub use estimator::{HeatConfig, HeatEstimator};
