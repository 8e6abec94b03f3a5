//! Pattern detection types and tunable thresholds

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Pattern family that produced a firing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternKind {
    /// Two consecutive equal-or-greater percentage jumps
    Step,
    /// Ordered multi-step climb, the rarer high-conviction signal
    StrongSequence,
}

impl PatternKind {
    /// Short tag used in alert text and history records
    pub fn tag(&self) -> &'static str {
        match self {
            PatternKind::Step => "double-step",
            PatternKind::StrongSequence => "strong-surge",
        }
    }
}

/// A single edge-triggered pattern detection for one symbol
#[derive(Debug, Clone)]
pub struct Firing {
    pub symbol: String,
    pub kind: PatternKind,
    pub detected_at: DateTime<Utc>,
}

/// Last observed truth value of each predicate, per symbol
///
/// Used purely for edge-triggering: a firing is reported only on the
/// false-to-true transition of a predicate.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternState {
    pub step_was_true: bool,
    pub sequence_was_true: bool,
}

/// Detection thresholds, read by the matcher every cycle and written only
/// by the adaptive controller
///
/// Always accessed under the engine lock so readers see one consistent
/// snapshot.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ThresholdConfig {
    /// Required percent size of each step-pattern leg
    #[serde(default = "default_step_pct")]
    pub step_pct: Decimal,

    /// Ordered percent steps for the strong-sequence pattern
    #[serde(default = "default_strong_sequence")]
    pub strong_sequence: Vec<Decimal>,

    /// Window the step pattern scans (seconds)
    #[serde(default = "default_step_window_secs")]
    pub step_window_secs: u64,

    /// Window the strong-sequence pattern scans (seconds)
    #[serde(default = "default_sequence_window_secs")]
    pub sequence_window_secs: u64,
}

fn default_step_pct() -> Decimal {
    dec!(1.0)
}
fn default_strong_sequence() -> Vec<Decimal> {
    vec![dec!(2.0), dec!(1.0), dec!(2.0)]
}
fn default_step_window_secs() -> u64 {
    180
}
fn default_sequence_window_secs() -> u64 {
    420
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            step_pct: default_step_pct(),
            strong_sequence: default_strong_sequence(),
            step_window_secs: default_step_window_secs(),
            sequence_window_secs: default_sequence_window_secs(),
        }
    }
}

/// Safety bounds the adaptive controller clamps against on every write
#[derive(Debug, Clone, Deserialize)]
pub struct ThresholdBounds {
    #[serde(default = "default_step_pct_min")]
    pub step_pct_min: Decimal,
    #[serde(default = "default_step_pct_max")]
    pub step_pct_max: Decimal,
    #[serde(default = "default_sequence_first_min")]
    pub sequence_first_min: Decimal,
    #[serde(default = "default_sequence_first_max")]
    pub sequence_first_max: Decimal,
}

fn default_step_pct_min() -> Decimal {
    dec!(0.5)
}
fn default_step_pct_max() -> Decimal {
    dec!(2.5)
}
fn default_sequence_first_min() -> Decimal {
    dec!(1.0)
}
fn default_sequence_first_max() -> Decimal {
    dec!(4.0)
}

impl Default for ThresholdBounds {
    fn default() -> Self {
        Self {
            step_pct_min: default_step_pct_min(),
            step_pct_max: default_step_pct_max(),
            sequence_first_min: default_sequence_first_min(),
            sequence_first_max: default_sequence_first_max(),
        }
    }
}
