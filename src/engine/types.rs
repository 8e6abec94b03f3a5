//! Engine snapshot types for status reporting and diagnostics

use crate::alert::RejectReason;
use crate::outcome::HistoryRecord;
use crate::pattern::ThresholdConfig;
use rust_decimal::Decimal;
use serde::Serialize;

/// Read-only view of the engine for a status reporter
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub heat: Decimal,
    pub threshold_multiplier: Decimal,
    pub thresholds: ThresholdConfig,
    pub universe_size: usize,
    pub open_predictions: usize,
    pub closed_total: u64,
    pub overall_win_rate: Option<Decimal>,
    pub last_batch_win_rate: Option<Decimal>,
    pub alerts_in_flood_window: usize,
    pub history: Vec<HistoryRecord>,
}

/// Per-symbol "why didn't this fire" view
#[derive(Debug, Clone, Serialize)]
pub struct SymbolDiagnostics {
    pub symbol: String,
    pub sample_count: usize,
    /// Percent change over the heat lookback
    pub short_change_pct: Decimal,
    /// Percent change over the rank reference window
    pub rank_change_pct: Decimal,
    pub rank: Option<usize>,
    pub step_predicate: bool,
    pub sequence_predicate: bool,
    pub cooldown_remaining_secs: Option<i64>,
    pub open_prediction: bool,
    /// Most recent gatekeeper rejection for this symbol, if any
    pub last_block: Option<RejectReason>,
}
