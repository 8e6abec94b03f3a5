//! Prediction and history record types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome tracking configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutcomeConfig {
    /// Best-change percent that scores a prediction as a hit
    #[serde(default = "default_target_pct")]
    pub target_pct: Decimal,

    /// Follow-up window after an alert during which best performance is
    /// measured (seconds)
    #[serde(default = "default_follow_up_secs")]
    pub follow_up_secs: u64,

    /// Capacity of the closed-record ring buffer
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

fn default_target_pct() -> Decimal {
    dec!(2.0)
}
fn default_follow_up_secs() -> u64 {
    600
}
fn default_history_capacity() -> usize {
    200
}

impl Default for OutcomeConfig {
    fn default() -> Self {
        Self {
            target_pct: default_target_pct(),
            follow_up_secs: default_follow_up_secs(),
            history_capacity: default_history_capacity(),
        }
    }
}

/// Terminal status of a closed prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Hit,
    Miss,
}

/// A pending prediction opened by an accepted alert
///
/// `high_water_price` only ever moves up; the prediction is scored on its
/// best performance within the follow-up window, not on when the target
/// was first crossed.
#[derive(Debug, Clone)]
pub struct OpenPrediction {
    pub id: Uuid,
    pub symbol: String,
    pub tag: &'static str,
    pub open_time: DateTime<Utc>,
    pub start_price: Decimal,
    pub high_water_price: Decimal,
}

impl OpenPrediction {
    pub fn new(
        symbol: impl Into<String>,
        tag: &'static str,
        open_time: DateTime<Utc>,
        start_price: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: symbol.into(),
            tag,
            open_time,
            start_price,
            high_water_price: start_price,
        }
    }

    /// Best percent change seen so far
    pub fn best_change_pct(&self) -> Decimal {
        if self.start_price <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        (self.high_water_price - self.start_price) / self.start_price * Decimal::from(100)
    }
}

/// An immutable closed prediction
#[derive(Debug, Clone, Serialize)]
pub struct HistoryRecord {
    pub id: Uuid,
    pub symbol: String,
    pub tag: &'static str,
    pub status: OutcomeStatus,
    pub target_pct: Decimal,
    pub best_change_pct: Decimal,
    pub close_time: DateTime<Utc>,
}

impl HistoryRecord {
    pub fn is_hit(&self) -> bool {
        self.status == OutcomeStatus::Hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_change_pct() {
        let mut pred = OpenPrediction::new("BTC-EUR", "double-step", Utc::now(), dec!(100));
        assert_eq!(pred.best_change_pct(), Decimal::ZERO);

        pred.high_water_price = dec!(102.5);
        assert_eq!(pred.best_change_pct(), dec!(2.5));
    }
}
