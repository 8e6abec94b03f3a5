//! Batch win-rate feedback into pattern thresholds

use crate::outcome::HistoryRecord;
use crate::pattern::{ThresholdBounds, ThresholdConfig};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// Adaptive controller configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AdaptiveConfig {
    /// Closed predictions per adaptation batch
    #[serde(default = "default_batch_size")]
    pub batch_size: u64,

    /// Win rate at or below which thresholds tighten
    #[serde(default = "default_low_water_mark")]
    pub low_water_mark: Decimal,

    /// Win rate at or above which thresholds relax
    #[serde(default = "default_high_water_mark")]
    pub high_water_mark: Decimal,

    /// Percent added or removed per adjustment
    #[serde(default = "default_adjust_step")]
    pub adjust_step: Decimal,

    /// Clamping bounds for every controller write
    #[serde(default)]
    pub bounds: ThresholdBounds,
}

fn default_batch_size() -> u64 {
    10
}
fn default_low_water_mark() -> Decimal {
    dec!(0.4)
}
fn default_high_water_mark() -> Decimal {
    dec!(0.7)
}
fn default_adjust_step() -> Decimal {
    dec!(0.1)
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            low_water_mark: default_low_water_mark(),
            high_water_mark: default_high_water_mark(),
            adjust_step: default_adjust_step(),
            bounds: ThresholdBounds::default(),
        }
    }
}

/// Direction of an applied adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    Tightened,
    Relaxed,
    Unchanged,
}

/// Nudges `step_pct` and the first strong-sequence element from batch win
/// rates
///
/// Deliberately bang-bang rather than proportional: it reacts only to being
/// clearly too lax or too strict, in fixed-size batches, so small-sample
/// noise cannot set up an oscillation.
pub struct AdaptiveController {
    config: AdaptiveConfig,
    last_adapted_at: u64,
    last_win_rate: Option<Decimal>,
}

impl AdaptiveController {
    pub fn new(config: AdaptiveConfig) -> Self {
        Self {
            config,
            last_adapted_at: 0,
            last_win_rate: None,
        }
    }

    /// Run one adaptation check
    ///
    /// `total_closed` is the tracker's lifetime close count and `recent` the
    /// most recent closed records. Nothing happens until a full batch has
    /// closed since the previous adaptation.
    pub fn maybe_adapt(
        &mut self,
        total_closed: u64,
        recent: &[HistoryRecord],
        thresholds: &mut ThresholdConfig,
    ) -> Adjustment {
        let batch = self.config.batch_size;
        if batch == 0 || total_closed < self.last_adapted_at + batch {
            return Adjustment::Unchanged;
        }
        self.last_adapted_at = total_closed;

        let take = batch.min(recent.len() as u64) as usize;
        let batch_records = &recent[recent.len() - take..];
        if batch_records.is_empty() {
            return Adjustment::Unchanged;
        }

        let hits = batch_records.iter().filter(|r| r.is_hit()).count();
        let win_rate = Decimal::from(hits) / Decimal::from(batch_records.len());
        self.last_win_rate = Some(win_rate);

        let adjustment = if win_rate <= self.config.low_water_mark {
            self.shift(thresholds, self.config.adjust_step);
            Adjustment::Tightened
        } else if win_rate >= self.config.high_water_mark {
            self.shift(thresholds, -self.config.adjust_step);
            Adjustment::Relaxed
        } else {
            Adjustment::Unchanged
        };

        tracing::info!(
            win_rate = %win_rate,
            step_pct = %thresholds.step_pct,
            ?adjustment,
            "adaptation batch evaluated"
        );

        adjustment
    }

    fn shift(&self, thresholds: &mut ThresholdConfig, delta: Decimal) {
        let b = &self.config.bounds;
        thresholds.step_pct =
            (thresholds.step_pct + delta).clamp(b.step_pct_min, b.step_pct_max);
        if let Some(first) = thresholds.strong_sequence.first_mut() {
            *first = (*first + delta).clamp(b.sequence_first_min, b.sequence_first_max);
        }
    }

    /// Win rate of the last evaluated batch
    pub fn last_win_rate(&self) -> Option<Decimal> {
        self.last_win_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::OutcomeStatus;
    use chrono::Utc;
    use uuid::Uuid;

    fn records(hits: usize, total: usize) -> Vec<HistoryRecord> {
        (0..total)
            .map(|i| HistoryRecord {
                id: Uuid::new_v4(),
                symbol: format!("S{i}-EUR"),
                tag: "double-step",
                status: if i < hits {
                    OutcomeStatus::Hit
                } else {
                    OutcomeStatus::Miss
                },
                target_pct: dec!(2.0),
                best_change_pct: dec!(1.0),
                close_time: Utc::now(),
            })
            .collect()
    }

    fn controller() -> AdaptiveController {
        AdaptiveController::new(AdaptiveConfig::default())
    }

    #[test]
    fn test_no_adaptation_before_full_batch() {
        let mut ctrl = controller();
        let mut thresholds = ThresholdConfig::default();

        let adj = ctrl.maybe_adapt(9, &records(1, 9), &mut thresholds);
        assert_eq!(adj, Adjustment::Unchanged);
        assert_eq!(thresholds.step_pct, dec!(1.0));
    }

    #[test]
    fn test_low_win_rate_tightens() {
        let mut ctrl = controller();
        let mut thresholds = ThresholdConfig::default();
        let before_sequence_tail = thresholds.strong_sequence[1..].to_vec();
        let before_windows = (thresholds.step_window_secs, thresholds.sequence_window_secs);

        // 3 hits of 10 = 0.3, below the 0.4 low-water mark
        let adj = ctrl.maybe_adapt(10, &records(3, 10), &mut thresholds);
        assert_eq!(adj, Adjustment::Tightened);
        assert_eq!(thresholds.step_pct, dec!(1.1));
        assert_eq!(thresholds.strong_sequence[0], dec!(2.1));

        // Unrelated fields untouched
        assert_eq!(thresholds.strong_sequence[1..].to_vec(), before_sequence_tail);
        assert_eq!(
            (thresholds.step_window_secs, thresholds.sequence_window_secs),
            before_windows
        );
    }

    #[test]
    fn test_high_win_rate_relaxes() {
        let mut ctrl = controller();
        let mut thresholds = ThresholdConfig::default();

        let adj = ctrl.maybe_adapt(10, &records(8, 10), &mut thresholds);
        assert_eq!(adj, Adjustment::Relaxed);
        assert_eq!(thresholds.step_pct, dec!(0.9));
    }

    #[test]
    fn test_mid_band_leaves_thresholds_alone() {
        let mut ctrl = controller();
        let mut thresholds = ThresholdConfig::default();

        let adj = ctrl.maybe_adapt(10, &records(5, 10), &mut thresholds);
        assert_eq!(adj, Adjustment::Unchanged);
        assert_eq!(thresholds.step_pct, dec!(1.0));
    }

    #[test]
    fn test_adjustments_stay_within_bounds() {
        let mut ctrl = controller();
        let mut thresholds = ThresholdConfig::default();
        let bounds = ThresholdBounds::default();

        // Tighten far past the upper bound
        for batch in 1..40u64 {
            ctrl.maybe_adapt(batch * 10, &records(0, 10), &mut thresholds);
        }
        assert_eq!(thresholds.step_pct, bounds.step_pct_max);
        assert_eq!(thresholds.strong_sequence[0], bounds.sequence_first_max);

        // Relax far past the lower bound
        for batch in 40..80u64 {
            ctrl.maybe_adapt(batch * 10, &records(10, 10), &mut thresholds);
        }
        assert_eq!(thresholds.step_pct, bounds.step_pct_min);
        assert_eq!(thresholds.strong_sequence[0], bounds.sequence_first_min);
    }

    #[test]
    fn test_batch_counter_advances() {
        let mut ctrl = controller();
        let mut thresholds = ThresholdConfig::default();

        assert_eq!(
            ctrl.maybe_adapt(10, &records(3, 10), &mut thresholds),
            Adjustment::Tightened
        );
        // Same count again: batch already consumed
        assert_eq!(
            ctrl.maybe_adapt(10, &records(3, 10), &mut thresholds),
            Adjustment::Unchanged
        );
        // Next full batch triggers again
        assert_eq!(
            ctrl.maybe_adapt(20, &records(3, 10), &mut thresholds),
            Adjustment::Tightened
        );
    }
}
