//! Exponentially smoothed market heat

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// Configuration for the heat estimator
#[derive(Debug, Clone, Deserialize)]
pub struct HeatConfig {
    /// Lookback for the per-symbol movement check (seconds)
    #[serde(default = "default_lookback_secs")]
    pub lookback_secs: u64,

    /// Absolute percent change that counts a symbol as "moved"
    #[serde(default = "default_return_threshold_pct")]
    pub return_threshold_pct: Decimal,

    /// Smoothing factor for the exponential moving average
    #[serde(default = "default_alpha")]
    pub alpha: Decimal,
}

fn default_lookback_secs() -> u64 {
    120
}
fn default_return_threshold_pct() -> Decimal {
    dec!(0.8)
}
fn default_alpha() -> Decimal {
    dec!(0.2)
}

impl Default for HeatConfig {
    fn default() -> Self {
        Self {
            lookback_secs: default_lookback_secs(),
            return_threshold_pct: default_return_threshold_pct(),
            alpha: default_alpha(),
        }
    }
}

/// Smoothed estimate of how much of the universe is currently volatile
///
/// `observe` is fed one moved/total observation per analysis cycle. Cycles
/// with no valid references are skipped entirely rather than smoothed toward
/// zero, so startup and feed outages do not depress the estimate.
pub struct HeatEstimator {
    config: HeatConfig,
    heat: Decimal,
}

impl HeatEstimator {
    pub fn new(config: HeatConfig) -> Self {
        Self {
            config,
            heat: Decimal::ZERO,
        }
    }

    /// Lookback the caller should use when computing per-symbol changes
    pub fn lookback_secs(&self) -> u64 {
        self.config.lookback_secs
    }

    /// Threshold a change must exceed in absolute value to count as moved
    pub fn return_threshold_pct(&self) -> Decimal {
        self.config.return_threshold_pct
    }

    /// Fold one cycle's moved/total counts into the smoothed estimate
    pub fn observe(&mut self, moved: usize, total: usize) {
        if total == 0 {
            return;
        }
        let raw = Decimal::from(moved) / Decimal::from(total);
        let alpha = self.config.alpha;
        self.heat = (Decimal::ONE - alpha) * self.heat + alpha * raw;
        self.heat = self.heat.clamp(Decimal::ZERO, Decimal::ONE);
    }

    /// Current smoothed heat in [0, 1]
    pub fn heat(&self) -> Decimal {
        self.heat
    }

    /// Map heat to the pattern threshold multiplier
    ///
    /// Calm markets relax thresholds so slow moves are not missed; hot
    /// markets tighten them against noise.
    pub fn threshold_multiplier(&self) -> Decimal {
        if self.heat < dec!(0.15) {
            dec!(0.75)
        } else if self.heat < dec!(0.35) {
            dec!(0.9)
        } else if self.heat < dec!(0.60) {
            Decimal::ONE
        } else {
            dec!(1.25)
        }
    }
}
