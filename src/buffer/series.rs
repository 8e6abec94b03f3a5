//! Single-symbol price series with retention pruning

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::VecDeque;

/// One observed (timestamp, price) sample, immutable once recorded
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceSample {
    pub ts: DateTime<Utc>,
    pub price: Decimal,
}

/// Time-ordered samples for one symbol, pruned to a retention window
///
/// Insertion order equals time order: pushes with a timestamp at or before
/// the newest sample are dropped, which keeps every query monotone.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    retention: Duration,
    samples: VecDeque<PriceSample>,
}

impl PriceSeries {
    pub fn new(retention: Duration) -> Self {
        Self {
            retention,
            samples: VecDeque::new(),
        }
    }

    /// Append a sample and prune the tail outside the retention window
    pub fn push(&mut self, ts: DateTime<Utc>, price: Decimal) {
        if let Some(last) = self.samples.back() {
            if ts <= last.ts {
                return;
            }
        }
        self.samples.push_back(PriceSample { ts, price });

        let cutoff = ts - self.retention;
        while let Some(front) = self.samples.front() {
            if front.ts < cutoff {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last_price(&self) -> Option<Decimal> {
        self.samples.back().map(|s| s.price)
    }

    /// Most recent sample aged at least `lookback_secs` relative to `now`
    ///
    /// Pruning happens on push, so a stalled feed can leave expired samples
    /// in the deque; the retention cap here keeps them invisible to queries.
    pub fn price_at(&self, lookback_secs: u64, now: DateTime<Utc>) -> Option<Decimal> {
        let cutoff = now - Duration::seconds(lookback_secs as i64);
        let horizon = now - self.retention;
        self.samples
            .iter()
            .rev()
            .find(|s| s.ts <= cutoff)
            .filter(|s| s.ts >= horizon)
            .map(|s| s.price)
    }

    /// `(last - ref) / ref * 100`, or 0 when no usable reference exists
    pub fn percent_change(&self, lookback_secs: u64, now: DateTime<Utc>) -> Decimal {
        let last = match self.last_price() {
            Some(p) => p,
            None => return Decimal::ZERO,
        };
        let reference = match self.price_at(lookback_secs, now) {
            Some(p) if p > Decimal::ZERO => p,
            _ => return Decimal::ZERO,
        };
        (last - reference) / reference * Decimal::from(100)
    }

    /// Samples within the trailing window, oldest first
    ///
    /// The window never reaches past the retention horizon.
    pub fn window(&self, window_secs: u64, now: DateTime<Utc>) -> Vec<PriceSample> {
        let span = Duration::seconds(window_secs as i64).min(self.retention);
        let cutoff = now - span;
        self.samples
            .iter()
            .filter(|s| s.ts >= cutoff)
            .copied()
            .collect()
    }
}
