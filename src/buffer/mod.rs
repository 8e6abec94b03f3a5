//! Price stream buffer
//!
//! Per-symbol bounded time series of price samples with lookback queries

mod series;

pub use series::{PriceSample, PriceSeries};

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Bounded per-symbol price history for the whole tracked universe
///
/// Owns every `PriceSeries` exclusively; other components read through the
/// lookback queries and never hold references into the buffer. Missing data
/// always yields neutral defaults so callers need no cold-start handling.
pub struct PriceStreamBuffer {
    retention: Duration,
    series: HashMap<String, PriceSeries>,
}

impl PriceStreamBuffer {
    /// Create a buffer that retains samples for `retention_secs` per symbol
    pub fn new(retention_secs: u64) -> Self {
        Self {
            retention: Duration::seconds(retention_secs as i64),
            series: HashMap::new(),
        }
    }

    /// Append a sample and prune anything older than the retention window
    ///
    /// Malformed samples (non-positive price, timestamp not after the last
    /// recorded sample) are dropped silently.
    pub fn ingest(&mut self, symbol: &str, ts: DateTime<Utc>, price: Decimal) {
        if price <= Decimal::ZERO {
            return;
        }
        let series = self
            .series
            .entry(symbol.to_string())
            .or_insert_with(|| PriceSeries::new(self.retention));
        series.push(ts, price);
    }

    /// Most recent price recorded for a symbol
    pub fn last_price(&self, symbol: &str) -> Option<Decimal> {
        self.series.get(symbol)?.last_price()
    }

    /// Most recent sample whose age is at least `lookback_secs`
    pub fn price_at(
        &self,
        symbol: &str,
        lookback_secs: u64,
        now: DateTime<Utc>,
    ) -> Option<Decimal> {
        self.series.get(symbol)?.price_at(lookback_secs, now)
    }

    /// Percent change between the latest price and the reference price
    /// `lookback_secs` ago
    ///
    /// Returns 0 when no reference exists, so pattern arithmetic stays total
    /// during warm-up.
    pub fn percent_change(&self, symbol: &str, lookback_secs: u64, now: DateTime<Utc>) -> Decimal {
        match self.series.get(symbol) {
            Some(series) => series.percent_change(lookback_secs, now),
            None => Decimal::ZERO,
        }
    }

    /// Samples within the trailing `window_secs`, oldest first
    pub fn window(&self, symbol: &str, window_secs: u64, now: DateTime<Utc>) -> Vec<PriceSample> {
        match self.series.get(symbol) {
            Some(series) => series.window(window_secs, now),
            None => Vec::new(),
        }
    }

    /// Number of samples currently held for a symbol
    pub fn sample_count(&self, symbol: &str) -> usize {
        self.series.get(symbol).map_or(0, PriceSeries::len)
    }

    /// Symbols with at least `min_samples` recorded
    pub fn symbols_with_data(&self, min_samples: usize) -> Vec<String> {
        self.series
            .iter()
            .filter(|(_, s)| s.len() >= min_samples)
            .map(|(sym, _)| sym.clone())
            .collect()
    }

    /// Drop series for symbols no longer in the universe
    pub fn retain_symbols(&mut self, universe: &[String]) {
        self.series.retain(|sym, _| universe.contains(sym));
    }
}
