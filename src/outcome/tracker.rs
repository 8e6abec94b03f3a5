//! Open-prediction bookkeeping and scoring

use super::types::{HistoryRecord, OpenPrediction, OutcomeConfig, OutcomeStatus};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::collections::{HashMap, VecDeque};

/// Tracks pending predictions and the bounded closed-record history
///
/// At most one prediction is open per symbol. The cooldown being at least
/// as long as the follow-up window (enforced at config validation) is what
/// keeps `open` from ever being asked to double-book a symbol; the guard
/// here is a backstop, not the primary mechanism.
pub struct OutcomeTracker {
    config: OutcomeConfig,
    open: HashMap<String, OpenPrediction>,
    history: VecDeque<HistoryRecord>,
    total_closed: u64,
}

impl OutcomeTracker {
    pub fn new(config: OutcomeConfig) -> Self {
        Self {
            config,
            open: HashMap::new(),
            history: VecDeque::new(),
            total_closed: 0,
        }
    }

    /// Open a prediction for an accepted alert
    ///
    /// Returns false without touching state when the symbol already has an
    /// open prediction.
    pub fn open(
        &mut self,
        symbol: &str,
        tag: &'static str,
        now: DateTime<Utc>,
        start_price: Decimal,
    ) -> bool {
        if self.open.contains_key(symbol) {
            tracing::warn!(symbol, "prediction already open, skipping");
            return false;
        }
        self.open.insert(
            symbol.to_string(),
            OpenPrediction::new(symbol, tag, now, start_price),
        );
        true
    }

    /// Advance every pending prediction one cycle
    ///
    /// Updates high-water marks from `current_prices`, then closes every
    /// prediction whose follow-up window has elapsed: hit if its best
    /// change reached the target at any point, miss otherwise. Closed
    /// records are appended to the history ring and returned.
    pub fn evaluate(
        &mut self,
        current_prices: &HashMap<String, Decimal>,
        now: DateTime<Utc>,
    ) -> Vec<HistoryRecord> {
        let follow_up = Duration::seconds(self.config.follow_up_secs as i64);

        for pred in self.open.values_mut() {
            if let Some(price) = current_prices.get(&pred.symbol) {
                if *price > pred.high_water_price {
                    pred.high_water_price = *price;
                }
            }
        }

        let due: Vec<String> = self
            .open
            .values()
            .filter(|p| now - p.open_time >= follow_up)
            .map(|p| p.symbol.clone())
            .collect();

        let mut closed = Vec::with_capacity(due.len());
        for symbol in due {
            if let Some(pred) = self.open.remove(&symbol) {
                let best_change_pct = pred.best_change_pct();
                let status = if best_change_pct >= self.config.target_pct {
                    OutcomeStatus::Hit
                } else {
                    OutcomeStatus::Miss
                };
                let record = HistoryRecord {
                    id: pred.id,
                    symbol: pred.symbol,
                    tag: pred.tag,
                    status,
                    target_pct: self.config.target_pct,
                    best_change_pct,
                    close_time: now,
                };
                self.push_history(record.clone());
                closed.push(record);
            }
        }
        closed
    }

    fn push_history(&mut self, record: HistoryRecord) {
        if self.history.len() == self.config.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(record);
        self.total_closed += 1;
    }

    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    pub fn has_open(&self, symbol: &str) -> bool {
        self.open.contains_key(symbol)
    }

    pub fn total_closed(&self) -> u64 {
        self.total_closed
    }

    /// Most recent `n` closed records, oldest first
    pub fn recent_history(&self, n: usize) -> Vec<HistoryRecord> {
        let skip = self.history.len().saturating_sub(n);
        self.history.iter().skip(skip).cloned().collect()
    }

    /// Full history view, oldest first
    pub fn history(&self) -> Vec<HistoryRecord> {
        self.history.iter().cloned().collect()
    }

    /// Fraction of hits across the retained history
    pub fn overall_win_rate(&self) -> Option<Decimal> {
        if self.history.is_empty() {
            return None;
        }
        let hits = self.history.iter().filter(|r| r.is_hit()).count();
        Some(Decimal::from(hits) / Decimal::from(self.history.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn prices(entries: &[(&str, Decimal)]) -> HashMap<String, Decimal> {
        entries
            .iter()
            .map(|(s, p)| (s.to_string(), *p))
            .collect()
    }

    fn tracker() -> OutcomeTracker {
        OutcomeTracker::new(OutcomeConfig {
            target_pct: dec!(2.0),
            follow_up_secs: 600,
            history_capacity: 5,
        })
    }

    #[test]
    fn test_single_open_prediction_per_symbol() {
        let mut t = tracker();
        let now = Utc::now();

        assert!(t.open("BTC-EUR", "double-step", now, dec!(100)));
        assert!(!t.open("BTC-EUR", "strong-surge", now, dec!(101)));
        assert_eq!(t.open_count(), 1);
    }

    #[test]
    fn test_high_water_is_monotone() {
        let mut t = tracker();
        let now = Utc::now();
        t.open("BTC-EUR", "double-step", now, dec!(100));

        t.evaluate(&prices(&[("BTC-EUR", dec!(102))]), now + Duration::seconds(60));
        t.evaluate(&prices(&[("BTC-EUR", dec!(99))]), now + Duration::seconds(120));

        // Close and check the mark survived the drawdown
        let closed = t.evaluate(
            &prices(&[("BTC-EUR", dec!(99))]),
            now + Duration::seconds(600),
        );
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].best_change_pct, dec!(2));
    }

    #[test]
    fn test_hit_scored_at_window_close() {
        let mut t = tracker();
        let now = Utc::now();
        t.open("BTC-EUR", "double-step", now, dec!(100));

        // Peaks at +2.5% mid-window, drifts back to +1%
        t.evaluate(&prices(&[("BTC-EUR", dec!(102.5))]), now + Duration::seconds(120));
        t.evaluate(&prices(&[("BTC-EUR", dec!(101))]), now + Duration::seconds(300));

        // Not closed before the window elapses
        assert_eq!(t.open_count(), 1);

        let closed = t.evaluate(
            &prices(&[("BTC-EUR", dec!(101))]),
            now + Duration::seconds(600),
        );
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].status, OutcomeStatus::Hit);
        assert_eq!(closed[0].best_change_pct, dec!(2.5));
        assert_eq!(t.open_count(), 0);
    }

    #[test]
    fn test_miss_via_timeout() {
        let mut t = tracker();
        let now = Utc::now();
        t.open("BTC-EUR", "double-step", now, dec!(100));

        t.evaluate(&prices(&[("BTC-EUR", dec!(101.5))]), now + Duration::seconds(120));

        let closed = t.evaluate(
            &prices(&[("BTC-EUR", dec!(101.5))]),
            now + Duration::seconds(600),
        );
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].status, OutcomeStatus::Miss);
        assert_eq!(closed[0].best_change_pct, dec!(1.5));
    }

    #[test]
    fn test_missing_price_keeps_prediction_pending_mark() {
        let mut t = tracker();
        let now = Utc::now();
        t.open("BTC-EUR", "double-step", now, dec!(100));

        // Feed outage: no price for the symbol this cycle
        let closed = t.evaluate(&prices(&[]), now + Duration::seconds(60));
        assert!(closed.is_empty());
        assert_eq!(t.open_count(), 1);
    }

    #[test]
    fn test_history_ring_is_bounded() {
        let mut t = tracker();
        let mut now = Utc::now();

        for i in 0..8 {
            let symbol = format!("S{i}-EUR");
            t.open(&symbol, "double-step", now, dec!(100));
            now += Duration::seconds(600);
            t.evaluate(&prices(&[(&symbol, dec!(100))]), now);
        }

        assert_eq!(t.history().len(), 5);
        assert_eq!(t.total_closed(), 8);
        // Oldest records evicted first
        assert_eq!(t.history()[0].symbol, "S3-EUR");
    }

    #[test]
    fn test_recent_history_and_win_rate() {
        let mut t = tracker();
        let mut now = Utc::now();

        for (i, peak) in [dec!(103), dec!(101), dec!(102.5)].iter().enumerate() {
            let symbol = format!("S{i}-EUR");
            t.open(&symbol, "double-step", now, dec!(100));
            t.evaluate(&prices(&[(&symbol, *peak)]), now + Duration::seconds(60));
            now += Duration::seconds(600);
            t.evaluate(&prices(&[]), now);
        }

        assert_eq!(t.recent_history(2).len(), 2);
        // 2 hits out of 3
        let rate = t.overall_win_rate().unwrap();
        assert!(rate > dec!(0.66) && rate < dec!(0.67));
    }
}
