//! Rank resolution from reference-window percent changes

use crate::buffer::PriceStreamBuffer;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::collections::HashMap;

/// Configuration for the rank resolver
#[derive(Debug, Clone, Deserialize)]
pub struct RankConfig {
    /// Reference window for the ranking percent change (seconds)
    #[serde(default = "default_lookback_secs")]
    pub lookback_secs: u64,

    /// Worst (largest) rank that still passes the alert filter
    #[serde(default = "default_max_rank")]
    pub max_rank: usize,
}

fn default_lookback_secs() -> u64 {
    300
}
fn default_max_rank() -> usize {
    10
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            lookback_secs: default_lookback_secs(),
            max_rank: default_max_rank(),
        }
    }
}

/// Snapshot of each symbol's momentum rank for one analysis cycle
///
/// Rank 1 is the strongest mover over the reference window. Symbols without
/// a valid reference price carry no rank and fail the rank filter.
pub struct RankResolver {
    config: RankConfig,
    ranks: HashMap<String, usize>,
    changes: HashMap<String, Decimal>,
}

impl RankResolver {
    pub fn new(config: RankConfig) -> Self {
        Self {
            config,
            ranks: HashMap::new(),
            changes: HashMap::new(),
        }
    }

    /// Recompute all ranks against the current buffer contents
    pub fn recompute(
        &mut self,
        buffer: &PriceStreamBuffer,
        universe: &[String],
        now: DateTime<Utc>,
    ) {
        self.ranks.clear();
        self.changes.clear();

        let mut scored: Vec<(String, Decimal)> = Vec::with_capacity(universe.len());
        for symbol in universe {
            if buffer.price_at(symbol, self.config.lookback_secs, now).is_none() {
                continue;
            }
            let change = buffer.percent_change(symbol, self.config.lookback_secs, now);
            scored.push((symbol.clone(), change));
        }

        scored.sort_by(|a, b| b.1.cmp(&a.1));

        for (position, (symbol, change)) in scored.into_iter().enumerate() {
            self.ranks.insert(symbol.clone(), position + 1);
            self.changes.insert(symbol, change);
        }
    }

    /// 1-based rank for a symbol, or none when it had no valid reference
    pub fn rank(&self, symbol: &str) -> Option<usize> {
        self.ranks.get(symbol).copied()
    }

    /// Percent change used for the current ranking
    pub fn change(&self, symbol: &str) -> Decimal {
        self.changes.get(symbol).copied().unwrap_or(dec!(0))
    }

    /// Whether a symbol currently passes the top-K rank filter
    pub fn passes_filter(&self, symbol: &str) -> bool {
        matches!(self.rank(symbol), Some(r) if r <= self.config.max_rank)
    }

    pub fn max_rank(&self) -> usize {
        self.config.max_rank
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn seeded_buffer(now: DateTime<Utc>) -> PriceStreamBuffer {
        let mut buf = PriceStreamBuffer::new(1200);
        let start = now - Duration::seconds(300);
        // BTC +5%, ETH +2%, XRP -1%
        buf.ingest("BTC-EUR", start, dec!(100));
        buf.ingest("BTC-EUR", now, dec!(105));
        buf.ingest("ETH-EUR", start, dec!(100));
        buf.ingest("ETH-EUR", now, dec!(102));
        buf.ingest("XRP-EUR", start, dec!(100));
        buf.ingest("XRP-EUR", now, dec!(99));
        buf
    }

    fn universe() -> Vec<String> {
        vec![
            "BTC-EUR".to_string(),
            "ETH-EUR".to_string(),
            "XRP-EUR".to_string(),
            "ADA-EUR".to_string(),
        ]
    }

    #[test]
    fn test_ranks_descend_by_change() {
        let now = Utc::now();
        let buf = seeded_buffer(now);
        let mut resolver = RankResolver::new(RankConfig::default());

        resolver.recompute(&buf, &universe(), now);

        assert_eq!(resolver.rank("BTC-EUR"), Some(1));
        assert_eq!(resolver.rank("ETH-EUR"), Some(2));
        assert_eq!(resolver.rank("XRP-EUR"), Some(3));
    }

    #[test]
    fn test_symbol_without_reference_has_no_rank() {
        let now = Utc::now();
        let buf = seeded_buffer(now);
        let mut resolver = RankResolver::new(RankConfig::default());

        resolver.recompute(&buf, &universe(), now);

        assert_eq!(resolver.rank("ADA-EUR"), None);
        assert!(!resolver.passes_filter("ADA-EUR"));
    }

    #[test]
    fn test_rank_filter_cutoff() {
        let now = Utc::now();
        let buf = seeded_buffer(now);
        let mut resolver = RankResolver::new(RankConfig {
            max_rank: 2,
            ..Default::default()
        });

        resolver.recompute(&buf, &universe(), now);

        assert!(resolver.passes_filter("BTC-EUR"));
        assert!(resolver.passes_filter("ETH-EUR"));
        assert!(!resolver.passes_filter("XRP-EUR"));
    }
}
