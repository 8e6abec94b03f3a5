//! Stateful, edge-triggered pattern matcher

use super::types::{Firing, PatternKind, PatternState, ThresholdConfig};
use crate::buffer::{PriceSample, PriceStreamBuffer};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

/// Percent change from `from` to `to`
fn pct(to: Decimal, from: Decimal) -> Decimal {
    if from <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (to - from) / from * Decimal::from(100)
}

/// Evaluates both pattern predicates fresh each cycle and reports only
/// false-to-true transitions
///
/// The only state carried across cycles is the per-symbol last-true
/// booleans; the scans themselves are pure functions of the window.
pub struct PatternMatcher {
    states: HashMap<String, PatternState>,
}

impl PatternMatcher {
    pub fn new() -> Self {
        Self {
            states: HashMap::new(),
        }
    }

    /// Scan every symbol and return this cycle's firings
    ///
    /// When both predicates newly fire for one symbol, only the
    /// strong-sequence firing is reported; it is the higher-conviction
    /// signal and suppresses the step pattern for that cycle.
    pub fn scan(
        &mut self,
        buffer: &PriceStreamBuffer,
        universe: &[String],
        thresholds: &ThresholdConfig,
        multiplier: Decimal,
        now: DateTime<Utc>,
    ) -> Vec<Firing> {
        let mut firings = Vec::new();

        for symbol in universe {
            let (step_now, sequence_now) =
                self.evaluate(buffer, symbol, thresholds, multiplier, now);

            let state = self.states.entry(symbol.clone()).or_default();
            let step_edge = step_now && !state.step_was_true;
            let sequence_edge = sequence_now && !state.sequence_was_true;
            state.step_was_true = step_now;
            state.sequence_was_true = sequence_now;

            if sequence_edge {
                firings.push(Firing {
                    symbol: symbol.clone(),
                    kind: PatternKind::StrongSequence,
                    detected_at: now,
                });
            } else if step_edge {
                firings.push(Firing {
                    symbol: symbol.clone(),
                    kind: PatternKind::Step,
                    detected_at: now,
                });
            }
        }

        firings
    }

    /// Evaluate both predicates for one symbol without touching edge state
    ///
    /// Exposed for the per-symbol diagnostics view.
    pub fn evaluate(
        &self,
        buffer: &PriceStreamBuffer,
        symbol: &str,
        thresholds: &ThresholdConfig,
        multiplier: Decimal,
        now: DateTime<Utc>,
    ) -> (bool, bool) {
        let step_window = buffer.window(symbol, thresholds.step_window_secs, now);
        let step_thresh = thresholds.step_pct * multiplier;
        let step = step_predicate(&step_window, step_thresh);

        let seq_window = buffer.window(symbol, thresholds.sequence_window_secs, now);
        let sequence = sequence_predicate(&seq_window, &thresholds.strong_sequence, multiplier);

        (step, sequence)
    }

    /// Drop edge state for symbols no longer tracked
    pub fn retain_symbols(&mut self, universe: &[String]) {
        self.states.retain(|sym, _| universe.contains(sym));
    }
}

impl Default for PatternMatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Step pattern: two consecutive legs of at least `thresh` percent
///
/// Single forward scan. The candidate start tracks the running low until
/// the first leg completes; once the first leg is in, a retracement of more
/// than `thresh` below the leg price resets the scan from the current
/// sample. No backtracking.
pub fn step_predicate(samples: &[PriceSample], thresh: Decimal) -> bool {
    if samples.len() < 3 || thresh <= Decimal::ZERO {
        return false;
    }

    let mut base = samples[0].price;
    let mut first_leg: Option<Decimal> = None;

    for sample in &samples[1..] {
        match first_leg {
            None => {
                if pct(sample.price, base) >= thresh {
                    first_leg = Some(sample.price);
                } else if sample.price < base {
                    // A lower price is a better start for the first leg
                    base = sample.price;
                }
            }
            Some(leg_price) => {
                let change = pct(sample.price, leg_price);
                if change >= thresh {
                    return true;
                }
                if change < -thresh {
                    // Retracement invalidates the first leg
                    base = sample.price;
                    first_leg = None;
                }
            }
        }
    }

    false
}

/// Strong-sequence pattern: the required percent steps reached in order
///
/// Progress survives retracements up to the slack; anything deeper resets
/// to step zero anchored at the current price. Several start offsets are
/// tried so a window that opens mid-move is not missed.
pub fn sequence_predicate(
    samples: &[PriceSample],
    steps: &[Decimal],
    multiplier: Decimal,
) -> bool {
    if samples.len() < 2 || steps.is_empty() {
        return false;
    }

    let slack = dec!(0.3) * multiplier;
    let scaled: Vec<Decimal> = steps.iter().map(|s| *s * multiplier).collect();

    let len = samples.len();
    let mut offsets = vec![0, len / 4, len / 2];
    offsets.dedup();

    offsets
        .into_iter()
        .any(|offset| sequence_from(&samples[offset..], &scaled, slack))
}

fn sequence_from(samples: &[PriceSample], steps: &[Decimal], slack: Decimal) -> bool {
    if samples.len() < 2 {
        return false;
    }

    let mut anchor = samples[0].price;
    let mut step_idx = 0usize;

    for sample in &samples[1..] {
        let change = pct(sample.price, anchor);
        if change >= steps[step_idx] {
            step_idx += 1;
            anchor = sample.price;
            if step_idx == steps.len() {
                return true;
            }
        } else if change < -slack {
            anchor = sample.price;
            step_idx = 0;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn series(base: DateTime<Utc>, prices: &[Decimal]) -> Vec<PriceSample> {
        prices
            .iter()
            .enumerate()
            .map(|(i, p)| PriceSample {
                ts: base + Duration::seconds(i as i64),
                price: *p,
            })
            .collect()
    }

    fn buffer_with(symbol: &str, base: DateTime<Utc>, prices: &[Decimal]) -> PriceStreamBuffer {
        let mut buf = PriceStreamBuffer::new(1200);
        for (i, p) in prices.iter().enumerate() {
            buf.ingest(symbol, base + Duration::seconds(i as i64), *p);
        }
        buf
    }

    #[test]
    fn test_step_predicate_reference_scenario() {
        let base = Utc::now();
        let samples = series(
            base,
            &[dec!(100), dec!(100), dec!(101.2), dec!(101.2), dec!(102.5)],
        );
        assert!(step_predicate(&samples, dec!(1.0)));
    }

    #[test]
    fn test_step_predicate_single_leg_insufficient() {
        let base = Utc::now();
        let samples = series(base, &[dec!(100), dec!(101.2), dec!(101.3)]);
        assert!(!step_predicate(&samples, dec!(1.0)));
    }

    #[test]
    fn test_step_predicate_retracement_resets_first_leg() {
        let base = Utc::now();
        // First leg completes at 101.2, then a >1% retracement, then a
        // single leg off the new base; no second leg ever completes.
        let samples = series(
            base,
            &[dec!(100), dec!(101.2), dec!(100.0), dec!(101.1)],
        );
        assert!(!step_predicate(&samples, dec!(1.0)));
    }

    #[test]
    fn test_step_predicate_recovers_after_reset() {
        let base = Utc::now();
        // Reset at 99, then two clean legs from there
        let samples = series(
            base,
            &[
                dec!(100),
                dec!(101.2),
                dec!(99),
                dec!(100.1),
                dec!(101.2),
            ],
        );
        assert!(step_predicate(&samples, dec!(1.0)));
    }

    #[test]
    fn test_step_predicate_exact_threshold_retrace_keeps_leg() {
        let base = Utc::now();
        // A retracement of exactly 1% does not invalidate the first leg;
        // the second leg still completes from the original leg price
        let samples = series(
            base,
            &[dec!(100), dec!(101), dec!(99.99), dec!(102.01)],
        );
        assert!(step_predicate(&samples, dec!(1.0)));
    }

    #[test]
    fn test_step_predicate_tracks_running_low_start() {
        let base = Utc::now();
        // Legs measured from the dip at 98, not the opening 100
        let samples = series(base, &[dec!(100), dec!(98), dec!(99.1), dec!(100.2)]);
        assert!(step_predicate(&samples, dec!(1.0)));
    }

    #[test]
    fn test_sequence_predicate_orders_steps() {
        let base = Utc::now();
        // +2%, +1%, +2% in order
        let samples = series(
            base,
            &[dec!(100), dec!(102.1), dec!(103.2), dec!(105.4)],
        );
        assert!(sequence_predicate(
            &samples,
            &[dec!(2.0), dec!(1.0), dec!(2.0)],
            Decimal::ONE,
        ));
    }

    #[test]
    fn test_sequence_predicate_incomplete() {
        let base = Utc::now();
        let samples = series(base, &[dec!(100), dec!(102.1), dec!(103.2)]);
        assert!(!sequence_predicate(
            &samples,
            &[dec!(2.0), dec!(1.0), dec!(2.0)],
            Decimal::ONE,
        ));
    }

    #[test]
    fn test_sequence_predicate_slack_allows_shallow_retrace() {
        let base = Utc::now();
        // 0.2% dip between steps stays inside the 0.3% slack
        let samples = series(
            base,
            &[dec!(100), dec!(102.1), dec!(101.9), dec!(103.2), dec!(105.4)],
        );
        assert!(sequence_predicate(
            &samples,
            &[dec!(2.0), dec!(1.0), dec!(2.0)],
            Decimal::ONE,
        ));
    }

    #[test]
    fn test_sequence_predicate_exact_slack_retrace_keeps_progress() {
        let base = Utc::now();
        // A dip of exactly 0.3% sits at the slack boundary and keeps the
        // step progress and anchor
        let samples = series(
            base,
            &[
                dec!(100),
                dec!(102),
                dec!(101.694),
                dec!(103.02),
                dec!(105.0804),
            ],
        );
        assert!(sequence_predicate(
            &samples,
            &[dec!(2.0), dec!(1.0), dec!(2.0)],
            Decimal::ONE,
        ));
    }

    #[test]
    fn test_sequence_predicate_deep_retrace_resets() {
        let base = Utc::now();
        // 2% drop after the first step resets progress; remaining gains
        // never complete the full sequence from the new anchor.
        let samples = series(
            base,
            &[dec!(100), dec!(102.1), dec!(100.0), dec!(101.1), dec!(102.2)],
        );
        assert!(!sequence_predicate(
            &samples,
            &[dec!(2.0), dec!(1.0), dec!(2.0)],
            Decimal::ONE,
        ));
    }

    #[test]
    fn test_multiplier_scales_thresholds() {
        let base = Utc::now();
        // Legs of ~0.8%: fail at 1.0x but pass at 0.75x
        let samples = series(base, &[dec!(100), dec!(100.8), dec!(101.61)]);
        assert!(!step_predicate(&samples, dec!(1.0)));
        assert!(step_predicate(&samples, dec!(0.75)));
    }

    #[test]
    fn test_scan_edge_triggering() {
        let base = Utc::now();
        let buf = buffer_with(
            "BTC-EUR",
            base,
            &[dec!(100), dec!(100), dec!(101.2), dec!(101.2), dec!(102.5)],
        );
        let universe = vec!["BTC-EUR".to_string()];
        let thresholds = ThresholdConfig::default();
        let mut matcher = PatternMatcher::new();

        let now = base + Duration::seconds(4);
        let first = matcher.scan(&buf, &universe, &thresholds, Decimal::ONE, now);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].kind, PatternKind::Step);

        // Predicate still true on later cycles; no refire
        for cycle in 1..5 {
            let again = matcher.scan(
                &buf,
                &universe,
                &thresholds,
                Decimal::ONE,
                now + Duration::seconds(cycle),
            );
            assert!(again.is_empty());
        }
    }

    #[test]
    fn test_scan_refires_after_predicate_drops() {
        let base = Utc::now();
        let mut buf = buffer_with(
            "BTC-EUR",
            base,
            &[dec!(100), dec!(101.2), dec!(102.5)],
        );
        let universe = vec!["BTC-EUR".to_string()];
        let thresholds = ThresholdConfig::default();
        let mut matcher = PatternMatcher::new();

        let now = base + Duration::seconds(2);
        assert_eq!(
            matcher
                .scan(&buf, &universe, &thresholds, Decimal::ONE, now)
                .len(),
            1
        );

        // Far in the future the window is empty and the predicate drops
        let later = base + Duration::seconds(1000);
        assert!(matcher
            .scan(&buf, &universe, &thresholds, Decimal::ONE, later)
            .is_empty());

        // A fresh two-leg move re-triggers
        buf.ingest("BTC-EUR", later, dec!(100));
        buf.ingest("BTC-EUR", later + Duration::seconds(1), dec!(101.2));
        buf.ingest("BTC-EUR", later + Duration::seconds(2), dec!(102.5));
        let refire = matcher.scan(
            &buf,
            &universe,
            &thresholds,
            Decimal::ONE,
            later + Duration::seconds(2),
        );
        assert_eq!(refire.len(), 1);
    }

    #[test]
    fn test_scan_sequence_takes_precedence() {
        let base = Utc::now();
        // Satisfies both: +2%, +1%, +2% legs are each also >= 1% step legs
        let buf = buffer_with(
            "BTC-EUR",
            base,
            &[dec!(100), dec!(102.1), dec!(103.2), dec!(105.4)],
        );
        let universe = vec!["BTC-EUR".to_string()];
        let thresholds = ThresholdConfig::default();
        let mut matcher = PatternMatcher::new();

        let firings = matcher.scan(
            &buf,
            &universe,
            &thresholds,
            Decimal::ONE,
            base + Duration::seconds(3),
        );
        assert_eq!(firings.len(), 1);
        assert_eq!(firings[0].kind, PatternKind::StrongSequence);
    }
}
