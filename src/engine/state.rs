//! Shared engine state behind one coarse lock

use super::types::{StatusSnapshot, SymbolDiagnostics};
use crate::adaptive::AdaptiveController;
use crate::alert::{AcceptedAlert, AlertGatekeeper, RejectReason};
use crate::buffer::PriceStreamBuffer;
use crate::config::Config;
use crate::feed::PriceMap;
use crate::heat::HeatEstimator;
use crate::outcome::{HistoryRecord, OutcomeTracker};
use crate::pattern::{Firing, PatternMatcher, ThresholdConfig};
use crate::rank::RankResolver;
use crate::telemetry::{self, CounterMetric, GaugeMetric};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;

/// Everything the worker loops share, guarded by `Engine`'s mutex
///
/// Contention is low (cycle periods are seconds), so one lock held for the
/// duration of a read/mutate snapshot is simpler to reason about than
/// per-symbol locking. Callers must not do I/O while holding it; every
/// `Engine` method returns before anything touches the network.
struct EngineState {
    universe: Vec<String>,
    buffer: PriceStreamBuffer,
    heat: HeatEstimator,
    rank: RankResolver,
    matcher: PatternMatcher,
    thresholds: ThresholdConfig,
    gatekeeper: AlertGatekeeper,
    outcomes: OutcomeTracker,
    controller: AdaptiveController,
    last_prices: PriceMap,
    last_blocks: HashMap<String, RejectReason>,
}

/// The detection engine
pub struct Engine {
    heat_lookback_secs: u64,
    rank_lookback_secs: u64,
    adaptive_batch: usize,
    inner: Mutex<EngineState>,
}

impl Engine {
    pub fn new(config: &Config) -> Self {
        Self {
            heat_lookback_secs: config.heat.lookback_secs,
            rank_lookback_secs: config.rank.lookback_secs,
            adaptive_batch: config.adaptive.batch_size as usize,
            inner: Mutex::new(EngineState {
                universe: Vec::new(),
                buffer: PriceStreamBuffer::new(config.buffer.retention_secs),
                heat: HeatEstimator::new(config.heat.clone()),
                rank: RankResolver::new(config.rank.clone()),
                matcher: PatternMatcher::new(),
                thresholds: config.thresholds.clone(),
                gatekeeper: AlertGatekeeper::new(config.alert.clone()),
                outcomes: OutcomeTracker::new(config.outcome.clone()),
                controller: AdaptiveController::new(config.adaptive.clone()),
                last_prices: PriceMap::new(),
                last_blocks: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, EngineState> {
        // A poisoned lock means a panic mid-cycle; the state itself is
        // still consistent enough to keep serving.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Replace the tracked universe and drop state for delisted symbols
    pub fn set_universe(&self, symbols: Vec<String>) {
        let mut state = self.lock();
        state.buffer.retain_symbols(&symbols);
        state.matcher.retain_symbols(&symbols);
        state.universe = symbols;
        telemetry::set_gauge(GaugeMetric::UniverseSize, state.universe.len() as f64);
    }

    /// Merge one fetched price map into the buffer
    ///
    /// The fetch itself happens outside the lock; this only records.
    pub fn ingest_batch(&self, now: DateTime<Utc>, prices: &PriceMap) {
        let mut state = self.lock();
        for (symbol, price) in prices {
            if state.universe.contains(symbol) {
                state.buffer.ingest(symbol, now, *price);
            }
        }
        state.last_prices = prices.clone();
    }

    /// One full analysis cycle: heat, ranks, pattern scan, gatekeeping
    ///
    /// Each stage runs to completion before the next reads its output, so
    /// flood and dedup decisions are made against a stable firing batch.
    /// Returns accepted alerts for delivery after the lock is released.
    pub fn run_analysis_cycle(&self, now: DateTime<Utc>) -> Vec<AcceptedAlert> {
        let mut state = self.lock();
        let state = &mut *state;

        // Stage 1: heat
        let (moved, total) = self.count_movers(state, now);
        state.heat.observe(moved, total);
        let multiplier = state.heat.threshold_multiplier();

        // Stage 2: ranks
        state.rank.recompute(&state.buffer, &state.universe, now);

        // Stage 3: full pattern scan
        let firings = state.matcher.scan(
            &state.buffer,
            &state.universe,
            &state.thresholds,
            multiplier,
            now,
        );

        // Stage 4: gatekeeping over the whole batch
        let mut accepted = Vec::new();
        for firing in &firings {
            match self.admit_firing(state, firing, now) {
                Ok(alert) => {
                    state.last_blocks.remove(&firing.symbol);
                    accepted.push(alert);
                }
                Err(reason) => {
                    tracing::debug!(
                        symbol = %firing.symbol,
                        kind = firing.kind.tag(),
                        ?reason,
                        "firing suppressed"
                    );
                    telemetry::increment(CounterMetric::AlertsRejected);
                    state.last_blocks.insert(firing.symbol.clone(), reason);
                }
            }
        }

        telemetry::set_gauge(
            GaugeMetric::Heat,
            state.heat.heat().to_f64().unwrap_or(0.0),
        );
        telemetry::set_gauge(
            GaugeMetric::StepThresholdPct,
            state.thresholds.step_pct.to_f64().unwrap_or(0.0),
        );
        telemetry::set_gauge(
            GaugeMetric::OpenPredictions,
            state.outcomes.open_count() as f64,
        );

        accepted
    }

    fn count_movers(&self, state: &EngineState, now: DateTime<Utc>) -> (usize, usize) {
        let threshold = state.heat.return_threshold_pct();
        let mut moved = 0;
        let mut total = 0;
        for symbol in &state.universe {
            if state.buffer.sample_count(symbol) < 2
                || state
                    .buffer
                    .price_at(symbol, self.heat_lookback_secs, now)
                    .is_none()
            {
                continue;
            }
            total += 1;
            let change = state
                .buffer
                .percent_change(symbol, self.heat_lookback_secs, now);
            if change.abs() >= threshold {
                moved += 1;
            }
        }
        (moved, total)
    }

    fn admit_firing(
        &self,
        state: &mut EngineState,
        firing: &Firing,
        now: DateTime<Utc>,
    ) -> Result<AcceptedAlert, RejectReason> {
        let rank = state.rank.rank(&firing.symbol);
        let rank_ok = state.rank.passes_filter(&firing.symbol);
        let message = render_message(
            firing,
            state.rank.change(&firing.symbol),
            rank,
            self.rank_lookback_secs,
        );

        let alert = state
            .gatekeeper
            .admit(firing, rank, rank_ok, message, now)?;

        if let Some(price) = state.buffer.last_price(&firing.symbol) {
            state
                .outcomes
                .open(&firing.symbol, firing.kind.tag(), now, price);
        }
        telemetry::increment(CounterMetric::AlertsAccepted);
        tracing::info!(
            symbol = %alert.symbol,
            kind = alert.kind.tag(),
            rank = ?rank,
            "alert accepted"
        );
        Ok(alert)
    }

    /// One outcome cycle: advance high-water marks, close due predictions,
    /// feed the adaptive controller
    pub fn run_outcome_cycle(&self, now: DateTime<Utc>) -> Vec<HistoryRecord> {
        let mut state = self.lock();
        let state = &mut *state;

        let closed = state.outcomes.evaluate(&state.last_prices, now);
        for record in &closed {
            telemetry::increment(CounterMetric::PredictionsClosed);
            tracing::info!(
                symbol = %record.symbol,
                tag = record.tag,
                status = ?record.status,
                best_change_pct = %record.best_change_pct,
                "prediction closed"
            );
        }

        if !closed.is_empty() {
            let recent = state.outcomes.recent_history(self.adaptive_batch);
            state.controller.maybe_adapt(
                state.outcomes.total_closed(),
                &recent,
                &mut state.thresholds,
            );
            if let Some(rate) = state.controller.last_win_rate() {
                telemetry::set_gauge(GaugeMetric::WinRate, rate.to_f64().unwrap_or(0.0));
            }
        }

        closed
    }

    /// Read-only status view for reporters
    pub fn status(&self, now: DateTime<Utc>) -> StatusSnapshot {
        let mut state = self.lock();
        let state = &mut *state;
        StatusSnapshot {
            heat: state.heat.heat(),
            threshold_multiplier: state.heat.threshold_multiplier(),
            thresholds: state.thresholds.clone(),
            universe_size: state.universe.len(),
            open_predictions: state.outcomes.open_count(),
            closed_total: state.outcomes.total_closed(),
            overall_win_rate: state.outcomes.overall_win_rate(),
            last_batch_win_rate: state.controller.last_win_rate(),
            alerts_in_flood_window: state.gatekeeper.flood_window_len(now),
            history: state.outcomes.history(),
        }
    }

    /// Per-symbol diagnostic view: current changes, rank, predicate values,
    /// and whatever last blocked an alert
    pub fn diagnostics(&self, symbol: &str, now: DateTime<Utc>) -> Option<SymbolDiagnostics> {
        let state = self.lock();
        if !state.universe.iter().any(|s| s == symbol) {
            return None;
        }

        let multiplier = state.heat.threshold_multiplier();
        let (step, sequence) =
            state
                .matcher
                .evaluate(&state.buffer, symbol, &state.thresholds, multiplier, now);

        Some(SymbolDiagnostics {
            symbol: symbol.to_string(),
            sample_count: state.buffer.sample_count(symbol),
            short_change_pct: state
                .buffer
                .percent_change(symbol, self.heat_lookback_secs, now),
            rank_change_pct: state
                .buffer
                .percent_change(symbol, self.rank_lookback_secs, now),
            rank: state.rank.rank(symbol),
            step_predicate: step,
            sequence_predicate: sequence,
            cooldown_remaining_secs: state.gatekeeper.cooldown_remaining(symbol, now),
            open_prediction: state.outcomes.has_open(symbol),
            last_block: state.last_blocks.get(symbol).cloned(),
        })
    }
}

/// Render the alert text sent to the notification channel
fn render_message(
    firing: &Firing,
    ref_change: Decimal,
    rank: Option<usize>,
    rank_lookback_secs: u64,
) -> String {
    let rank_part = match rank {
        Some(r) => format!("#{r}"),
        None => "-".to_string(),
    };
    format!(
        "[{}] {} {}{}% over {}m | rank {}",
        firing.kind.tag(),
        firing.symbol,
        if ref_change >= Decimal::ZERO { "+" } else { "" },
        ref_change.round_dp(2),
        rank_lookback_secs / 60,
        rank_part,
    )
}
