//! Periodic worker loops
//!
//! Independent tokio tasks for ingestion, analysis, outcome evaluation,
//! universe refresh, and the status summary. Every network call happens
//! outside the engine lock, and no cycle error ever escapes a loop.

use super::Engine;
use crate::config::EngineConfig;
use crate::feed::MarketDataSource;
use crate::notify::Notifier;
use crate::telemetry::{self, CounterMetric};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Spawn all worker loops and return their handles
pub fn spawn_workers(
    engine: Arc<Engine>,
    source: Arc<dyn MarketDataSource>,
    notifier: Arc<dyn Notifier>,
    config: EngineConfig,
) -> Vec<JoinHandle<()>> {
    vec![
        spawn_universe_loop(
            engine.clone(),
            source.clone(),
            config.universe_refresh_secs,
        ),
        spawn_price_loop(engine.clone(), source, config.price_poll_secs),
        spawn_analysis_loop(engine.clone(), notifier, config.analysis_secs),
        spawn_outcome_loop(engine.clone(), config.outcome_secs),
        spawn_summary_loop(engine, config.summary_secs),
    ]
}

fn spawn_universe_loop(
    engine: Arc<Engine>,
    source: Arc<dyn MarketDataSource>,
    period_secs: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(period_secs));
        loop {
            interval.tick().await;
            match source.fetch_universe().await {
                Ok(symbols) if !symbols.is_empty() => engine.set_universe(symbols),
                Ok(_) => tracing::warn!("universe fetch returned no symbols, keeping previous"),
                Err(e) => {
                    telemetry::increment(CounterMetric::UniverseFetchFailures);
                    tracing::warn!(error = %e, "universe fetch failed, retrying next cycle");
                }
            }
        }
    })
}

fn spawn_price_loop(
    engine: Arc<Engine>,
    source: Arc<dyn MarketDataSource>,
    period_secs: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(period_secs));
        loop {
            interval.tick().await;
            match source.fetch_prices().await {
                Ok(prices) => engine.ingest_batch(Utc::now(), &prices),
                Err(e) => {
                    telemetry::increment(CounterMetric::PriceFetchFailures);
                    tracing::warn!(error = %e, "price fetch failed, skipping cycle");
                }
            }
        }
    })
}

fn spawn_analysis_loop(
    engine: Arc<Engine>,
    notifier: Arc<dyn Notifier>,
    period_secs: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(period_secs));
        loop {
            interval.tick().await;
            let alerts = engine.run_analysis_cycle(Utc::now());
            // Delivery happens with the lock long released; a slow channel
            // cannot stall analysis
            for alert in alerts {
                if let Err(e) = notifier.send(&alert.message).await {
                    tracing::warn!(
                        symbol = %alert.symbol,
                        error = %e,
                        "notification delivery failed"
                    );
                }
            }
        }
    })
}

fn spawn_outcome_loop(engine: Arc<Engine>, period_secs: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(period_secs));
        loop {
            interval.tick().await;
            let _ = engine.run_outcome_cycle(Utc::now());
        }
    })
}

fn spawn_summary_loop(engine: Arc<Engine>, period_secs: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(period_secs));
        loop {
            interval.tick().await;
            let status = engine.status(Utc::now());
            tracing::info!(
                heat = %status.heat,
                multiplier = %status.threshold_multiplier,
                step_pct = %status.thresholds.step_pct,
                universe = status.universe_size,
                open = status.open_predictions,
                closed = status.closed_total,
                win_rate = ?status.overall_win_rate,
                "engine summary"
            );
        }
    })
}
