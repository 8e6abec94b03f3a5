//! Prometheus metrics

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Smoothed market heat
    Heat,
    /// Current step-pattern threshold percent
    StepThresholdPct,
    /// Open prediction count
    OpenPredictions,
    /// Win rate of the last adaptation batch
    WinRate,
    /// Tracked universe size
    UniverseSize,
}

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Alerts that cleared every gate
    AlertsAccepted,
    /// Firings dropped by the gatekeeper
    AlertsRejected,
    /// Predictions closed (hit or miss)
    PredictionsClosed,
    /// Failed price poll cycles
    PriceFetchFailures,
    /// Failed universe refresh cycles
    UniverseFetchFailures,
}

impl GaugeMetric {
    fn name(&self) -> &'static str {
        match self {
            GaugeMetric::Heat => "surgewatch_heat",
            GaugeMetric::StepThresholdPct => "surgewatch_step_threshold_pct",
            GaugeMetric::OpenPredictions => "surgewatch_open_predictions",
            GaugeMetric::WinRate => "surgewatch_batch_win_rate",
            GaugeMetric::UniverseSize => "surgewatch_universe_size",
        }
    }
}

impl CounterMetric {
    fn name(&self) -> &'static str {
        match self {
            CounterMetric::AlertsAccepted => "surgewatch_alerts_accepted_total",
            CounterMetric::AlertsRejected => "surgewatch_alerts_rejected_total",
            CounterMetric::PredictionsClosed => "surgewatch_predictions_closed_total",
            CounterMetric::PriceFetchFailures => "surgewatch_price_fetch_failures_total",
            CounterMetric::UniverseFetchFailures => "surgewatch_universe_fetch_failures_total",
        }
    }
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    metrics::gauge!(metric.name()).set(value);
}

/// Increment a counter by one
pub fn increment(metric: CounterMetric) {
    metrics::counter!(metric.name()).increment(1);
}
