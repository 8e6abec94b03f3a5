//! Configuration types for surgewatch

use crate::adaptive::AdaptiveConfig;
use crate::alert::AlertConfig;
use crate::heat::HeatConfig;
use crate::outcome::OutcomeConfig;
use crate::pattern::ThresholdConfig;
use crate::rank::RankConfig;
use serde::Deserialize;
use thiserror::Error;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub buffer: BufferConfig,
    #[serde(default)]
    pub heat: HeatConfig,
    #[serde(default)]
    pub rank: RankConfig,
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub alert: AlertConfig,
    #[serde(default)]
    pub outcome: OutcomeConfig,
    #[serde(default)]
    pub adaptive: AdaptiveConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Market data source configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// REST base URL of the exchange
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Quote-currency suffix the universe is filtered to
    #[serde(default = "default_quote_suffix")]
    pub quote_suffix: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Attempts per request before the cycle gives up
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Linear backoff base between attempts (milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_base_url() -> String {
    "https://api.bitvavo.com/v2".to_string()
}
fn default_quote_suffix() -> String {
    "-EUR".to_string()
}
fn default_request_timeout_secs() -> u64 {
    8
}
fn default_retry_attempts() -> u32 {
    3
}
fn default_retry_backoff_ms() -> u64 {
    600
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            quote_suffix: default_quote_suffix(),
            request_timeout_secs: default_request_timeout_secs(),
            retry_attempts: default_retry_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Price buffer configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BufferConfig {
    /// Per-symbol sample retention (seconds)
    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,
}

fn default_retention_secs() -> u64 {
    1200
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            retention_secs: default_retention_secs(),
        }
    }
}

/// Worker loop periods
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Price fetch period (seconds)
    #[serde(default = "default_price_poll_secs")]
    pub price_poll_secs: u64,

    /// Analysis cycle period (seconds)
    #[serde(default = "default_analysis_secs")]
    pub analysis_secs: u64,

    /// Outcome evaluation period (seconds)
    #[serde(default = "default_outcome_secs")]
    pub outcome_secs: u64,

    /// Universe refresh period (seconds)
    #[serde(default = "default_universe_refresh_secs")]
    pub universe_refresh_secs: u64,

    /// Status summary log period (seconds)
    #[serde(default = "default_summary_secs")]
    pub summary_secs: u64,
}

fn default_price_poll_secs() -> u64 {
    5
}
fn default_analysis_secs() -> u64 {
    5
}
fn default_outcome_secs() -> u64 {
    10
}
fn default_universe_refresh_secs() -> u64 {
    3600
}
fn default_summary_secs() -> u64 {
    300
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            price_poll_secs: default_price_poll_secs(),
            analysis_secs: default_analysis_secs(),
            outcome_secs: default_outcome_secs(),
            universe_refresh_secs: default_universe_refresh_secs(),
            summary_secs: default_summary_secs(),
        }
    }
}

/// Notification configuration
///
/// With no bot token configured, alerts are logged instead of delivered.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct NotifyConfig {
    #[serde(default)]
    pub telegram_bot_token: Option<String>,
    #[serde(default)]
    pub telegram_chat_id: Option<String>,
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_metrics_port() -> u16 {
    9090
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            metrics_port: default_metrics_port(),
            log_level: default_log_level(),
        }
    }
}

/// Configuration-time invariant violations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cooldown ({cooldown_secs}s) must be at least the follow-up window ({follow_up_secs}s)")]
    CooldownShorterThanFollowUp {
        cooldown_secs: u64,
        follow_up_secs: u64,
    },
    #[error("strong_sequence must not be empty")]
    EmptyStrongSequence,
    #[error("adaptive low water mark must be below the high water mark")]
    InvertedWaterMarks,
    #[error("threshold {name} = {value} outside its bounds [{min}, {max}]")]
    ThresholdOutOfBounds {
        name: &'static str,
        value: String,
        min: String,
        max: String,
    },
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check configuration-time invariants
    ///
    /// The cooldown/follow-up ordering is what guarantees at most one open
    /// prediction per symbol, so it is rejected here rather than left to
    /// operator discipline.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.alert.cooldown_secs < self.outcome.follow_up_secs {
            return Err(ConfigError::CooldownShorterThanFollowUp {
                cooldown_secs: self.alert.cooldown_secs,
                follow_up_secs: self.outcome.follow_up_secs,
            });
        }
        if self.thresholds.strong_sequence.is_empty() {
            return Err(ConfigError::EmptyStrongSequence);
        }
        if self.adaptive.low_water_mark >= self.adaptive.high_water_mark {
            return Err(ConfigError::InvertedWaterMarks);
        }

        let b = &self.adaptive.bounds;
        if self.thresholds.step_pct < b.step_pct_min || self.thresholds.step_pct > b.step_pct_max {
            return Err(ConfigError::ThresholdOutOfBounds {
                name: "step_pct",
                value: self.thresholds.step_pct.to_string(),
                min: b.step_pct_min.to_string(),
                max: b.step_pct_max.to_string(),
            });
        }
        let first = self.thresholds.strong_sequence[0];
        if first < b.sequence_first_min || first > b.sequence_first_max {
            return Err(ConfigError::ThresholdOutOfBounds {
                name: "strong_sequence[0]",
                value: first.to_string(),
                min: b.sequence_first_min.to_string(),
                max: b.sequence_first_max.to_string(),
            });
        }
        Ok(())
    }
}
