//! Gatekeeper types and configuration

use crate::pattern::PatternKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Gatekeeper configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AlertConfig {
    /// Minimum time between accepted alerts for the same symbol (seconds)
    ///
    /// Must be at least the outcome follow-up window so a symbol can never
    /// carry two open predictions; `Config::validate` enforces this.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,

    /// Maximum accepted alerts inside the rolling flood window, all symbols
    #[serde(default = "default_flood_max_per_window")]
    pub flood_max_per_window: usize,

    /// Length of the rolling flood window (seconds)
    #[serde(default = "default_flood_window_secs")]
    pub flood_window_secs: u64,

    /// Window for exact-text de-duplication (seconds)
    #[serde(default = "default_dedup_secs")]
    pub dedup_secs: u64,
}

fn default_cooldown_secs() -> u64 {
    900
}
fn default_flood_max_per_window() -> usize {
    6
}
fn default_flood_window_secs() -> u64 {
    300
}
fn default_dedup_secs() -> u64 {
    60
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: default_cooldown_secs(),
            flood_max_per_window: default_flood_max_per_window(),
            flood_window_secs: default_flood_window_secs(),
            dedup_secs: default_dedup_secs(),
        }
    }
}

/// Why a firing was dropped before notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RejectReason {
    /// Symbol alerted too recently
    Cooldown { remaining_secs: i64 },
    /// Symbol is unranked or outside the top-K filter
    RankFilter { rank: Option<usize> },
    /// Global flood window budget exhausted
    FloodWindow { accepted_in_window: usize },
    /// Rendered text matches the immediately preceding accepted message
    DuplicateMessage,
}

/// A firing that cleared every gate and is ready for delivery
#[derive(Debug, Clone)]
pub struct AcceptedAlert {
    pub symbol: String,
    pub kind: PatternKind,
    pub message: String,
    pub accepted_at: DateTime<Utc>,
}
