//! Rate limiting and de-duplication ahead of notification

use super::types::{AcceptedAlert, AlertConfig, RejectReason};
use crate::pattern::Firing;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, VecDeque};

/// Applies the acceptance gates to each firing
///
/// Gate order is load-bearing: the rank filter runs before flood and dedup
/// so a burst of low-quality firings never consumes flood budget that a
/// rank-qualifying alert would need.
pub struct AlertGatekeeper {
    config: AlertConfig,
    last_accepted: HashMap<String, DateTime<Utc>>,
    flood_window: VecDeque<DateTime<Utc>>,
    last_message: Option<(String, DateTime<Utc>)>,
}

impl AlertGatekeeper {
    pub fn new(config: AlertConfig) -> Self {
        Self {
            config,
            last_accepted: HashMap::new(),
            flood_window: VecDeque::new(),
            last_message: None,
        }
    }

    /// Run one firing through every gate
    ///
    /// On acceptance the cooldown timestamp, flood record, and dedup text
    /// are all updated before returning.
    pub fn admit(
        &mut self,
        firing: &Firing,
        rank: Option<usize>,
        rank_ok: bool,
        message: String,
        now: DateTime<Utc>,
    ) -> Result<AcceptedAlert, RejectReason> {
        // 1. Per-symbol cooldown
        if let Some(last) = self.last_accepted.get(&firing.symbol) {
            let elapsed = now - *last;
            let cooldown = Duration::seconds(self.config.cooldown_secs as i64);
            if elapsed < cooldown {
                return Err(RejectReason::Cooldown {
                    remaining_secs: (cooldown - elapsed).num_seconds(),
                });
            }
        }

        // 2. Rank filter
        if !rank_ok {
            return Err(RejectReason::RankFilter { rank });
        }

        // 3. Global flood window
        self.prune_flood_window(now);
        if self.flood_window.len() >= self.config.flood_max_per_window {
            return Err(RejectReason::FloodWindow {
                accepted_in_window: self.flood_window.len(),
            });
        }

        // 4. Exact-text dedup against the previous accepted message
        if let Some((last_text, last_at)) = &self.last_message {
            let dedup = Duration::seconds(self.config.dedup_secs as i64);
            if *last_text == message && now - *last_at < dedup {
                return Err(RejectReason::DuplicateMessage);
            }
        }

        // 5. Accept
        self.last_accepted.insert(firing.symbol.clone(), now);
        self.flood_window.push_back(now);
        self.last_message = Some((message.clone(), now));

        Ok(AcceptedAlert {
            symbol: firing.symbol.clone(),
            kind: firing.kind,
            message,
            accepted_at: now,
        })
    }

    /// Seconds until a symbol's cooldown expires, if it is in cooldown
    pub fn cooldown_remaining(&self, symbol: &str, now: DateTime<Utc>) -> Option<i64> {
        let last = self.last_accepted.get(symbol)?;
        let cooldown = Duration::seconds(self.config.cooldown_secs as i64);
        let remaining = cooldown - (now - *last);
        if remaining > Duration::zero() {
            Some(remaining.num_seconds())
        } else {
            None
        }
    }

    /// Accepted alerts currently inside the flood window
    pub fn flood_window_len(&mut self, now: DateTime<Utc>) -> usize {
        self.prune_flood_window(now);
        self.flood_window.len()
    }

    fn prune_flood_window(&mut self, now: DateTime<Utc>) {
        let cutoff = now - Duration::seconds(self.config.flood_window_secs as i64);
        while let Some(front) = self.flood_window.front() {
            if *front < cutoff {
                self.flood_window.pop_front();
            } else {
                break;
            }
        }
    }
}
