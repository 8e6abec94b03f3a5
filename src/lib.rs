//! surgewatch: self-calibrating momentum alert engine for crypto spot markets
//!
//! This library provides the core components for:
//! - Bounded per-symbol price history with lookback queries
//! - Market heat estimation and threshold scaling
//! - Relative momentum ranking across the tracked universe
//! - Edge-triggered step and strong-sequence pattern detection
//! - Alert gatekeeping (cooldown, rank filter, flood control, dedup)
//! - Prediction outcome tracking against a follow-up window
//! - Adaptive threshold control from batch win rates
//! - REST market data polling and Telegram alert delivery
//! - Logging and metrics

pub mod adaptive;
pub mod alert;
pub mod buffer;
pub mod cli;
pub mod config;
pub mod engine;
pub mod feed;
pub mod heat;
pub mod notify;
pub mod outcome;
pub mod pattern;
pub mod rank;
pub mod telemetry;
