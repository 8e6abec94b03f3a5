//! Alert gatekeeping
//!
//! Cooldown, rank filtering, global flood control, and message
//! de-duplication applied, in that order, before any notification leaves
//! the engine.

mod gatekeeper;
mod types;

pub use gatekeeper::AlertGatekeeper;
pub use types::{AcceptedAlert, AlertConfig, RejectReason};
