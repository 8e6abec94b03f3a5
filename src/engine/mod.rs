//! Detection engine
//!
//! Owns all shared mutable state behind one coarse lock and drives the
//! per-cycle pipeline: heat estimate, rank resolution, pattern scan,
//! gatekeeping, prediction opening and closing, adaptive feedback.

mod loops;
mod state;
mod types;

pub use loops::spawn_workers;
pub use state::Engine;
pub use types::{StatusSnapshot, SymbolDiagnostics};
