//! CLI interface for surgewatch
//!
//! Provides subcommands for:
//! - `run`: start the alert engine
//! - `probe`: one-shot universe and price fetch
//! - `config`: show the effective configuration

mod probe;
mod run;

pub use probe::ProbeArgs;
pub use run::RunArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "surgewatch")]
#[command(about = "Self-calibrating momentum alert engine for crypto spot markets")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the alert engine
    Run(RunArgs),
    /// One-shot fetch of the universe and current prices
    Probe(ProbeArgs),
    /// Show the effective configuration
    Config,
}
