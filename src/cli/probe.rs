//! Probe command implementation
//!
//! One-shot fetch for checking feed connectivity and configuration.

use crate::config::Config;
use crate::feed::{BitvavoClient, MarketDataSource};
use clap::Args;

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Print every tracked symbol instead of a count
    #[arg(short, long)]
    pub verbose: bool,
}

impl ProbeArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let client = BitvavoClient::new(config.feed.clone())?;

        let universe = client.fetch_universe().await?;
        let prices = client.fetch_prices().await?;

        println!("universe: {} symbols", universe.len());
        println!("prices:   {} symbols", prices.len());
        if self.verbose {
            for symbol in &universe {
                match prices.get(symbol) {
                    Some(price) => println!("  {symbol} {price}"),
                    None => println!("  {symbol} (no price)"),
                }
            }
        }
        Ok(())
    }
}
