//! Market data source
//!
//! Pull-based REST polling of spot prices and the tradable universe.

mod bitvavo;
mod types;

pub use bitvavo::BitvavoClient;
pub use types::PriceMap;

use async_trait::async_trait;

/// Trait for market data source implementations
///
/// Both calls are best-effort: a failed cycle is skipped and retried on the
/// next period by the caller.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Latest price per tradable symbol
    async fn fetch_prices(&self) -> anyhow::Result<PriceMap>;

    /// Symbols currently tradable in the configured quote currency
    async fn fetch_universe(&self) -> anyhow::Result<Vec<String>>;
}
