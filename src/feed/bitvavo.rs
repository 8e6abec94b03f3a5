//! Bitvavo REST market data client

use super::{MarketDataSource, PriceMap};
use crate::config::FeedConfig;
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

/// Market listing entry from `GET /markets`
#[derive(Debug, Deserialize)]
struct MarketEntry {
    market: String,
    status: String,
}

/// Ticker entry from `GET /ticker/price`
///
/// Price is absent for markets that have never traded.
#[derive(Debug, Deserialize)]
struct TickerEntry {
    market: String,
    price: Option<String>,
}

/// REST client for the Bitvavo spot API
pub struct BitvavoClient {
    config: FeedConfig,
    client: Client,
}

impl BitvavoClient {
    pub fn new(config: FeedConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    /// GET with bounded linear-backoff retry
    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        let url = format!("{}{}", self.config.base_url, path);
        let mut last_err = anyhow::anyhow!("no attempts made");

        for attempt in 1..=self.config.retry_attempts {
            match self.client.get(&url).send().await {
                Ok(response) if response.status().is_success() => {
                    return Ok(response.json::<T>().await?);
                }
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    let snippet: String = body.chars().take(200).collect();
                    last_err = anyhow::anyhow!("GET {url} status={status} body={snippet}");
                }
                Err(e) => {
                    last_err = anyhow::anyhow!("GET {url} failed: {e}");
                }
            }
            tokio::time::sleep(Duration::from_millis(
                self.config.retry_backoff_ms * attempt as u64,
            ))
            .await;
        }

        Err(last_err.context(format!(
            "request failed after {} attempts",
            self.config.retry_attempts
        )))
    }

    fn parse_universe(&self, entries: Vec<MarketEntry>) -> Vec<String> {
        let mut markets: Vec<String> = entries
            .into_iter()
            .filter(|m| m.status.eq_ignore_ascii_case("trading"))
            .map(|m| m.market.to_uppercase())
            .filter(|m| m.ends_with(&self.config.quote_suffix))
            .collect();
        markets.sort();
        markets.dedup();
        markets
    }

    fn parse_prices(entries: Vec<TickerEntry>, quote_suffix: &str) -> PriceMap {
        entries
            .into_iter()
            .filter(|t| t.market.ends_with(quote_suffix))
            .filter_map(|t| {
                let price = Decimal::from_str(t.price.as_deref()?).ok()?;
                (price > Decimal::ZERO).then(|| (t.market, price))
            })
            .collect()
    }
}

#[async_trait]
impl MarketDataSource for BitvavoClient {
    async fn fetch_prices(&self) -> anyhow::Result<PriceMap> {
        let entries: Vec<TickerEntry> = self.get_json("/ticker/price").await?;
        let prices = Self::parse_prices(entries, &self.config.quote_suffix);
        tracing::debug!(count = prices.len(), "fetched ticker prices");
        Ok(prices)
    }

    async fn fetch_universe(&self) -> anyhow::Result<Vec<String>> {
        let entries: Vec<MarketEntry> = self.get_json("/markets").await?;
        let universe = self.parse_universe(entries);
        tracing::info!(count = universe.len(), "loaded tradable universe");
        Ok(universe)
    }
}
