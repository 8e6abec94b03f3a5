//! Run command implementation

use crate::config::Config;
use crate::engine::{spawn_workers, Engine};
use crate::feed::BitvavoClient;
use crate::notify;
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct RunArgs {}

impl RunArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let source = Arc::new(BitvavoClient::new(config.feed.clone())?);
        let notifier = notify::from_config(&config.notify)?;
        let engine = Arc::new(Engine::new(config));

        tracing::info!(
            base_url = %config.feed.base_url,
            quote_suffix = %config.feed.quote_suffix,
            "starting alert engine"
        );

        let handles = spawn_workers(engine, source, notifier, config.engine.clone());

        tokio::signal::ctrl_c().await?;
        tracing::info!("shutdown signal received");
        for handle in handles {
            handle.abort();
        }
        Ok(())
    }
}
