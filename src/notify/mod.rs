//! Alert delivery
//!
//! Fire-and-forget notification to the configured channel. Failures are
//! logged and never retried here; retry policy belongs to the channel.

mod telegram;

pub use telegram::TelegramNotifier;

use crate::config::NotifyConfig;
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for notification sinks
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one alert message
    async fn send(&self, text: &str) -> anyhow::Result<()>;
}

/// Fallback sink that writes alerts to the log
///
/// Used when no Telegram credentials are configured, so the engine can run
/// end to end in a dry setup.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, text: &str) -> anyhow::Result<()> {
        tracing::info!(alert = text, "alert (log only)");
        Ok(())
    }
}

/// Build the notifier the config asks for
pub fn from_config(config: &NotifyConfig) -> anyhow::Result<Arc<dyn Notifier>> {
    match (&config.telegram_bot_token, &config.telegram_chat_id) {
        (Some(token), Some(chat_id)) => Ok(Arc::new(TelegramNotifier::new(
            token.clone(),
            chat_id.clone(),
        )?)),
        _ => {
            tracing::warn!("no telegram credentials configured, logging alerts instead");
            Ok(Arc::new(LogNotifier))
        }
    }
}
