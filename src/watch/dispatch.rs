use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{debug, error, info};

use crate::bot::notification::format_token_alert;
use crate::error::DeliveryError;
use crate::models::TokenEvent;
use crate::registry::SubscriptionRegistry;
use crate::watch::filter;

/// Bound on a single send so one unresponsive recipient cannot stall the
/// pipeline.
const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Where matching alerts go. Production uses the Telegram sink; tests plug
/// in recorders.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), DeliveryError>;
}

/// Fans one enriched event out to every subscriber whose filter it passes.
pub struct Dispatcher<S: AlertSink> {
    registry: Arc<SubscriptionRegistry>,
    sink: S,
    delivery_timeout: Duration,
}

impl<S: AlertSink> Dispatcher<S> {
    pub fn new(registry: Arc<SubscriptionRegistry>, sink: S) -> Self {
        Self::with_timeout(registry, sink, DELIVERY_TIMEOUT)
    }

    pub fn with_timeout(
        registry: Arc<SubscriptionRegistry>,
        sink: S,
        delivery_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            sink,
            delivery_timeout,
        }
    }

    /// Deliver `event` to every matching subscriber. A failed or timed-out
    /// send is logged and skipped; the remaining subscribers still get
    /// their attempt. Returns how many deliveries succeeded.
    pub async fn dispatch(&self, event: &TokenEvent) -> usize {
        let subscribers = self.registry.subscribers().await;
        if subscribers.is_empty() {
            debug!("No subscribers, dropping {} ({})", event.name, event.mint);
            return 0;
        }

        let text = format_token_alert(event);
        let mut delivered = 0;

        for chat_id in subscribers {
            let config = self.registry.filter_for(chat_id).await;
            if !filter::matches(event, &config) {
                continue;
            }

            match timeout(self.delivery_timeout, self.sink.send(chat_id, &text)).await {
                Ok(Ok(())) => {
                    debug!("Alert for {} delivered to chat {}", event.symbol, chat_id);
                    delivered += 1;
                }
                Ok(Err(e)) => {
                    error!("Failed to deliver {} to chat {}: {}", event.symbol, chat_id, e);
                }
                Err(_) => {
                    let e = DeliveryError::Timeout(self.delivery_timeout);
                    error!("Failed to deliver {} to chat {}: {}", event.symbol, chat_id, e);
                }
            }
        }

        if delivered > 0 {
            info!("📨 {} ({}) delivered to {} chat(s)", event.name, event.symbol, delivered);
        }
        delivered
    }
}
