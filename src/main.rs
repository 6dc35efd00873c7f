use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;
use teloxide::prelude::*;
use tokio::sync::broadcast;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod api;
mod bot;
mod config;
mod error;
mod models;
mod registry;
mod watch;

use crate::api::HeliusClient;
use crate::bot::notification::TelegramSink;
use crate::bot::BotState;
use crate::config::Config;
use crate::registry::SubscriptionRegistry;
use crate::watch::backfill::BackfillReconciler;
use crate::watch::dispatch::Dispatcher;
use crate::watch::enrich::MetadataEnricher;
use crate::watch::monitor::{EventPipeline, MonitorConfig, TokenMonitor};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load environment variables
    dotenv().ok();

    let config = Arc::new(Config::load()?);
    info!("Configuration loaded successfully");

    let registry = Arc::new(SubscriptionRegistry::new());

    let helius = Arc::new(match config.helius_api_url.as_deref() {
        Some(url) => HeliusClient::with_base_url(&config.helius_api_key, url),
        None => HeliusClient::new(&config.helius_api_key),
    });
    info!("Helius client initialized");

    let bot = Bot::new(&config.telegram_bot_token);

    let monitor = TokenMonitor::new(
        MonitorConfig {
            websocket_url: config.helius_ws_url.clone(),
            program_id: config.program_id.clone(),
            commitment: config.commitment,
            connect_timeout: config.connect_timeout,
            reconnect_delay: config.reconnect_delay,
        },
        BackfillReconciler::new(
            helius.clone(),
            config.program_id.clone(),
            config.backfill_limit,
        ),
        EventPipeline::new(
            MetadataEnricher::new(helius),
            Dispatcher::new(registry.clone(), TelegramSink::new(bot.clone())),
        ),
    );

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let monitor_handle = tokio::spawn(async move { monitor.run(shutdown_rx).await });
    info!("Token monitor started");

    let state = Arc::new(BotState {
        registry,
        config: config.clone(),
    });

    info!("Starting Mintwatch bot...");
    bot::commands::start_bot(bot, state).await?;

    // Bot dispatcher returned (ctrl-c): abandon the monitor promptly.
    let _ = shutdown_tx.send(());
    monitor_handle.abort();
    let _ = monitor_handle.await;

    Ok(())
}
