use anyhow::{Context, Result};
use solana_sdk::commitment_config::CommitmentConfig;
use std::env;
use std::time::Duration;

use crate::watch::backfill::DEFAULT_BACKFILL_LIMIT;
use crate::watch::pumpfun::PUMP_PROGRAM_ID;

#[derive(Clone, Debug)]
pub struct Config {
    pub telegram_bot_token: String,

    pub helius_api_key: String,
    pub helius_ws_url: String,
    /// Override for the REST base URL; None uses the client default.
    pub helius_api_url: Option<String>,

    pub program_id: String,
    pub commitment: CommitmentConfig,

    pub backfill_limit: usize,
    pub connect_timeout: Duration,
    pub reconnect_delay: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        let helius_api_key =
            env::var("HELIUS_API_KEY").context("HELIUS_API_KEY not set in environment")?;

        let helius_ws_url = env::var("HELIUS_WS_URL")
            .unwrap_or_else(|_| format!("wss://mainnet.helius-rpc.com/?api-key={}", helius_api_key));

        let commitment = match env::var("COMMITMENT")
            .unwrap_or_else(|_| "confirmed".to_string())
            .as_str()
        {
            "processed" => CommitmentConfig::processed(),
            "finalized" => CommitmentConfig::finalized(),
            _ => CommitmentConfig::confirmed(),
        };

        Ok(Self {
            telegram_bot_token: env::var("TELEGRAM_BOT_TOKEN")
                .context("TELEGRAM_BOT_TOKEN not set in environment")?,

            helius_api_key,
            helius_ws_url,
            helius_api_url: env::var("HELIUS_API_URL").ok(),

            program_id: env::var("PUMP_PROGRAM_ID").unwrap_or_else(|_| PUMP_PROGRAM_ID.to_string()),
            commitment,

            // Defaults from environment or hardcoded fallbacks
            backfill_limit: env::var("BACKFILL_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_BACKFILL_LIMIT),
            connect_timeout: Duration::from_secs(
                env::var("CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            ),
            reconnect_delay: Duration::from_secs(
                env::var("RECONNECT_DELAY_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10),
            ),
        })
    }
}
