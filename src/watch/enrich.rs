use std::sync::Arc;

use tracing::debug;

use crate::api::helius::TokenMetadataRecord;
use crate::api::HeliusClient;
use crate::error::EnrichmentError;
use crate::models::{BondingCurveKind, Pool, TokenEvent};

/// Turns a mint address into a complete [`TokenEvent`] via the metadata
/// service. Partial responses succeed with documented defaults; only a
/// failed request or an empty result set is an error.
pub struct MetadataEnricher {
    helius: Arc<HeliusClient>,
}

impl MetadataEnricher {
    pub fn new(helius: Arc<HeliusClient>) -> Self {
        Self { helius }
    }

    /// Look up one identifier and assemble the event record.
    ///
    /// `Transient` covers network errors and non-2xx responses; `Empty`
    /// means the service knows nothing about the mint and the caller
    /// should treat the candidate as "no event".
    pub async fn enrich(&self, mint: &str) -> Result<TokenEvent, EnrichmentError> {
        let records = self
            .helius
            .token_metadata(&[mint])
            .await
            .map_err(|e| EnrichmentError::Transient(e.to_string()))?;

        let record = records
            .into_iter()
            .next()
            .ok_or_else(|| EnrichmentError::Empty(mint.to_string()))?;

        debug!("Enriched {} with metadata", mint);
        Ok(build_event(mint, record))
    }
}

fn build_event(mint: &str, record: TokenMetadataRecord) -> TokenEvent {
    TokenEvent {
        mint: mint.to_string(),
        name: record.name.unwrap_or_else(|| "Unknown".to_string()),
        symbol: record.symbol.unwrap_or_else(|| "UNK".to_string()),
        liquidity: record.liquidity.unwrap_or_else(|| "0 SOL".to_string()),
        market_cap: record.market_cap.unwrap_or_else(|| "$0".to_string()),
        cost: record.price.unwrap_or(0.0).max(0.0),
        dev_holding: record
            .top_holders
            .first()
            .and_then(|holder| holder.percentage.clone())
            .unwrap_or_else(|| "0%".to_string()),
        // Revoked means the authority field is gone from the account.
        mint_authority_revoked: record.mint_authority.is_none(),
        freeze_authority_revoked: record.freeze_authority.is_none(),
        links: record.socials,
        bonding_curve_kind: BondingCurveKind::Linear,
        pool: Pool::Pumpfun,
        chart_url: TokenEvent::chart_url_for(mint),
    }
}
