use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

// Verified base URL
const HELIUS_API_URL: &str = "https://api.helius.xyz";

/// Bound on every outbound request so a slow endpoint can never stall the
/// receive loop.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct HeliusClient {
    api_key: String,
    base_url: String,
    client: Client,
}

// --- Response Structs ---

/// One record from the `/v0/tokens/metadata` endpoint. Every field is
/// optional; absences resolve to defaults at the enrichment layer.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenMetadataRecord {
    pub name: Option<String>,
    pub symbol: Option<String>,
    /// Display-formatted, e.g. "12.3 SOL"
    pub liquidity: Option<String>,
    /// Display-formatted, e.g. "$4.2K"
    pub market_cap: Option<String>,
    /// Price in SOL
    pub price: Option<f64>,
    pub top_holders: Vec<TopHolder>,
    /// Present only while the authority has not been revoked
    pub mint_authority: Option<String>,
    pub freeze_authority: Option<String>,
    pub socials: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TopHolder {
    /// Display-formatted share, e.g. "12%"
    pub percentage: Option<String>,
}

/// One record from the `/v0/transactions` history endpoint, reduced to the
/// log lines the parser consumes. Both `logMessages` and the older `logs`
/// key are accepted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionRecord {
    pub signature: Option<String>,
    #[serde(alias = "logs")]
    pub log_messages: Vec<String>,
}

// --- Helius Client Implementation ---

impl HeliusClient {
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(api_key, HELIUS_API_URL)
    }

    /// Point the client at a different host. Tests use this to talk to a
    /// local mock server.
    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client for Helius"),
        }
    }

    /// Fetch metadata records for a batch of mint addresses. An unknown
    /// mint yields an empty vec, not an error.
    pub async fn token_metadata(&self, mints: &[&str]) -> Result<Vec<TokenMetadataRecord>> {
        let url = format!("{}/v0/tokens/metadata", self.base_url);

        debug!("Fetching token metadata for {} mint(s)", mints.len());

        let response = self
            .client
            .get(&url)
            .query(&[("api-key", self.api_key.as_str())])
            .query(&[("mintAccounts", mints.join(",").as_str())])
            .send()
            .await
            .context("Failed to send request to Helius token metadata API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Helius token metadata API error: {} - {}", status, error_text);
        }

        response
            .json()
            .await
            .context("Failed to parse Helius token metadata response")
    }

    /// Fetch the most recent CREATE transactions for a program, oldest
    /// first as the endpoint returns them.
    pub async fn create_transactions(&self, program_id: &str) -> Result<Vec<TransactionRecord>> {
        let url = format!("{}/v0/transactions", self.base_url);

        debug!("Fetching recent CREATE transactions for {}", program_id);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("api-key", self.api_key.as_str()),
                ("programId", program_id),
                ("type", "CREATE"),
            ])
            .send()
            .await
            .context("Failed to send request to Helius transactions API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Helius transactions API error: {} - {}", status, error_text);
        }

        response
            .json()
            .await
            .context("Failed to parse Helius transactions response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_token_metadata_parses_records() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v0/tokens/metadata")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"name":"Pepe","symbol":"PEPE","price":0.0021,
                     "topHolders":[{"percentage":"9%"}],
                     "mintAuthority":"SomeKey","socials":["https://t.me/pepe"]}]"#,
            )
            .create_async()
            .await;

        let client = HeliusClient::with_base_url("test-key", &server.url());
        let records = client.token_metadata(&["Mint111"]).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name.as_deref(), Some("Pepe"));
        assert_eq!(records[0].price, Some(0.0021));
        assert_eq!(records[0].top_holders[0].percentage.as_deref(), Some("9%"));
        assert!(records[0].mint_authority.is_some());
        assert!(records[0].freeze_authority.is_none());
        assert_eq!(records[0].socials, vec!["https://t.me/pepe".to_string()]);
    }

    #[tokio::test]
    async fn test_token_metadata_non_2xx_is_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v0/tokens/metadata")
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let client = HeliusClient::with_base_url("test-key", &server.url());
        assert!(client.token_metadata(&["Mint111"]).await.is_err());
    }

    #[tokio::test]
    async fn test_create_transactions_accepts_both_log_keys() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v0/transactions")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"signature":"sig1","logMessages":["a"]},
                    {"signature":"sig2","logs":["b"]}]"#,
            )
            .create_async()
            .await;

        let client = HeliusClient::with_base_url("test-key", &server.url());
        let txs = client.create_transactions("Program111").await.unwrap();

        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].log_messages, vec!["a".to_string()]);
        assert_eq!(txs[1].log_messages, vec!["b".to_string()]);
    }
}
