// src/watch/pumpfun.rs
//
// Pump.fun creation-event detection: scanning transaction logs for the
// Create instruction and decoding the inline event data into a typed
// candidate.

use borsh::{BorshDeserialize, BorshSerialize};
use chrono::{DateTime, Utc};
use serde_json::Value;
use solana_sdk::pubkey::Pubkey;
use tracing::debug;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Pump.fun Program ID
pub const PUMP_PROGRAM_ID: &str = "6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P";

/// Log line marking a Create instruction
pub const CREATE_MARKER: &str = "Program log: Instruction: Create";

/// Prefix of the log line carrying the base64 event payload
pub const PROGRAM_DATA_PREFIX: &str = "Program data: ";

/// Create event discriminator (first 8 bytes of the event payload).
/// Versions the decoding rule: a program upgrade that changes the event
/// layout changes these bytes and the decode degrades to "no event".
pub const CREATE_DISCRIMINATOR: [u8; 8] = [24, 30, 200, 40, 5, 28, 7, 119];

// ============================================================================
// EVENT STRUCTURES
// ============================================================================

/// The event emitted by Pump.fun when a new token is created, parsed from
/// the "Program data:" log line.
///
/// The first 8 bytes of the payload are the Anchor event discriminator and
/// must match [`CREATE_DISCRIMINATOR`] before the rest is deserialized.
#[derive(BorshDeserialize, BorshSerialize, Debug, Clone)]
pub struct PumpCreateEvent {
    /// Token name (e.g., "PEPE Coin")
    pub name: String,
    /// Token symbol (e.g., "PEPE")
    pub symbol: String,
    /// Metadata URI (usually IPFS)
    pub uri: String,
    /// The SPL token mint address
    pub mint: Pubkey,
    /// The bonding curve PDA
    pub bonding_curve: Pubkey,
    /// The creator (dev) wallet address
    pub user: Pubkey,
}

/// A partially-parsed creation event: everything the chain tells us before
/// the metadata lookup fills in the market data.
#[derive(Debug, Clone)]
pub struct CandidateEvent {
    pub mint: String,
    pub name: String,
    pub symbol: String,
    pub creator: String,
    pub bonding_curve: String,
    pub discovered_at: DateTime<Utc>,
}

impl From<PumpCreateEvent> for CandidateEvent {
    fn from(event: PumpCreateEvent) -> Self {
        Self {
            mint: event.mint.to_string(),
            name: event.name,
            symbol: event.symbol,
            creator: event.user.to_string(),
            bonding_curve: event.bonding_curve.to_string(),
            discovered_at: Utc::now(),
        }
    }
}

// ============================================================================
// EVENT PARSING
// ============================================================================

/// Parse a base64-encoded "Program data:" payload into a PumpCreateEvent.
///
/// Returns None if:
/// - the payload is not base64 or too short
/// - the discriminator doesn't match (expected for Buy/Sell events)
/// - Borsh deserialization fails
pub fn parse_create_event(base64_data: &str) -> Option<PumpCreateEvent> {
    use base64::{engine::general_purpose::STANDARD, Engine};

    let data = match STANDARD.decode(base64_data.trim()) {
        Ok(d) => d,
        Err(e) => {
            debug!("Failed to decode base64 program data: {:?}", e);
            return None;
        }
    };

    if data.len() <= 8 {
        debug!("Program data too short: {} bytes", data.len());
        return None;
    }

    // Discriminator check first; mismatches are the common case and stay
    // silent.
    if data[0..8] != CREATE_DISCRIMINATOR {
        return None;
    }

    match PumpCreateEvent::try_from_slice(&data[8..]) {
        Ok(event) => Some(event),
        Err(e) => {
            debug!("Create discriminator matched but Borsh failed: {:?}", e);
            None
        }
    }
}

/// Scan a transaction's log lines for a token creation.
///
/// Finds the Create instruction marker, then scans forward from that line
/// for inline program data and decodes it. Returns None when the logs carry
/// no creation — the expected common case, never an error.
pub fn scan_logs(logs: &[String]) -> Option<CandidateEvent> {
    let start = logs.iter().position(|line| line.contains(CREATE_MARKER))?;

    for line in &logs[start..] {
        if let Some(encoded) = line.strip_prefix(PROGRAM_DATA_PREFIX) {
            if let Some(event) = parse_create_event(encoded) {
                return Some(CandidateEvent::from(event));
            }
        }
    }
    None
}

/// Pull the log lines out of a decoded `logsNotification` frame.
///
/// Returns None for anything else: subscription acks, other notification
/// shapes, and failed transactions (non-null `err`).
pub fn notification_logs(frame: &Value) -> Option<Vec<String>> {
    let value = frame.get("params")?.get("result")?.get("value")?;

    if value.get("err").map_or(false, |err| !err.is_null()) {
        return None;
    }

    let logs = value.get("logs")?.as_array()?;
    Some(
        logs.iter()
            .filter_map(|line| line.as_str().map(String::from))
            .collect(),
    )
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine};
    use std::str::FromStr;

    fn sample_event() -> PumpCreateEvent {
        PumpCreateEvent {
            name: "Test Token".to_string(),
            symbol: "TEST".to_string(),
            uri: "ipfs://meta".to_string(),
            mint: Pubkey::new_unique(),
            bonding_curve: Pubkey::new_unique(),
            user: Pubkey::new_unique(),
        }
    }

    fn encode_event(event: &PumpCreateEvent) -> String {
        let mut bytes = CREATE_DISCRIMINATOR.to_vec();
        bytes.extend(event.try_to_vec().unwrap());
        STANDARD.encode(bytes)
    }

    #[test]
    fn test_parse_create_event_roundtrip() {
        let event = sample_event();
        let parsed = parse_create_event(&encode_event(&event)).unwrap();

        assert_eq!(parsed.name, "Test Token");
        assert_eq!(parsed.symbol, "TEST");
        assert_eq!(parsed.mint, event.mint);
        assert_eq!(parsed.bonding_curve, event.bonding_curve);
        assert_eq!(parsed.user, event.user);
    }

    #[test]
    fn test_parse_create_event_short_data() {
        let short_data = STANDARD.encode([0u8; 4]);
        assert!(parse_create_event(&short_data).is_none());
    }

    #[test]
    fn test_parse_create_event_wrong_discriminator() {
        let wrong_disc = STANDARD.encode([0u8, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        assert!(parse_create_event(&wrong_disc).is_none());
    }

    #[test]
    fn test_scan_logs_without_create_marker() {
        let logs = vec![
            "Program log: Instruction: Buy".to_string(),
            format!("{}{}", PROGRAM_DATA_PREFIX, encode_event(&sample_event())),
        ];
        // Valid payload, but no Create marker: not a creation.
        assert!(scan_logs(&logs).is_none());
    }

    #[test]
    fn test_scan_logs_finds_candidate() {
        let event = sample_event();
        let logs = vec![
            format!("Program {} invoke [1]", PUMP_PROGRAM_ID),
            CREATE_MARKER.to_string(),
            format!("{}{}", PROGRAM_DATA_PREFIX, encode_event(&event)),
            "Program consumed 12345 compute units".to_string(),
        ];

        let candidate = scan_logs(&logs).unwrap();
        assert_eq!(candidate.mint, event.mint.to_string());
        assert_eq!(candidate.symbol, "TEST");
        assert_eq!(candidate.creator, event.user.to_string());
    }

    #[test]
    fn test_scan_logs_ignores_data_before_marker() {
        let logs = vec![
            format!("{}{}", PROGRAM_DATA_PREFIX, encode_event(&sample_event())),
            CREATE_MARKER.to_string(),
        ];
        assert!(scan_logs(&logs).is_none());
    }

    #[test]
    fn test_scan_logs_skips_undecodable_data() {
        let logs = vec![
            CREATE_MARKER.to_string(),
            format!("{}not-base64!!!", PROGRAM_DATA_PREFIX),
        ];
        assert!(scan_logs(&logs).is_none());
    }

    #[test]
    fn test_notification_logs_extracts_lines() {
        let frame: Value = serde_json::from_str(
            r#"{"jsonrpc":"2.0","method":"logsNotification",
                "params":{"result":{"context":{"slot":1},
                "value":{"signature":"sig","err":null,"logs":["a","b"]}},
                "subscription":42}}"#,
        )
        .unwrap();

        assert_eq!(
            notification_logs(&frame).unwrap(),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn test_notification_logs_skips_ack_and_failed_tx() {
        let ack: Value = serde_json::from_str(r#"{"jsonrpc":"2.0","result":42,"id":1}"#).unwrap();
        assert!(notification_logs(&ack).is_none());

        let failed: Value = serde_json::from_str(
            r#"{"params":{"result":{"value":{"err":{"InstructionError":[0,"Custom"]},
                "logs":["a"]}}}}"#,
        )
        .unwrap();
        assert!(notification_logs(&failed).is_none());
    }

    #[test]
    fn test_program_id_is_valid_pubkey() {
        assert!(Pubkey::from_str(PUMP_PROGRAM_ID).is_ok());
    }
}
