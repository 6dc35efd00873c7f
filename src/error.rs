use std::time::Duration;

use thiserror::Error;

/// A stream frame that could not be decoded at all. Frames that decode fine
/// but simply carry no creation event are not errors.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed stream message: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure modes of the metadata lookup. Both cause the candidate to be
/// dropped; neither is retried on the spot.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("metadata lookup failed: {0}")]
    Transient(String),

    #[error("no metadata records returned for {0}")]
    Empty(String),
}

/// A rejected filter edit. The subscriber's previous config is left intact.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("{field} must be non-negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("min cost {min} exceeds max cost {max}")]
    InvertedBounds { min: f64, max: f64 },

    #[error("{field} holds a number and cannot be toggled")]
    NotToggleable { field: &'static str },

    #[error("{field} holds a flag and cannot take a number")]
    NotNumeric { field: &'static str },
}

/// Anything that ends a websocket session. Drives the monitor back to
/// `Disconnected` and schedules a reconnect.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("websocket error: {0}")]
    Ws(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("connect timed out after {0:?}")]
    ConnectTimeout(Duration),

    #[error("stream closed by remote")]
    Closed,

    #[error("subscription rejected: {0}")]
    SubscribeFailed(String),
}

/// A failed send to one recipient. Logged and skipped; never interrupts
/// fan-out to the remaining subscribers.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("telegram send failed: {0}")]
    Send(String),

    #[error("delivery timed out after {0:?}")]
    Timeout(Duration),
}
