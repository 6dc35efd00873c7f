// src/watch/monitor.rs
//
// Live token discovery over the Helius WebSocket logsSubscribe stream.
// Owns the connection state machine and drives every inbound frame
// through the parse -> enrich -> dispatch pipeline in arrival order.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use solana_sdk::commitment_config::CommitmentConfig;
use tokio::sync::{broadcast, RwLock};
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::error::{ConnectionError, EnrichmentError, ParseError};
use crate::watch::backfill::BackfillReconciler;
use crate::watch::dispatch::{AlertSink, Dispatcher};
use crate::watch::enrich::MetadataEnricher;
use crate::watch::pumpfun::{notification_logs, scan_logs, CandidateEvent, PUMP_PROGRAM_ID};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Configuration for the creation monitor
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Helius WebSocket URL (include API key)
    pub websocket_url: String,
    /// Program whose logs we subscribe to
    pub program_id: String,
    /// Commitment level for the subscription
    pub commitment: CommitmentConfig,
    /// Bound on the websocket connect
    pub connect_timeout: Duration,
    /// Fixed delay between reconnect attempts
    pub reconnect_delay: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            websocket_url: String::new(),
            program_id: PUMP_PROGRAM_ID.to_string(),
            commitment: CommitmentConfig::confirmed(),
            connect_timeout: Duration::from_secs(30),
            reconnect_delay: Duration::from_secs(10),
        }
    }
}

/// Connection lifecycle of the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Disconnected,
    Connecting,
    Subscribed,
    Receiving,
}

/// Counters for observability.
#[derive(Debug, Default, Clone)]
pub struct MonitorStats {
    /// Total frames received off the stream
    pub messages_received: u64,
    /// Creation events detected (whether or not enrichment succeeded)
    pub events_detected: u64,
    /// Frames that were not valid JSON
    pub parse_failures: u64,
    /// Candidates dropped on a failed metadata lookup
    pub enrichment_failures: u64,
    /// Completed reconnect cycles
    pub reconnects: u32,
}

// ============================================================================
// EVENT PIPELINE
// ============================================================================

/// Outcome of pushing one set of log lines through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// No creation event in the logs (or the service had no record of it)
    NoEvent,
    /// Event enriched and fanned out to this many subscribers
    Dispatched(usize),
    /// Candidate detected but dropped on a transient enrichment failure
    EnrichmentFailed,
}

/// The shared parse -> enrich -> dispatch path. Live frames and backfill
/// candidates both come through here.
pub struct EventPipeline<S: AlertSink> {
    enricher: MetadataEnricher,
    dispatcher: Dispatcher<S>,
}

impl<S: AlertSink> EventPipeline<S> {
    pub fn new(enricher: MetadataEnricher, dispatcher: Dispatcher<S>) -> Self {
        Self {
            enricher,
            dispatcher,
        }
    }

    pub async fn process_logs(&self, logs: &[String]) -> PipelineOutcome {
        match scan_logs(logs) {
            Some(candidate) => self.process_candidate(candidate).await,
            None => PipelineOutcome::NoEvent,
        }
    }

    pub async fn process_candidate(&self, candidate: CandidateEvent) -> PipelineOutcome {
        info!(
            "🚀 New token: {} ({}) mint {} by {}",
            candidate.name, candidate.symbol, candidate.mint, candidate.creator
        );

        match self.enricher.enrich(&candidate.mint).await {
            Ok(event) => PipelineOutcome::Dispatched(self.dispatcher.dispatch(&event).await),
            Err(EnrichmentError::Empty(mint)) => {
                debug!("No metadata for {}, treating as no event", mint);
                PipelineOutcome::NoEvent
            }
            Err(e @ EnrichmentError::Transient(_)) => {
                warn!("Dropping {} on enrichment failure: {}", candidate.mint, e);
                PipelineOutcome::EnrichmentFailed
            }
        }
    }
}

// ============================================================================
// TOKEN MONITOR
// ============================================================================

/// Real-time creation monitor.
///
/// One task owns the whole loop: reconcile the gap via backfill, connect,
/// subscribe, receive until the connection dies, back off, repeat. Never
/// terminates except on the shutdown signal.
pub struct TokenMonitor<S: AlertSink> {
    config: MonitorConfig,
    backfill: BackfillReconciler,
    pipeline: EventPipeline<S>,
    state: Arc<RwLock<MonitorState>>,
    stats: Arc<RwLock<MonitorStats>>,
}

impl<S: AlertSink> TokenMonitor<S> {
    pub fn new(
        config: MonitorConfig,
        backfill: BackfillReconciler,
        pipeline: EventPipeline<S>,
    ) -> Self {
        Self {
            config,
            backfill,
            pipeline,
            state: Arc::new(RwLock::new(MonitorState::Disconnected)),
            stats: Arc::new(RwLock::new(MonitorStats::default())),
        }
    }

    pub async fn state(&self) -> MonitorState {
        *self.state.read().await
    }

    pub async fn stats(&self) -> MonitorStats {
        self.stats.read().await.clone()
    }

    /// Run until `shutdown` fires. Every connect cycle starts with one
    /// backfill pass; every connection failure ends in an interruptible
    /// fixed-delay backoff.
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) {
        info!("🚀 Starting Pump.fun creation monitor");
        info!("📡 Watching program: {}", self.config.program_id);

        loop {
            self.reconcile_gap().await;

            match self.connect_and_receive(&mut shutdown).await {
                Ok(()) => {
                    info!("Monitor stopped by shutdown signal");
                    break;
                }
                Err(e) => {
                    *self.state.write().await = MonitorState::Disconnected;
                    self.stats.write().await.reconnects += 1;
                    warn!(
                        "Connection lost: {}. Reconnecting in {:?}",
                        e, self.config.reconnect_delay
                    );

                    tokio::select! {
                        _ = shutdown.recv() => {
                            info!("Monitor stopped during reconnect backoff");
                            break;
                        }
                        _ = tokio::time::sleep(self.config.reconnect_delay) => {}
                    }
                }
            }
        }

        *self.state.write().await = MonitorState::Disconnected;
    }

    /// One best-effort backfill pass. Failures are logged and never block
    /// the connect attempt.
    async fn reconcile_gap(&self) {
        match self.backfill.recent_candidates().await {
            Ok(candidates) => {
                for candidate in candidates {
                    let outcome = self.pipeline.process_candidate(candidate).await;
                    self.record(outcome).await;
                }
            }
            Err(e) => warn!("Backfill failed, connecting anyway: {:?}", e),
        }
    }

    /// One connection cycle: connect, subscribe, receive until the stream
    /// dies (Err) or shutdown fires (Ok).
    async fn connect_and_receive(
        &self,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> Result<(), ConnectionError> {
        *self.state.write().await = MonitorState::Connecting;
        info!("Connecting to {}", self.config.websocket_url);

        let (ws, _) = timeout(
            self.config.connect_timeout,
            connect_async(&self.config.websocket_url),
        )
        .await
        .map_err(|_| ConnectionError::ConnectTimeout(self.config.connect_timeout))??;

        let (mut write, mut read) = ws.split();

        let request = subscribe_request(&self.config.program_id, self.config.commitment);
        write.send(Message::Text(request.to_string())).await?;
        *self.state.write().await = MonitorState::Subscribed;
        info!("✅ Connected, logsSubscribe sent");

        loop {
            tokio::select! {
                _ = shutdown.recv() => return Ok(()),

                frame = read.next() => match frame {
                    None => return Err(ConnectionError::Closed),
                    Some(Err(e)) => return Err(e.into()),
                    Some(Ok(Message::Text(text))) => self.handle_text(&text).await?,
                    Some(Ok(Message::Ping(payload))) => {
                        write.send(Message::Pong(payload)).await?;
                    }
                    Some(Ok(Message::Close(_))) => return Err(ConnectionError::Closed),
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    /// Handle one text frame. Only a rejected subscription is fatal to the
    /// connection; everything else is logged and dropped.
    async fn handle_text(&self, text: &str) -> Result<(), ConnectionError> {
        self.stats.write().await.messages_received += 1;

        let frame: Value = match serde_json::from_str(text) {
            Ok(v) => v,
            Err(e) => {
                self.stats.write().await.parse_failures += 1;
                warn!("Dropping frame: {}", ParseError::Json(e));
                return Ok(());
            }
        };

        if *self.state.read().await == MonitorState::Subscribed {
            // First frame of the session must be the subscription ack; it
            // is consumed, never treated as an event.
            if frame.get("result").is_some() {
                info!("✅ Subscription confirmed, receiving live events");
                *self.state.write().await = MonitorState::Receiving;
                return Ok(());
            }
            if let Some(err) = frame.get("error") {
                return Err(ConnectionError::SubscribeFailed(err.to_string()));
            }
        }

        let Some(logs) = notification_logs(&frame) else {
            return Ok(());
        };

        let outcome = self.pipeline.process_logs(&logs).await;
        self.record(outcome).await;
        Ok(())
    }

    async fn record(&self, outcome: PipelineOutcome) {
        let mut stats = self.stats.write().await;
        match outcome {
            PipelineOutcome::NoEvent => {}
            PipelineOutcome::Dispatched(_) => stats.events_detected += 1,
            PipelineOutcome::EnrichmentFailed => {
                stats.events_detected += 1;
                stats.enrichment_failures += 1;
            }
        }
    }
}

/// The fixed JSON-RPC subscription envelope.
fn subscribe_request(program_id: &str, commitment: CommitmentConfig) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "logsSubscribe",
        "params": [
            { "mentions": [program_id] },
            commitment,
        ]
    })
}

// ============================================================================
// TESTS
// ============================================================================
