use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::api::HeliusClient;
use crate::watch::pumpfun::{scan_logs, CandidateEvent};

/// How many trailing history entries to inspect per reconnect. Enough to
/// cover a short outage without re-processing ancient history.
pub const DEFAULT_BACKFILL_LIMIT: usize = 5;

/// Closes the detection gap after a disconnect by replaying the most recent
/// CREATE transactions from the REST history endpoint. Runs once per
/// connect cycle; best-effort.
pub struct BackfillReconciler {
    helius: Arc<HeliusClient>,
    program_id: String,
    limit: usize,
}

impl BackfillReconciler {
    pub fn new(helius: Arc<HeliusClient>, program_id: impl Into<String>, limit: usize) -> Self {
        Self {
            helius,
            program_id: program_id.into(),
            limit,
        }
    }

    /// Fetch recent creation transactions and parse the trailing `limit`
    /// of them into candidates. Candidates may duplicate live events that
    /// arrive right after reconnect; delivery is at-least-once and nothing
    /// dedups.
    pub async fn recent_candidates(&self) -> Result<Vec<CandidateEvent>> {
        let transactions = self.helius.create_transactions(&self.program_id).await?;

        let start = transactions.len().saturating_sub(self.limit);
        let candidates: Vec<CandidateEvent> = transactions[start..]
            .iter()
            .filter_map(|tx| {
                let candidate = scan_logs(&tx.log_messages);
                if candidate.is_none() {
                    debug!(
                        "Backfill transaction {:?} carried no creation event",
                        tx.signature
                    );
                }
                candidate
            })
            .collect();

        info!(
            "🔁 Backfill: {} candidate(s) from {} recent transaction(s)",
            candidates.len(),
            transactions.len()
        );
        Ok(candidates)
    }
}
