//! Subscriber Registry
//!
//! Thread-safe storage mapping a Telegram chat id to its filter config and
//! pending-edit state. The bot handlers write to it while the dispatcher
//! reads snapshots during fan-out; every operation is atomic with respect
//! to the others.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::ValidationError;
use crate::models::{FilterConfig, FilterField};

/// One subscriber's state: the owned filter config plus the ephemeral
/// "which field is awaiting a number" marker for the edit flow.
#[derive(Debug, Clone, Default)]
pub struct SubscriberEntry {
    pub filter: FilterConfig,
    pub pending_edit: Option<FilterField>,
}

/// Registry of all subscribers. Sole owner of subscriber state for the
/// lifetime of the process.
pub struct SubscriptionRegistry {
    subscribers: RwLock<HashMap<i64, SubscriberEntry>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
        }
    }

    /// Register a chat for alerts. Idempotent: inserts a default config if
    /// absent, no-op otherwise. Returns true on a first-time registration
    /// so the caller can send a one-time welcome.
    pub async fn register(&self, chat_id: i64) -> bool {
        let mut subscribers = self.subscribers.write().await;
        if subscribers.contains_key(&chat_id) {
            debug!("chat {} already registered", chat_id);
            return false;
        }
        subscribers.insert(chat_id, SubscriberEntry::default());
        info!("📢 Registered chat {} for alerts", chat_id);
        true
    }

    /// The subscriber's current filter, or the process-wide default when
    /// unregistered. Callers get a clone; mutating it has no effect on the
    /// registry.
    pub async fn filter_for(&self, chat_id: i64) -> FilterConfig {
        let subscribers = self.subscribers.read().await;
        subscribers
            .get(&chat_id)
            .map(|entry| entry.filter.clone())
            .unwrap_or_default()
    }

    /// Replace a numeric filter field. The new value is validated against a
    /// copy of the current config and swapped in atomically; on any
    /// rejection the prior config is untouched.
    pub async fn update_filter(
        &self,
        chat_id: i64,
        field: FilterField,
        value: f64,
    ) -> Result<(), ValidationError> {
        if !field.is_numeric() {
            return Err(ValidationError::NotNumeric { field: field.name() });
        }
        if !value.is_finite() || value < 0.0 {
            return Err(ValidationError::Negative {
                field: field.name(),
                value,
            });
        }

        let mut subscribers = self.subscribers.write().await;
        let entry = subscribers.entry(chat_id).or_default();

        let mut updated = entry.filter.clone();
        match field {
            FilterField::MinCost => updated.min_cost = value,
            FilterField::MaxCost => updated.max_cost = value,
            _ => unreachable!("checked numeric above"),
        }
        if updated.min_cost > updated.max_cost {
            return Err(ValidationError::InvertedBounds {
                min: updated.min_cost,
                max: updated.max_cost,
            });
        }

        entry.filter = updated;
        debug!("chat {}: {} set to {}", chat_id, field.name(), value);
        Ok(())
    }

    /// Flip a boolean filter field, returning the new value.
    pub async fn toggle_filter(
        &self,
        chat_id: i64,
        field: FilterField,
    ) -> Result<bool, ValidationError> {
        let mut subscribers = self.subscribers.write().await;
        let entry = subscribers.entry(chat_id).or_default();

        let flag = match field {
            FilterField::MintRevoked => &mut entry.filter.require_mint_revoked,
            FilterField::FreezeRevoked => &mut entry.filter.require_freeze_revoked,
            FilterField::Links => &mut entry.filter.require_links,
            FilterField::MinCost | FilterField::MaxCost => {
                return Err(ValidationError::NotToggleable { field: field.name() });
            }
        };
        *flag = !*flag;
        let value = *flag;
        debug!("chat {}: {} toggled to {}", chat_id, field.name(), value);
        Ok(value)
    }

    /// Arm an edit: the subscriber's next free-text message is interpreted
    /// as the value for `field`.
    pub async fn set_pending_edit(&self, chat_id: i64, field: FilterField) {
        let mut subscribers = self.subscribers.write().await;
        subscribers.entry(chat_id).or_default().pending_edit = Some(field);
    }

    /// Take (and clear) the armed edit, if any.
    pub async fn take_pending_edit(&self, chat_id: i64) -> Option<FilterField> {
        let mut subscribers = self.subscribers.write().await;
        subscribers
            .get_mut(&chat_id)
            .and_then(|entry| entry.pending_edit.take())
    }

    /// Point-in-time snapshot of registered chat ids, sorted for a
    /// deterministic fan-out order. Registrations racing this call land in
    /// the next snapshot.
    pub async fn subscribers(&self) -> Vec<i64> {
        let subscribers = self.subscribers.read().await;
        let mut ids: Vec<i64> = subscribers.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_is_idempotent() {
        let registry = SubscriptionRegistry::new();
        assert!(registry.register(7).await);
        assert!(!registry.register(7).await);
        assert_eq!(registry.subscriber_count().await, 1);
    }

    #[tokio::test]
    async fn test_unregistered_chat_gets_default_filter() {
        let registry = SubscriptionRegistry::new();
        assert_eq!(registry.filter_for(42).await, FilterConfig::default());
    }

    #[tokio::test]
    async fn test_update_numeric_field() {
        let registry = SubscriptionRegistry::new();
        registry.register(1).await;
        registry
            .update_filter(1, FilterField::MaxCost, 0.01)
            .await
            .unwrap();
        assert_eq!(registry.filter_for(1).await.max_cost, 0.01);
    }

    #[tokio::test]
    async fn test_inverted_bounds_rejected_and_config_untouched() {
        let registry = SubscriptionRegistry::new();
        registry.register(1).await;
        let before = registry.filter_for(1).await;

        let result = registry
            .update_filter(1, FilterField::MinCost, before.max_cost * 10.0)
            .await;
        assert!(matches!(result, Err(ValidationError::InvertedBounds { .. })));

        // Read-back: nothing changed.
        assert_eq!(registry.filter_for(1).await, before);
    }

    #[tokio::test]
    async fn test_negative_value_rejected() {
        let registry = SubscriptionRegistry::new();
        registry.register(1).await;
        let before = registry.filter_for(1).await;

        let result = registry.update_filter(1, FilterField::MinCost, -0.5).await;
        assert!(matches!(result, Err(ValidationError::Negative { .. })));
        assert_eq!(registry.filter_for(1).await, before);
    }

    #[tokio::test]
    async fn test_update_rejects_boolean_field() {
        let registry = SubscriptionRegistry::new();
        let result = registry.update_filter(1, FilterField::Links, 1.0).await;
        assert!(matches!(result, Err(ValidationError::NotNumeric { .. })));
    }

    #[tokio::test]
    async fn test_toggle_flips_and_rejects_numeric() {
        let registry = SubscriptionRegistry::new();
        registry.register(1).await;

        let value = registry
            .toggle_filter(1, FilterField::MintRevoked)
            .await
            .unwrap();
        assert!(!value); // default was true
        assert!(!registry.filter_for(1).await.require_mint_revoked);

        let result = registry.toggle_filter(1, FilterField::MinCost).await;
        assert!(matches!(result, Err(ValidationError::NotToggleable { .. })));
    }

    #[tokio::test]
    async fn test_pending_edit_roundtrip() {
        let registry = SubscriptionRegistry::new();
        registry.register(1).await;

        assert!(registry.take_pending_edit(1).await.is_none());
        registry.set_pending_edit(1, FilterField::MinCost).await;
        assert_eq!(
            registry.take_pending_edit(1).await,
            Some(FilterField::MinCost)
        );
        // Taking clears it.
        assert!(registry.take_pending_edit(1).await.is_none());
    }

    #[tokio::test]
    async fn test_snapshot_is_sorted() {
        let registry = SubscriptionRegistry::new();
        registry.register(30).await;
        registry.register(10).await;
        registry.register(20).await;
        assert_eq!(registry.subscribers().await, vec![10, 20, 30]);
    }
}
