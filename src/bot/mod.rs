use std::sync::Arc;

use crate::config::Config;
use crate::registry::SubscriptionRegistry;

pub mod commands;
pub mod keyboards;
pub mod notification;

/// Shared state handed to every teloxide handler.
#[derive(Clone)]
pub struct BotState {
    pub registry: Arc<SubscriptionRegistry>,
    pub config: Arc<Config>,
}
