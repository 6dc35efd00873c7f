use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::ParseMode;
use teloxide::utils::command::BotCommands;
use tracing::{info, warn};

use crate::bot::{keyboards, BotState};
use crate::error::ValidationError;
use crate::models::{FilterConfig, FilterField};
use crate::registry::SubscriptionRegistry;

#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start the bot & show the main menu")]
    Start,
    #[command(description = "Show this help message")]
    Help,
    #[command(description = "Register this chat for new token alerts")]
    Register,
    #[command(description = "Show your current filter settings")]
    Filters,
}

const WELCOME: &str = "🤖 <b>Welcome to Mintwatch!</b> 🚀\n\n\
    Real-time alerts for new Pump.fun tokens, filtered your way.\n\n\
    Use /register to subscribe, then tune your filters below.";

// --- Formatting helpers ---

pub(crate) fn filter_summary(filter: &FilterConfig) -> String {
    let flag = |on: bool| if on { "✅" } else { "❌" };
    let pools = filter
        .pools
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "⚙️ <b>Filter Settings</b>\n\n\
         Min Cost: {} SOL\n\
         Max Cost: {} SOL\n\
         Mint Revoked Required: {}\n\
         Freeze Revoked Required: {}\n\
         Links Required: {}\n\
         Pools: {}",
        filter.min_cost,
        filter.max_cost,
        flag(filter.require_mint_revoked),
        flag(filter.require_freeze_revoked),
        flag(filter.require_links),
        pools,
    )
}

/// Complete an armed numeric edit with the user's free-text input.
/// Returns the reply text, or None when nothing was awaited and the
/// message should be ignored.
pub(crate) async fn apply_pending_value(
    registry: &SubscriptionRegistry,
    chat_id: i64,
    text: &str,
) -> Option<String> {
    let field = registry.take_pending_edit(chat_id).await?;

    let value = match text.trim().parse::<f64>() {
        Ok(v) => v,
        Err(_) => {
            // Keep the edit armed so the user can just try again.
            registry.set_pending_edit(chat_id, field).await;
            let e = ValidationError::NotANumber(text.trim().to_string());
            return Some(format!("❌ {}. Send a plain number for {}.", e, field.name()));
        }
    };

    match registry.update_filter(chat_id, field, value).await {
        Ok(()) => Some(format!("✅ {} set to {} SOL", field.name(), value)),
        Err(e) => Some(format!("❌ {}", e)),
    }
}

// --- Command Handler ---

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: Arc<BotState>,
) -> ResponseResult<()> {
    let chat_id = msg.chat.id;
    info!("Received command: {:?} from chat: {}", cmd, chat_id);

    match cmd {
        Command::Start => {
            bot.send_message(chat_id, WELCOME)
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboards::main_menu())
                .await?;
        }
        Command::Help => {
            bot.send_message(chat_id, Command::descriptions().to_string())
                .await?;
        }
        Command::Register => {
            let text = if state.registry.register(chat_id.0).await {
                "Registered for alerts! 📢"
            } else {
                "You're already registered. 📡"
            };
            bot.send_message(chat_id, text).await?;
        }
        Command::Filters => {
            let filter = state.registry.filter_for(chat_id.0).await;
            bot.send_message(chat_id, filter_summary(&filter))
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboards::filters_menu(&filter))
                .await?;
        }
    }

    Ok(())
}

// --- Callback Query Handler ---

pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<BotState>,
) -> ResponseResult<()> {
    let Some(data) = q.data.as_deref() else {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };
    let Some(message) = q.message.as_ref() else {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };
    let chat_id = message.chat.id;

    info!("Received callback: {} from chat: {}", data, chat_id);

    let mut notification_text: Option<String> = None;

    match data {
        "main_menu" => {
            bot.edit_message_text(chat_id, message.id, WELCOME)
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboards::main_menu())
                .await?;
        }
        "filters_menu" => {
            let filter = state.registry.filter_for(chat_id.0).await;
            bot.edit_message_text(chat_id, message.id, filter_summary(&filter))
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboards::filters_menu(&filter))
                .await?;
        }
        "alerts_status" => {
            notification_text = Some(if state.registry.register(chat_id.0).await {
                "You will receive meme coin alerts! 📡".to_string()
            } else {
                "Already receiving alerts. 📡".to_string()
            });
        }
        "show_help" => {
            notification_text = Some(Command::descriptions().to_string());
        }
        "toggle_mint_revoked" | "toggle_freeze_revoked" | "toggle_links" => {
            let field = match data {
                "toggle_mint_revoked" => FilterField::MintRevoked,
                "toggle_freeze_revoked" => FilterField::FreezeRevoked,
                _ => FilterField::Links,
            };
            match state.registry.toggle_filter(chat_id.0, field).await {
                Ok(value) => {
                    let filter = state.registry.filter_for(chat_id.0).await;
                    bot.edit_message_text(chat_id, message.id, filter_summary(&filter))
                        .parse_mode(ParseMode::Html)
                        .reply_markup(keyboards::filters_menu(&filter))
                        .await?;
                    notification_text =
                        Some(format!("{} → {}", field.name(), if value { "on" } else { "off" }));
                }
                Err(e) => notification_text = Some(format!("❌ {}", e)),
            }
        }
        "edit_min_cost" | "edit_max_cost" => {
            let field = if data == "edit_min_cost" {
                FilterField::MinCost
            } else {
                FilterField::MaxCost
            };
            state.registry.set_pending_edit(chat_id.0, field).await;
            bot.send_message(
                chat_id,
                format!("Send the new {} in SOL (e.g. 0.001):", field.name()),
            )
            .await?;
        }
        _ => {
            warn!("Unhandled callback data: {}", data);
            notification_text = Some("⚠️ Action not implemented yet.".to_string());
        }
    }

    if let Some(text) = notification_text {
        bot.answer_callback_query(q.id).text(text).await?;
    } else {
        bot.answer_callback_query(q.id).await?;
    }

    Ok(())
}

// --- Free-text Handler (pending numeric edits) ---

pub async fn message_handler(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    if let Some(reply) = apply_pending_value(&state.registry, msg.chat.id.0, text).await {
        bot.send_message(msg.chat.id, reply).await?;
    }

    Ok(())
}

// --- Dispatcher wiring ---

/// Run the bot until ctrl-c. Blocks the calling task.
pub async fn start_bot(bot: Bot, state: Arc<BotState>) -> anyhow::Result<()> {
    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(command_handler),
        )
        .branch(Update::filter_callback_query().endpoint(callback_handler))
        .branch(Update::filter_message().endpoint(message_handler));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
