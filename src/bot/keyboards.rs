use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::models::FilterConfig;

pub fn main_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback("⚙️ Filter Settings", "filters_menu"),
            InlineKeyboardButton::callback("📡 My Alerts", "alerts_status"),
        ],
        vec![InlineKeyboardButton::callback("❓ Help", "show_help")],
    ])
}

/// Filter settings menu. Button labels show the current values so the
/// keyboard doubles as the settings view.
pub fn filters_menu(filter: &FilterConfig) -> InlineKeyboardMarkup {
    let flag = |on: bool| if on { "✅" } else { "❌" };

    InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback(
                format!("Min Cost: {} SOL", filter.min_cost),
                "edit_min_cost",
            ),
            InlineKeyboardButton::callback(
                format!("Max Cost: {} SOL", filter.max_cost),
                "edit_max_cost",
            ),
        ],
        vec![
            InlineKeyboardButton::callback(
                format!("{} Mint Revoked", flag(filter.require_mint_revoked)),
                "toggle_mint_revoked",
            ),
            InlineKeyboardButton::callback(
                format!("{} Freeze Revoked", flag(filter.require_freeze_revoked)),
                "toggle_freeze_revoked",
            ),
        ],
        vec![
            InlineKeyboardButton::callback(
                format!("{} Require Links", flag(filter.require_links)),
                "toggle_links",
            ),
            InlineKeyboardButton::callback("🔙 Back", "main_menu"),
        ],
    ])
}
