use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use teloxide::utils::html::escape;

use crate::error::DeliveryError;
use crate::models::TokenEvent;
use crate::watch::dispatch::AlertSink;

/// Render the fixed alert layout for one event. Metadata strings are
/// attacker-controlled; everything interpolated into the HTML body is
/// escaped.
pub fn format_token_alert(event: &TokenEvent) -> String {
    let links = if event.links.is_empty() {
        "None".to_string()
    } else {
        event.links.join(" | ")
    };

    format!(
        "<b>{} ({})</b>\n\
         CA: <code>{}</code>\n\
         Liquidity: {}\n\
         Market Cap: {}\n\
         Cost: {} SOL\n\
         Dev Holding: {}\n\
         Bonding Curve: {}\n\
         Mint Revoked: {}\n\
         Freeze Revoked: {}\n\
         Links: {}\n\
         <a href=\"{}\">Chart</a>",
        escape(&event.name),
        escape(&event.symbol),
        escape(&event.mint),
        escape(&event.liquidity),
        escape(&event.market_cap),
        event.cost,
        escape(&event.dev_holding),
        event.bonding_curve_kind,
        if event.mint_authority_revoked { "✅" } else { "❌" },
        if event.freeze_authority_revoked { "✅" } else { "❌" },
        escape(&links),
        event.chart_url,
    )
}

/// Production alert sink: Telegram sendMessage in HTML mode.
pub struct TelegramSink {
    bot: Bot,
}

impl TelegramSink {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl AlertSink for TelegramSink {
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), DeliveryError> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .parse_mode(ParseMode::Html)
            .disable_web_page_preview(true)
            .await
            .map(|_| ())
            .map_err(|e| DeliveryError::Send(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BondingCurveKind, Pool};

    fn event() -> TokenEvent {
        TokenEvent {
            mint: "Mint111".to_string(),
            name: "Moon Coin".to_string(),
            symbol: "MOON".to_string(),
            liquidity: "30 SOL".to_string(),
            market_cap: "$12K".to_string(),
            cost: 0.001,
            dev_holding: "4%".to_string(),
            mint_authority_revoked: true,
            freeze_authority_revoked: false,
            links: vec![
                "https://t.me/moon".to_string(),
                "https://x.com/moon".to_string(),
            ],
            bonding_curve_kind: BondingCurveKind::Linear,
            pool: Pool::Pumpfun,
            chart_url: TokenEvent::chart_url_for("Mint111"),
        }
    }

    #[test]
    fn test_alert_carries_every_field() {
        let text = format_token_alert(&event());

        assert!(text.contains("<b>Moon Coin (MOON)</b>"));
        assert!(text.contains("CA: <code>Mint111</code>"));
        assert!(text.contains("Liquidity: 30 SOL"));
        assert!(text.contains("Market Cap: $12K"));
        assert!(text.contains("Cost: 0.001 SOL"));
        assert!(text.contains("Dev Holding: 4%"));
        assert!(text.contains("Bonding Curve: linear"));
        assert!(text.contains("Mint Revoked: ✅"));
        assert!(text.contains("Freeze Revoked: ❌"));
        assert!(text.contains("https://t.me/moon | https://x.com/moon"));
        assert!(text.contains(r#"<a href="https://dexscreener.com/solana/Mint111">Chart</a>"#));
    }

    #[test]
    fn test_alert_shows_none_for_missing_links() {
        let mut e = event();
        e.links.clear();
        assert!(format_token_alert(&e).contains("Links: None"));
    }

    #[test]
    fn test_alert_escapes_hostile_metadata() {
        let mut e = event();
        e.name = "<script>alert(1)</script>".to_string();
        let text = format_token_alert(&e);

        assert!(!text.contains("<script>"));
        assert!(text.contains("&lt;script&gt;"));
    }
}
