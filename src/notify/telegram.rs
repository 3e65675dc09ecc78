//! Telegram notifier

use serde_json::json;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::notify::short_id;
use crate::tx::amount::{format_amount, Stroops};

/// A reportable sweep outcome
#[derive(Debug, Clone)]
pub enum SweepEvent {
    Success {
        wallet: String,
        /// None for account merges (no explicit amount exists)
        amount: Option<Stroops>,
        hash: String,
    },
    Failure {
        wallet: String,
        detail: String,
    },
}

/// Sends sweep events to a Telegram chat, fire-and-forget
pub struct TelegramNotifier {
    http: reqwest::Client,
    api_url: String,
    chat_id: String,
    explorer_base: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: &str, chat_id: &str, explorer_base: &str) -> Result<Self> {
        if bot_token.is_empty() || chat_id.is_empty() {
            return Err(Error::Config(
                "telegram notifier needs both a bot token and a chat id".to_string(),
            ));
        }
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_url: format!("https://api.telegram.org/bot{}/sendMessage", bot_token),
            chat_id: chat_id.to_string(),
            explorer_base: explorer_base.trim_end_matches('/').to_string(),
        })
    }

    /// Deliver an event; failures are logged, never propagated
    pub async fn notify(&self, event: &SweepEvent) {
        let text = self.render(event);
        let body = json!({
            "chat_id": self.chat_id,
            "text": text,
            "parse_mode": "HTML",
            "disable_web_page_preview": true,
        });

        match self.http.post(&self.api_url).json(&body).send().await {
            Ok(response) if response.status().is_success() => {
                debug!("Telegram notification delivered");
            }
            Ok(response) => {
                warn!(
                    "Telegram notification rejected: HTTP {}",
                    response.status()
                );
            }
            Err(e) => warn!("Telegram notification failed: {}", e),
        }
    }

    fn render(&self, event: &SweepEvent) -> String {
        match event {
            SweepEvent::Success {
                wallet,
                amount,
                hash,
            } => {
                let amount_line = match amount {
                    Some(stroops) => format!("<b>Amount:</b> <code>{}</code>\n", format_amount(*stroops)),
                    None => "<b>Amount:</b> full balance (account merged)\n".to_string(),
                };
                format!(
                    "\u{2705} <b>Sweep successful</b>\n\
                     {}<b>From:</b> <code>{}</code>\n\
                     <a href=\"{}/transactions/{}\">View transaction</a>",
                    amount_line,
                    short_id(wallet),
                    self.explorer_base,
                    hash
                )
            }
            SweepEvent::Failure { wallet, detail } => format!(
                "\u{274c} <b>Sweep failed</b>\n\
                 <b>Wallet:</b> <code>{}</code>\n\
                 <b>Reason:</b> {}",
                short_id(wallet),
                detail
            ),
        }
    }
}
