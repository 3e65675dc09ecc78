//! Operator notifications
//!
//! Fire-and-forget delivery to a messaging channel. An unconfigured
//! notifier is a no-op; a delivery failure is logged and swallowed - the
//! sweep never depends on notifications going through.

pub mod telegram;

pub use telegram::{SweepEvent, TelegramNotifier};

/// Shorten an account id for human-facing text
pub fn short_id(id: &str) -> String {
    if id.len() <= 12 {
        id.to_string()
    } else {
        format!("{}...{}", &id[..5], &id[id.len() - 5..])
    }
}
