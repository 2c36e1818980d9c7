//! Telegram delivery for admitted alerts.
//!
//! This crate provides:
//! - Alert message formatting
//! - Telegram bot integration for sending
//! - A background notifier task decoupling delivery from the webhook path

pub mod format;
pub mod notifier;
pub mod telegram;

pub use format::format_alert_message;
pub use notifier::{start_notifier, Notifier, NotifierHandle};
pub use telegram::{TelegramError, TelegramSender};
