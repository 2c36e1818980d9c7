//! Telegram bot wrapper.

use teloxide::prelude::*;
use teloxide::types::ParseMode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("Telegram API error: {0}")]
    Api(#[from] teloxide::RequestError),
    #[error("invalid Telegram chat id `{0}`")]
    InvalidChatId(String),
}

/// Sends messages to a fixed destination chat.
pub struct TelegramSender {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramSender {
    /// Create a sender for the given bot token and chat id.
    pub fn new(token: &str, chat_id: &str) -> Result<Self, TelegramError> {
        let chat_id = chat_id
            .trim()
            .parse::<i64>()
            .map(ChatId)
            .map_err(|_| TelegramError::InvalidChatId(chat_id.to_string()))?;
        Ok(Self {
            bot: Bot::new(token),
            chat_id,
        })
    }

    /// Send a formatted message to the destination chat.
    pub async fn send(&self, message: &str) -> Result<(), TelegramError> {
        self.bot
            .send_message(self.chat_id, message)
            .parse_mode(ParseMode::Html)
            .await?;
        Ok(())
    }
}
