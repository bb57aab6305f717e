//! Message delivery to the Telegram destination chat.
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fmt;
use teloxide::payloads::SendMessageSetters;
use teloxide::requests::Requester;
use teloxide::types::{ChatId, ParseMode, Recipient};
use teloxide::utils::html;
use teloxide::Bot;
use tracing::info;

use crate::config::Config;
use crate::model::SelectedRelease;
use crate::timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageFormat {
    Html,
    Plain,
}

/// Delivers text to the configured destination.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str, format: MessageFormat) -> Result<()>;
}

#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
    chat: Recipient,
}

impl fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("chat", &self.chat)
            .finish_non_exhaustive()
    }
}

impl TelegramNotifier {
    pub fn new(bot: Bot, chat: Recipient) -> Self {
        Self { bot, chat }
    }

    pub fn from_config(cfg: &Config) -> Self {
        let bot = Bot::new(cfg.telegram.bot_token.clone());
        Self::new(bot, parse_recipient(&cfg.telegram.chat_id))
    }
}

/// Numeric ids address chats directly; anything else is a channel username.
pub fn parse_recipient(chat_id: &str) -> Recipient {
    let chat_id = chat_id.trim();
    match chat_id.parse::<i64>() {
        Ok(id) => Recipient::Id(ChatId(id)),
        Err(_) if chat_id.starts_with('@') => Recipient::ChannelUsername(chat_id.to_string()),
        Err(_) => Recipient::ChannelUsername(format!("@{chat_id}")),
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str, format: MessageFormat) -> Result<()> {
        let request = self.bot.send_message(self.chat.clone(), text);
        let request = match format {
            MessageFormat::Html => request.parse_mode(ParseMode::Html),
            MessageFormat::Plain => request,
        };
        let msg = request.await.context("telegram sendMessage failed")?;
        info!(message_id = msg.id.0, "telegram message sent");
        Ok(())
    }
}

/// HTML announcement for a newly seen release.
pub fn release_message(repo: &str, release: &SelectedRelease, published_at: &str) -> String {
    let mut text = format!(
        "<b>{}</b>\nRelease <i>{}</i>\nPublished: {}",
        html::escape(repo),
        html::escape(&release.name),
        html::escape(&timestamp::display(published_at)),
    );
    if !release.url.is_empty() {
        text.push('\n');
        text.push_str(&html::escape(&release.url));
    }
    text
}
