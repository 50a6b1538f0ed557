//! Telegram adapter (teloxide).
//!
//! Implements the `tgf-core` RelayPort over the Telegram Bot API. Flood-wait
//! and transport retries are the client library's business; each port call is
//! a single API request.

use async_trait::async_trait;

use teloxide::prelude::*;

pub mod handlers;
pub mod router;

use tgf_core::{
    domain::{ChatId, MessageRef},
    errors::Error,
    port::RelayPort,
    Result,
};

#[derive(Clone)]
pub struct TelegramRelay {
    bot: Bot,
}

impl TelegramRelay {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn tg_msg_id(msg: MessageRef) -> teloxide::types::MessageId {
        teloxide::types::MessageId(msg.message_id.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }
}

#[async_trait]
impl RelayPort for TelegramRelay {
    async fn forward_message(&self, to: ChatId, msg: MessageRef) -> Result<()> {
        self.bot
            .forward_message(Self::tg_chat(to), Self::tg_chat(msg.chat_id), Self::tg_msg_id(msg))
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn copy_message(&self, to: ChatId, msg: MessageRef) -> Result<()> {
        self.bot
            .copy_message(Self::tg_chat(to), Self::tg_chat(msg.chat_id), Self::tg_msg_id(msg))
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn describe_endpoint(&self, id: ChatId) -> Result<String> {
        let chat = self
            .bot
            .get_chat(Self::tg_chat(id))
            .await
            .map_err(Self::map_err)?;

        Ok(chat_label(&chat, id))
    }
}

/// Prefer the chat title (groups/channels), then username, then first name
/// (private chats), falling back to the numeric id.
fn chat_label(chat: &teloxide::types::Chat, id: ChatId) -> String {
    if let Some(title) = chat.title() {
        return title.to_string();
    }
    if let Some(username) = chat.username() {
        return format!("@{username}");
    }
    if let Some(first_name) = chat.first_name() {
        return first_name.to_string();
    }
    id.to_string()
}
