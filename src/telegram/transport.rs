// Telegram implementation of the core's ChatTransport port.

use crate::core::transport::{ChatTransport, NoticeRef, SenderRole, TransportError};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatId, ChatMemberKind, MessageId, ParseMode, Recipient, UserId};

#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn map_err(e: teloxide::RequestError) -> TransportError {
        TransportError::Platform(e.to_string())
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn sender_role(&self, chat_id: i64, user_id: u64) -> Result<SenderRole, TransportError> {
        let member = self
            .bot
            .get_chat_member(ChatId(chat_id), UserId(user_id))
            .await
            .map_err(Self::map_err)?;

        // Bots never reach this lookup; the message pipeline classifies
        // them from the sender flags before asking for a role.
        Ok(match member.kind {
            ChatMemberKind::Owner(_) => SenderRole::Owner,
            ChatMemberKind::Administrator(_) => SenderRole::Admin,
            _ => SenderRole::Member,
        })
    }

    async fn delete_message(&self, chat_id: i64, message_id: i32) -> Result<(), TransportError> {
        self.bot
            .delete_message(ChatId(chat_id), MessageId(message_id))
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn ban_user(&self, chat_id: i64, user_id: u64) -> Result<(), TransportError> {
        self.bot
            .ban_chat_member(ChatId(chat_id), UserId(user_id))
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn unban_user(&self, chat_id: i64, user_id: u64) -> Result<(), TransportError> {
        self.bot
            .unban_chat_member(ChatId(chat_id), UserId(user_id))
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn send_notice(&self, chat_id: i64, html: &str) -> Result<NoticeRef, TransportError> {
        let msg = self
            .bot
            .send_message(ChatId(chat_id), html.to_string())
            .parse_mode(ParseMode::Html)
            .await
            .map_err(Self::map_err)?;

        Ok(NoticeRef {
            chat_id,
            message_id: msg.id.0,
        })
    }

    async fn resolve_user_by_handle(&self, handle: &str) -> Result<u64, TransportError> {
        let username = format!("@{}", handle.trim_start_matches('@'));
        let chat = self
            .bot
            .get_chat(Recipient::ChannelUsername(username))
            .await
            .map_err(|_| TransportError::UnknownHandle(handle.to_string()))?;
        Ok(chat.id.0 as u64)
    }
}
