// The transport port - how the core talks to the chat platform.
// The core never imports teloxide; everything platform-specific goes
// through this trait so tests can substitute a fake transport.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Chat platform error: {0}")]
    Platform(String),

    #[error("Unknown user handle: {0}")]
    UnknownHandle(String),
}

/// The sender's standing in the chat, as reported by the platform.
///
/// Owners, admins and bots are exempt from all enforcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenderRole {
    Owner,
    Admin,
    Member,
    Bot,
}

impl SenderRole {
    /// Whether this role is exempt from moderation.
    pub fn is_exempt(&self) -> bool {
        matches!(self, SenderRole::Owner | SenderRole::Admin | SenderRole::Bot)
    }
}

/// Handle to a notice the bot has sent, used for delayed cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoticeRef {
    pub chat_id: i64,
    pub message_id: i32,
}

/// Operations the core needs from the chat platform.
///
/// Implemented over the Telegram Bot API in the telegram layer.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Look up a user's role in a chat.
    async fn sender_role(&self, chat_id: i64, user_id: u64) -> Result<SenderRole, TransportError>;

    /// Delete a message from a chat.
    async fn delete_message(&self, chat_id: i64, message_id: i32) -> Result<(), TransportError>;

    /// Ban a user from a chat.
    async fn ban_user(&self, chat_id: i64, user_id: u64) -> Result<(), TransportError>;

    /// Lift a ban.
    async fn unban_user(&self, chat_id: i64, user_id: u64) -> Result<(), TransportError>;

    /// Send an HTML notice to a chat. Returns a handle for later deletion.
    async fn send_notice(&self, chat_id: i64, html: &str) -> Result<NoticeRef, TransportError>;

    /// Resolve an @handle to a user id (used by admin commands).
    async fn resolve_user_by_handle(&self, handle: &str) -> Result<u64, TransportError>;
}
