// Telegram message pipeline - translates updates into core decisions
// and core decisions into Bot API calls.

use crate::config::Config;
use crate::core::moderation::{
    EnforcementAction, InboundMessage, ModerationService, NoticeScheduler,
};
use crate::core::transport::{ChatTransport, SenderRole};
use crate::infra::moderation::InMemoryWarnStore;
use crate::telegram::commands;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::User;
use teloxide::utils::html;

/// Shared state injected into every update handler.
pub struct AppState {
    pub config: Arc<Config>,
    pub moderation: Arc<ModerationService<InMemoryWarnStore>>,
    pub transport: Arc<dyn ChatTransport>,
    pub notices: NoticeScheduler,
}

/// Entry point for every incoming message update.
pub async fn handle_update(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    if let Some(text) = msg.text() {
        if text.starts_with('/') && commands::handle_command(&msg, text, &state).await {
            return Ok(());
        }
    }

    if let Err(e) = moderate_message(&msg, &state).await {
        tracing::error!("Failed to moderate message: {e}");
    }
    Ok(())
}

/// Run one message through the decision engine and apply the outcome.
///
/// Returns `true` if the message drew an enforcement action.
async fn moderate_message(msg: &Message, state: &AppState) -> anyhow::Result<bool> {
    let Some(user) = msg.from() else {
        return Ok(false);
    };

    // Moderation only applies to group chats.
    if msg.chat.is_private() {
        return Ok(false);
    }

    let chat_id = msg.chat.id.0;
    let role = if user.is_bot {
        SenderRole::Bot
    } else {
        state.transport.sender_role(chat_id, user.id.0).await?
    };

    let inbound = InboundMessage {
        sender_id: user.id.0,
        sender_role: role,
        sender_mention: mention_html(user),
        text: msg.text().map(str::to_string),
        caption: msg.caption().map(str::to_string),
        is_forwarded: msg.forward_date().is_some(),
    };

    let action = state
        .moderation
        .decide(&inbound, &state.config.moderation)
        .await?;
    if action == EnforcementAction::None {
        return Ok(false);
    }

    apply_action(msg, user, action, state).await;
    Ok(true)
}

/// Execute an enforcement action against the transport.
///
/// Every call is best-effort: failures are logged and the pipeline moves
/// on. A ban that fails after the ledger reset leaves the user unbanned
/// with zero warnings; we accept that inconsistency rather than trying
/// to roll the ledger back.
async fn apply_action(msg: &Message, user: &User, action: EnforcementAction, state: &AppState) {
    let chat_id = msg.chat.id.0;

    match action {
        EnforcementAction::None => {}

        EnforcementAction::DeleteOnly { notice } => {
            delete_offending(msg, state).await;
            post_notice(state, chat_id, &notice).await;
            tracing::info!(
                user_id = user.id.0,
                chat_id,
                "Deleted forwarded message"
            );
        }

        EnforcementAction::DeleteAndWarn {
            notice,
            warning_count,
            max_warnings,
        } => {
            delete_offending(msg, state).await;
            post_notice(state, chat_id, &notice).await;
            tracing::info!(
                user_id = user.id.0,
                chat_id,
                "Warned user ({warning_count}/{max_warnings}) for link spam"
            );
        }

        EnforcementAction::DeleteAndBan { notice } => {
            delete_offending(msg, state).await;
            if let Err(e) = state.transport.ban_user(chat_id, user.id.0).await {
                tracing::error!(user_id = user.id.0, chat_id, "Failed to ban user: {e}");
            } else {
                tracing::info!(user_id = user.id.0, chat_id, "User banned for sharing links");
            }
            post_notice(state, chat_id, &notice).await;
        }
    }
}

async fn delete_offending(msg: &Message, state: &AppState) {
    if let Err(e) = state
        .transport
        .delete_message(msg.chat.id.0, msg.id.0)
        .await
    {
        tracing::warn!("Failed to delete offending message: {e}");
    }
}

/// Send a notice and arm its auto-delete timer.
async fn post_notice(state: &AppState, chat_id: i64, html: &str) {
    match state.transport.send_notice(chat_id, html).await {
        Ok(notice_ref) => state
            .notices
            .schedule_deletion(notice_ref, state.config.moderation.notice_delete_delay),
        Err(e) => tracing::warn!("Failed to send enforcement notice: {e}"),
    }
}

/// HTML mention that pings the user without needing a username.
pub fn mention_html(user: &User) -> String {
    format!(
        r#"<a href="tg://user?id={}">{}</a>"#,
        user.id.0,
        html::escape(&user.full_name())
    )
}
