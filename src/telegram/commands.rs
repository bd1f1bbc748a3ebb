// Admin commands for the moderation bot.
//
// Telegram may send `/cmd@botname arg1 ...`; parsing strips the bot
// suffix. Anything that is not one of our commands is left for the
// moderation pipeline (another bot's command can still carry spam).

use crate::core::moderation::EnforcementAction;
use crate::core::transport::SenderRole;
use crate::telegram::message_handler::AppState;
use teloxide::prelude::*;
use teloxide::utils::html;

fn parse_command(text: &str) -> (String, String) {
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

/// Handle an admin/bot command. Returns `false` for commands we do not
/// recognize so the caller can fall back to moderation.
pub async fn handle_command(msg: &Message, text: &str, state: &AppState) -> bool {
    let (cmd, args) = parse_command(text);
    let chat_id = msg.chat.id.0;

    match cmd.as_str() {
        "start" => reply(state, chat_id, &start_text(msg)).await,
        "help" => reply(state, chat_id, HELP_TEXT).await,
        "status" => reply(state, chat_id, &status_text(state)).await,
        "ban" | "unban" | "warn" | "warnings" | "clearwarnings" | "clear" => {
            if !require_admin(msg, state).await {
                return true;
            }
            let response = match cmd.as_str() {
                "ban" => ban_cmd(chat_id, &args, state).await,
                "unban" => unban_cmd(chat_id, &args, state).await,
                "warn" => warn_cmd(chat_id, &args, state).await,
                "warnings" => warnings_cmd(&args, state).await,
                "clearwarnings" => clear_warnings_cmd(&args, state).await,
                _ => clear_all_cmd(state).await,
            };
            if !response.is_empty() {
                reply(state, chat_id, &response).await;
            }
        }
        _ => return false,
    }
    true
}

/// Check that the sender may run admin commands; replies with the
/// refusal or lookup error when they may not.
async fn require_admin(msg: &Message, state: &AppState) -> bool {
    let chat_id = msg.chat.id.0;
    let Some(user) = msg.from() else {
        return false;
    };

    match state.transport.sender_role(chat_id, user.id.0).await {
        Ok(SenderRole::Owner) | Ok(SenderRole::Admin) => true,
        Ok(_) => {
            reply(
                state,
                chat_id,
                "❌ You need admin privileges to use this command.",
            )
            .await;
            false
        }
        Err(e) => {
            reply(state, chat_id, &format!("❌ Error checking privileges: {e}")).await;
            false
        }
    }
}

async fn ban_cmd(chat_id: i64, args: &str, state: &AppState) -> String {
    let Some(handle) = first_handle(args) else {
        return "Usage: /ban @username".to_string();
    };
    match state.transport.resolve_user_by_handle(&handle).await {
        Ok(user_id) => match state.transport.ban_user(chat_id, user_id).await {
            Ok(()) => format!("✅ {} has been banned from the group.", html::escape(&handle)),
            Err(e) => format!("❌ Error banning user: {e}"),
        },
        Err(e) => format!("❌ {e}"),
    }
}

async fn unban_cmd(chat_id: i64, args: &str, state: &AppState) -> String {
    let Some(handle) = first_handle(args) else {
        return "Usage: /unban @username".to_string();
    };
    match state.transport.resolve_user_by_handle(&handle).await {
        Ok(user_id) => match state.transport.unban_user(chat_id, user_id).await {
            Ok(()) => format!(
                "✅ {} has been unbanned from the group.",
                html::escape(&handle)
            ),
            Err(e) => format!("❌ Error unbanning user: {e}"),
        },
        Err(e) => format!("❌ {e}"),
    }
}

async fn warn_cmd(chat_id: i64, args: &str, state: &AppState) -> String {
    let Some(handle) = first_handle(args) else {
        return "Usage: /warn @username".to_string();
    };
    let user_id = match state.transport.resolve_user_by_handle(&handle).await {
        Ok(id) => id,
        Err(e) => return format!("❌ {e}"),
    };

    let escaped = html::escape(&handle);
    match state
        .moderation
        .warn_user(user_id, &escaped, &state.config.moderation)
        .await
    {
        Ok(EnforcementAction::DeleteAndWarn {
            warning_count,
            max_warnings,
            ..
        }) => format!("⚠️ {escaped} has been warned ({warning_count}/{max_warnings})."),
        Ok(EnforcementAction::DeleteAndBan { .. }) => {
            match state.transport.ban_user(chat_id, user_id).await {
                Ok(()) => format!("🚫 {escaped} reached the warning limit and has been banned."),
                Err(e) => format!("❌ Error banning user: {e}"),
            }
        }
        Ok(_) => String::new(),
        Err(e) => format!("❌ {e}"),
    }
}

async fn warnings_cmd(args: &str, state: &AppState) -> String {
    let Some(handle) = first_handle(args) else {
        return "Usage: /warnings @username".to_string();
    };
    let user_id = match state.transport.resolve_user_by_handle(&handle).await {
        Ok(id) => id,
        Err(e) => return format!("❌ {e}"),
    };
    match state.moderation.warning_count(user_id).await {
        Ok(count) => format!(
            "📋 {} has {count}/{} warnings.",
            html::escape(&handle),
            state.config.moderation.warnings_before_ban
        ),
        Err(e) => format!("❌ {e}"),
    }
}

async fn clear_warnings_cmd(args: &str, state: &AppState) -> String {
    let Some(handle) = first_handle(args) else {
        return "Usage: /clearwarnings @username".to_string();
    };
    let user_id = match state.transport.resolve_user_by_handle(&handle).await {
        Ok(id) => id,
        Err(e) => return format!("❌ {e}"),
    };
    match state.moderation.clear_warnings(user_id).await {
        Ok(()) => format!("✅ Warnings cleared for {}.", html::escape(&handle)),
        Err(e) => format!("❌ {e}"),
    }
}

async fn clear_all_cmd(state: &AppState) -> String {
    match state.moderation.clear_all_warnings().await {
        Ok(()) => "✅ All warnings have been cleared.".to_string(),
        Err(e) => format!("❌ {e}"),
    }
}

async fn reply(state: &AppState, chat_id: i64, html_text: &str) {
    if let Err(e) = state.transport.send_notice(chat_id, html_text).await {
        tracing::warn!("Failed to send command reply: {e}");
    }
}

fn first_handle(args: &str) -> Option<String> {
    let handle = args.split_whitespace().next()?.trim_start_matches('@');
    if handle.is_empty() {
        None
    } else {
        Some(handle.to_string())
    }
}

fn start_text(msg: &Message) -> String {
    let greeting = msg
        .from()
        .map(|u| crate::telegram::message_handler::mention_html(u))
        .unwrap_or_else(|| "there".to_string());
    format!(
        "Hi {greeting}! 👋\n\n\
         I'm your group management bot. I can help you:\n\
         • Filter spam and ads\n\
         • Remove unwanted links\n\
         • Keep your group clean\n\n\
         Use /help to see all commands."
    )
}

const HELP_TEXT: &str = "🤖 <b>Group Management Bot Commands:</b>\n\n\
<b>Admin Commands:</b>\n\
/start - Start the bot\n\
/help - Show this help message\n\
/status - Show bot status\n\
/ban @username - Ban a user\n\
/unban @username - Unban a user\n\
/warn @username - Warn a user\n\
/warnings @username - Show a user's warnings\n\
/clearwarnings @username - Clear a user's warnings\n\
/clear - Clear all warnings\n\n\
<b>Bot Features:</b>\n\
• Automatically detects spam links\n\
• Warns users for violations\n\
• Bans repeat offenders\n\
• Auto-deletes enforcement notices";

fn status_text(state: &AppState) -> String {
    let cfg = &state.config.moderation;
    let flag = |on: bool| if on { "✅" } else { "❌" };
    format!(
        "📊 <b>Bot Status:</b>\n\n\
         Spam Filtering: {}\n\
         Warning System: {} ({} warnings before ban)\n\
         Forwarded-Message Blocking: {}\n\
         Max Links Per Message: {}\n\
         Allowed Domains: {}\n\
         Auto-Delete: ✅ ({}s)\n\n\
         Bot is running and protecting your group! 🛡️",
        flag(cfg.enabled),
        flag(cfg.warning_system_enabled),
        cfg.warnings_before_ban,
        flag(cfg.block_forwarded),
        cfg.max_links_per_message,
        if cfg.allowed_domains.is_empty() {
            "none".to_string()
        } else {
            let mut domains: Vec<&str> = cfg.allowed_domains.iter().map(String::as_str).collect();
            domains.sort_unstable();
            domains.join(", ")
        },
        cfg.notice_delete_delay.as_secs(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_command_strips_bot_suffix() {
        assert_eq!(
            parse_command("/ban@GuardBot @spammer"),
            ("ban".to_string(), "@spammer".to_string())
        );
    }

    #[test]
    fn parse_command_lowercases() {
        assert_eq!(parse_command("/Help"), ("help".to_string(), String::new()));
    }

    #[test]
    fn first_handle_strips_at_sign() {
        assert_eq!(first_handle("@spammer extra"), Some("spammer".to_string()));
        assert_eq!(first_handle(""), None);
        assert_eq!(first_handle("@"), None);
    }
}
