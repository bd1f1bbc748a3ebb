// Moderation domain models - data structures for the spam filter.
//
// These are pure domain types with no Telegram dependencies.
// The telegram layer converts these to Bot API calls.

use crate::core::transport::SenderRole;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// A message as seen by the decision engine. Immutable once built.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub sender_id: u64,
    pub sender_role: SenderRole,
    /// HTML mention of the sender, interpolated into notices.
    pub sender_mention: String,
    pub text: Option<String>,
    pub caption: Option<String>,
    pub is_forwarded: bool,
}

/// Result of classifying a message body. Never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Whether the message crossed the spam threshold
    pub is_spam: bool,
    /// Human-readable reasons, in signal order
    pub reasons: Vec<String>,
    /// Additive confidence in [0, 0.9]
    pub confidence: f64,
}

impl Classification {
    /// Create a "not spam" result.
    pub fn clean() -> Self {
        Self {
            is_spam: false,
            reasons: Vec::new(),
            confidence: 0.0,
        }
    }
}

/// The decided outcome for one processed message.
///
/// This is a decision record only - it carries no side effects. The
/// telegram layer executes it against the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum EnforcementAction {
    /// Message is fine, leave it alone
    None,
    /// Delete the message, post a notice, no ledger change
    DeleteOnly { notice: String },
    /// Delete the message and warn the sender
    DeleteAndWarn {
        notice: String,
        warning_count: u32,
        max_warnings: u32,
    },
    /// Delete the message and ban the sender
    DeleteAndBan { notice: String },
}

/// Which message field the offending links were found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkField {
    Text,
    Caption,
}

/// Templates for user-facing notices. `{user}` expands to the HTML
/// mention of the offending user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoticeTemplates {
    pub ban: String,
    pub caption_ban: String,
    pub forwarded: String,
}

impl Default for NoticeTemplates {
    fn default() -> Self {
        Self {
            ban: "🚫 {user} has been banned for sharing links.\n\n\
                  Sharing any type of links is not allowed in this group."
                .to_string(),
            caption_ban: "🚫 {user} has been banned for sharing links in a caption.\n\n\
                          Sharing any type of links is not allowed in this group."
                .to_string(),
            forwarded: "📵 {user}, forwarded messages are not allowed in this group."
                .to_string(),
        }
    }
}

/// Configuration for the moderation pipeline.
///
/// Built once at startup and passed read-only into every core entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationConfig {
    /// Master switch for spam detection
    pub enabled: bool,
    /// Domains exempt from the disallowed-domain signal (lower-case hosts)
    pub allowed_domains: HashSet<String>,
    /// Links allowed per message before the volume signal fires
    pub max_links_per_message: usize,
    /// Warnings a user accumulates before a ban
    pub warnings_before_ban: u32,
    /// When false, the first link violation bans immediately
    pub warning_system_enabled: bool,
    /// Whether forwarded messages are deleted outright
    pub block_forwarded: bool,
    /// How long enforcement notices stay visible
    pub notice_delete_delay: Duration,
    pub templates: NoticeTemplates,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_domains: HashSet::new(), // empty set = no domains allowed
            max_links_per_message: 0,        // no links allowed
            warnings_before_ban: 3,
            warning_system_enabled: true,
            block_forwarded: false,
            notice_delete_delay: Duration::from_secs(5),
            templates: NoticeTemplates::default(),
        }
    }
}
