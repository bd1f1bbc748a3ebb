// Moderation service - the enforcement decision engine.
//
// Turns one inbound message plus the sender's warning history into a
// single EnforcementAction. The service never touches the transport;
// the returned action is the complete description of what should happen.

use super::moderation_models::{
    EnforcementAction, InboundMessage, LinkField, ModerationConfig,
};
use super::spam_classifier::SpamClassifier;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("Ledger storage error: {0}")]
    StorageError(String),
}

// ============================================================================
// WARNING LEDGER (PORT)
// ============================================================================

/// Per-user warning counts.
///
/// A user absent from the ledger has zero warnings. Implementations must
/// make `increment` atomic: two concurrent increments for the same user
/// must never lose an update.
#[async_trait]
pub trait WarnStore: Send + Sync {
    /// Add one warning. Creates the entry at 1 if absent. Returns the new total.
    async fn increment(&self, user_id: u64) -> Result<u32, ModerationError>;

    /// Current warning count, 0 if the user has none.
    async fn count(&self, user_id: u64) -> Result<u32, ModerationError>;

    /// Remove the user's entry. Idempotent.
    async fn clear(&self, user_id: u64) -> Result<(), ModerationError>;

    /// Empty the ledger.
    async fn clear_all(&self) -> Result<(), ModerationError>;
}

// ============================================================================
// PER-USER SERIALIZATION
// ============================================================================

/// One mutex per user, so the increment-then-compare-then-maybe-clear
/// sequence for a user runs as a single critical section. Messages from
/// different users still proceed in parallel.
#[derive(Default)]
struct UserLocks {
    inner: Mutex<HashMap<u64, Arc<Mutex<()>>>>,
}

impl UserLocks {
    async fn lock_user(&self, user_id: u64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(user_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

// ============================================================================
// CORE SERVICE
// ============================================================================

/// Enforcement decision engine over an injected warning ledger.
pub struct ModerationService<S: WarnStore> {
    store: S,
    classifier: SpamClassifier,
    user_locks: UserLocks,
}

impl<S: WarnStore> ModerationService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            classifier: SpamClassifier::new(),
            user_locks: UserLocks::default(),
        }
    }

    /// Classify a message body without any enforcement side effects.
    #[allow(dead_code)]
    pub fn classify(
        &self,
        text: &str,
        config: &ModerationConfig,
    ) -> super::moderation_models::Classification {
        self.classifier.analyze(text, config)
    }

    /// Decide the enforcement action for one message.
    ///
    /// Ledger side effect: at most one escalation (increment, plus the
    /// reset that goes with a ban) per message. Forwarded-message blocking
    /// short-circuits the content checks entirely. Text is checked before
    /// the caption; the caption only matters when the text is absent or
    /// clean - that precedence is intentional.
    pub async fn decide(
        &self,
        msg: &InboundMessage,
        config: &ModerationConfig,
    ) -> Result<EnforcementAction, ModerationError> {
        if !config.enabled {
            return Ok(EnforcementAction::None);
        }

        if msg.sender_role.is_exempt() {
            return Ok(EnforcementAction::None);
        }

        if config.block_forwarded && msg.is_forwarded {
            return Ok(EnforcementAction::DeleteOnly {
                notice: render(&config.templates.forwarded, &msg.sender_mention),
            });
        }

        if let Some(text) = msg.text.as_deref() {
            let reasons = self.classifier.link_signals(text, config);
            if !reasons.is_empty() {
                return self
                    .escalate(msg.sender_id, &msg.sender_mention, reasons, LinkField::Text, config)
                    .await;
            }
        }

        if let Some(caption) = msg.caption.as_deref() {
            let reasons = self.classifier.link_signals(caption, config);
            if !reasons.is_empty() {
                return self
                    .escalate(
                        msg.sender_id,
                        &msg.sender_mention,
                        reasons,
                        LinkField::Caption,
                        config,
                    )
                    .await;
            }
        }

        Ok(EnforcementAction::None)
    }

    /// Warn-or-ban ladder for a link violation.
    ///
    /// Serialized per user so near-simultaneous offenses read a fresh
    /// count: no lost updates and no duplicate bans from a race.
    async fn escalate(
        &self,
        user_id: u64,
        mention: &str,
        reasons: Vec<String>,
        field: LinkField,
        config: &ModerationConfig,
    ) -> Result<EnforcementAction, ModerationError> {
        if !config.warning_system_enabled {
            // First offense bans outright; the ledger is not involved.
            return Ok(EnforcementAction::DeleteAndBan {
                notice: self.ban_notice(mention, field, config),
            });
        }

        let _guard = self.user_locks.lock_user(user_id).await;

        let new_count = self.store.increment(user_id).await?;
        if new_count >= config.warnings_before_ban {
            // A ban resets the counter.
            self.store.clear(user_id).await?;
            Ok(EnforcementAction::DeleteAndBan {
                notice: self.ban_notice(mention, field, config),
            })
        } else {
            Ok(EnforcementAction::DeleteAndWarn {
                notice: self.warning_notice(mention, &reasons, new_count, config.warnings_before_ban),
                warning_count: new_count,
                max_warnings: config.warnings_before_ban,
            })
        }
    }

    /// Manual warning issued by an admin command. Walks the same ladder
    /// as an automatic link violation.
    pub async fn warn_user(
        &self,
        user_id: u64,
        mention: &str,
        config: &ModerationConfig,
    ) -> Result<EnforcementAction, ModerationError> {
        self.escalate(
            user_id,
            mention,
            vec!["Warned by an administrator".to_string()],
            LinkField::Text,
            config,
        )
        .await
    }

    /// Current warning count for a user.
    pub async fn warning_count(&self, user_id: u64) -> Result<u32, ModerationError> {
        self.store.count(user_id).await
    }

    /// Clear warnings for a user (admin action).
    pub async fn clear_warnings(&self, user_id: u64) -> Result<(), ModerationError> {
        self.store.clear(user_id).await
    }

    /// Clear every user's warnings (admin action).
    pub async fn clear_all_warnings(&self) -> Result<(), ModerationError> {
        self.store.clear_all().await
    }

    // ------------------------------------------------------------------
    // Notice composition
    // ------------------------------------------------------------------

    /// Warning notice listing at most the first three reasons.
    pub fn warning_notice(
        &self,
        mention: &str,
        reasons: &[String],
        count: u32,
        max: u32,
    ) -> String {
        let mut notice = format!(
            "⚠️ <b>Warning {count}/{max}</b>\n\n{mention}, your message was removed for:\n"
        );
        if reasons.is_empty() {
            notice.push_str("• spam content\n");
        } else {
            for reason in reasons.iter().take(3) {
                notice.push_str(&format!("• {reason}\n"));
            }
        }
        notice.push_str("\nPlease follow the group rules and avoid sharing ads or spam links.");
        notice
    }

    fn ban_notice(&self, mention: &str, field: LinkField, config: &ModerationConfig) -> String {
        let template = match field {
            LinkField::Text => &config.templates.ban,
            LinkField::Caption => &config.templates.caption_ban,
        };
        render(template, mention)
    }
}

fn render(template: &str, mention: &str) -> String {
    template.replace("{user}", mention)
}

// ============================================================================
// TESTS
// ============================================================================
