// Core moderation module - spam classification and enforcement logic.
// No Telegram dependencies here; the telegram layer adapts these results.

pub mod link_extractor;
pub mod moderation_models;
pub mod moderation_service;
pub mod notice_scheduler;
pub mod spam_classifier;

pub use link_extractor::*;
pub use moderation_models::*;
pub use moderation_service::*;
pub use notice_scheduler::*;
pub use spam_classifier::*;
