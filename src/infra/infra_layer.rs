// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "moderation/in_memory.rs"]
pub mod moderation;
