// In-memory implementation of the warning ledger.
//
// Warnings intentionally live for the bot's uptime only; losing them on
// a restart is acceptable, so there is no persistence layer behind this.

use crate::core::moderation::{ModerationError, WarnStore};
use async_trait::async_trait;
use dashmap::DashMap;

/// DashMap-backed warning ledger.
///
/// The `entry()` API makes `increment` a single atomic update, which is
/// what gives us linearizable counts under concurrent message handling.
pub struct InMemoryWarnStore {
    warnings: DashMap<u64, u32>,
}

impl InMemoryWarnStore {
    /// Create a new empty ledger.
    pub fn new() -> Self {
        Self {
            warnings: DashMap::new(),
        }
    }
}

impl Default for InMemoryWarnStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WarnStore for InMemoryWarnStore {
    async fn increment(&self, user_id: u64) -> Result<u32, ModerationError> {
        let count = *self
            .warnings
            .entry(user_id)
            .and_modify(|c| *c = c.saturating_add(1))
            .or_insert(1);
        Ok(count)
    }

    async fn count(&self, user_id: u64) -> Result<u32, ModerationError> {
        Ok(self.warnings.get(&user_id).map(|c| *c).unwrap_or(0))
    }

    async fn clear(&self, user_id: u64) -> Result<(), ModerationError> {
        self.warnings.remove(&user_id);
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), ModerationError> {
        self.warnings.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn absent_user_has_zero_warnings() {
        let store = InMemoryWarnStore::new();
        assert_eq!(store.count(1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn increment_creates_then_counts_up() {
        let store = InMemoryWarnStore::new();
        assert_eq!(store.increment(1).await.unwrap(), 1);
        assert_eq!(store.increment(1).await.unwrap(), 2);
        assert_eq!(store.count(1).await.unwrap(), 2);
        assert_eq!(store.count(2).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let store = InMemoryWarnStore::new();
        store.increment(1).await.unwrap();
        store.clear(1).await.unwrap();
        assert_eq!(store.count(1).await.unwrap(), 0);
        store.clear(1).await.unwrap();
        assert_eq!(store.count(1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn clear_all_resets_every_user() {
        let store = InMemoryWarnStore::new();
        store.increment(1).await.unwrap();
        store.increment(2).await.unwrap();
        store.clear_all().await.unwrap();
        assert_eq!(store.count(1).await.unwrap(), 0);
        assert_eq!(store.count(2).await.unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_increments_never_lose_updates() {
        let store = Arc::new(InMemoryWarnStore::new());

        let mut handles = Vec::new();
        for _ in 0..100 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.increment(7).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.count(7).await.unwrap(), 100);
    }
}
