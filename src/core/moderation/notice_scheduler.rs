// Ephemeral notice cleanup - enforcement notices delete themselves.
//
// Fire-and-forget: each scheduled deletion is its own tokio task, so
// message processing never waits on a timer. A deletion that fails
// (notice already gone, permissions lost) is logged and forgotten;
// there are no retries.

use crate::core::transport::{ChatTransport, NoticeRef};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct NoticeScheduler {
    transport: Arc<dyn ChatTransport>,
}

impl NoticeScheduler {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self { transport }
    }

    /// Arm a one-shot timer that deletes `notice` after `delay`.
    /// Returns immediately.
    pub fn schedule_deletion(&self, notice: NoticeRef, delay: Duration) {
        let transport = Arc::clone(&self.transport);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match transport.delete_message(notice.chat_id, notice.message_id).await {
                Ok(()) => tracing::info!(
                    chat_id = notice.chat_id,
                    message_id = notice.message_id,
                    "Auto-deleted notice after {}s",
                    delay.as_secs()
                ),
                Err(e) => tracing::warn!(
                    chat_id = notice.chat_id,
                    message_id = notice.message_id,
                    "Failed to auto-delete notice: {e}"
                ),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transport::{SenderRole, TransportError};
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    /// Records deletions; optionally fails them.
    struct FakeTransport {
        deleted: Mutex<Vec<NoticeRef>>,
        fail_deletes: bool,
    }

    impl FakeTransport {
        fn new(fail_deletes: bool) -> Self {
            Self {
                deleted: Mutex::new(Vec::new()),
                fail_deletes,
            }
        }
    }

    #[async_trait]
    impl ChatTransport for FakeTransport {
        async fn sender_role(&self, _: i64, _: u64) -> Result<SenderRole, TransportError> {
            Ok(SenderRole::Member)
        }

        async fn delete_message(
            &self,
            chat_id: i64,
            message_id: i32,
        ) -> Result<(), TransportError> {
            self.deleted.lock().await.push(NoticeRef { chat_id, message_id });
            if self.fail_deletes {
                Err(TransportError::Platform("message not found".to_string()))
            } else {
                Ok(())
            }
        }

        async fn ban_user(&self, _: i64, _: u64) -> Result<(), TransportError> {
            Ok(())
        }

        async fn unban_user(&self, _: i64, _: u64) -> Result<(), TransportError> {
            Ok(())
        }

        async fn send_notice(&self, chat_id: i64, _: &str) -> Result<NoticeRef, TransportError> {
            Ok(NoticeRef { chat_id, message_id: 1 })
        }

        async fn resolve_user_by_handle(&self, handle: &str) -> Result<u64, TransportError> {
            Err(TransportError::UnknownHandle(handle.to_string()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn deletes_after_the_delay_not_before() {
        let transport = Arc::new(FakeTransport::new(false));
        let scheduler = NoticeScheduler::new(transport.clone());
        let notice = NoticeRef { chat_id: 10, message_id: 99 };

        scheduler.schedule_deletion(notice, Duration::from_secs(5));

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert!(transport.deleted.lock().await.is_empty());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(*transport.deleted.lock().await, vec![notice]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_deletion_is_swallowed() {
        let transport = Arc::new(FakeTransport::new(true));
        let scheduler = NoticeScheduler::new(transport.clone());

        scheduler.schedule_deletion(NoticeRef { chat_id: 1, message_id: 2 }, Duration::from_secs(1));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(transport.deleted.lock().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn scheduling_does_not_block_the_caller() {
        let transport = Arc::new(FakeTransport::new(false));
        let scheduler = NoticeScheduler::new(transport.clone());

        let before = tokio::time::Instant::now();
        for id in 0..100 {
            scheduler.schedule_deletion(
                NoticeRef { chat_id: 1, message_id: id },
                Duration::from_secs(60),
            );
        }
        // No time passed while arming the timers.
        assert_eq!(before, tokio::time::Instant::now());
    }
}
