// Check-In Service - the tag-tap workflow on top of the persistent queue

use crate::application::queue::PersistentOrderedQueue;
use crate::domain::{format_timestamp, QueueEntry, QueueUpdate};
use crate::error::{AppError, Result};
use crate::port::TimeProvider;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of a check-in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckIn {
    /// The participant's entry as it sits in the queue
    pub entry: QueueEntry,
    /// `false` if the participant was already waiting
    pub newly_queued: bool,
}

/// Check-In Service
pub struct CheckInService {
    queue: PersistentOrderedQueue,
    time_provider: Arc<dyn TimeProvider>,
}

impl CheckInService {
    pub fn new(queue: PersistentOrderedQueue, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            queue,
            time_provider,
        }
    }

    pub fn queue(&self) -> &PersistentOrderedQueue {
        &self.queue
    }

    pub fn into_queue(self) -> PersistentOrderedQueue {
        self.queue
    }

    /// Number the participant (or recall their number) and queue them once.
    ///
    /// A participant who is already waiting keeps their original place.
    pub async fn check_in(&mut self, uid: &str) -> Result<CheckIn> {
        let now = self.time_provider.now();
        let number = self.queue.get_or_assign_permanent_number(uid, &now).await?;
        let timestamp = format_timestamp(&now);

        let newly_queued = self.queue.add_if_new(uid, &timestamp, number).await?;
        let entry = self
            .queue
            .find(uid)
            .cloned()
            .ok_or_else(|| AppError::Internal(format!("{} missing after check-in", uid)))?;

        info!(
            uid = %uid,
            number = entry.number,
            newly_queued = newly_queued,
            "Checked in"
        );
        Ok(CheckIn {
            entry,
            newly_queued,
        })
    }

    /// Take the participant out of the queue. Returns whether they were waiting.
    pub async fn check_out(&mut self, uid: &str) -> Result<bool> {
        let removed = self.queue.remove_by_uid(uid).await?;
        Ok(removed > 0)
    }

    /// Mirror a change made on a peer device.
    ///
    /// Joins go through `add_if_new`, so replayed messages are harmless.
    pub async fn apply_update(&mut self, update: QueueUpdate) -> Result<()> {
        update.validate()?;

        if update.remove_from_queue {
            debug!(uid = %update.uid, "Applying remote removal");
            self.queue.remove_by_uid(&update.uid).await?;
        } else {
            debug!(uid = %update.uid, number = update.number, "Applying remote join");
            let entry = update.into_entry();
            self.queue
                .add_if_new(&entry.uid, &entry.timestamp, entry.number)
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::kv_store::mocks::InMemoryKeyValueStore;
    use crate::port::time_provider::mocks::FixedTimeProvider;

    fn setup() -> (InMemoryKeyValueStore, Arc<FixedTimeProvider>, CheckInService) {
        let store = InMemoryKeyValueStore::new();
        let clock = Arc::new(FixedTimeProvider::at("2024-05-01 08:00:00"));
        let queue = PersistentOrderedQueue::new(Arc::new(store.clone()), "desk").unwrap();
        let service = CheckInService::new(queue, clock.clone());
        (store, clock, service)
    }

    #[tokio::test]
    async fn test_check_in_numbers_and_queues() {
        let (_store, clock, mut service) = setup();

        let first = service.check_in("04A1").await.unwrap();
        clock.advance_secs(30);
        let second = service.check_in("04B2").await.unwrap();

        assert!(first.newly_queued && second.newly_queued);
        assert_eq!(first.entry.number, 1);
        assert_eq!(first.entry.timestamp, "2024-05-01 08:00:00");
        assert_eq!(second.entry.number, 2);
        assert_eq!(second.entry.timestamp, "2024-05-01 08:00:30");
        assert_eq!(service.queue().len(), 2);
    }

    #[tokio::test]
    async fn test_repeat_check_in_keeps_place() {
        let (_store, clock, mut service) = setup();

        service.check_in("04A1").await.unwrap();
        clock.advance_secs(600);
        let again = service.check_in("04A1").await.unwrap();

        assert!(!again.newly_queued);
        assert_eq!(again.entry.timestamp, "2024-05-01 08:00:00");
        assert_eq!(service.queue().len(), 1);
    }

    #[tokio::test]
    async fn test_rejoin_after_check_out_keeps_number() {
        let (_store, clock, mut service) = setup();

        service.check_in("04A1").await.unwrap();
        service.check_in("04B2").await.unwrap();
        assert!(service.check_out("04A1").await.unwrap());
        assert!(!service.check_out("04A1").await.unwrap());

        clock.advance_secs(3600);
        let rejoined = service.check_in("04A1").await.unwrap();

        assert!(rejoined.newly_queued);
        assert_eq!(rejoined.entry.number, 1);
        assert_eq!(rejoined.entry.timestamp, "2024-05-01 09:00:00");
        let order: Vec<&str> = service.queue().iter().map(|e| e.uid.as_str()).collect();
        assert_eq!(order, vec!["04B2", "04A1"]);
    }

    #[tokio::test]
    async fn test_apply_remote_updates() {
        let (_store, _clock, mut service) = setup();
        let remote = QueueEntry::new("04C3", "2024-05-01 07:45:00", 9);

        service
            .apply_update(QueueUpdate::join(&remote))
            .await
            .unwrap();
        // Replay is harmless
        service
            .apply_update(QueueUpdate::join(&remote))
            .await
            .unwrap();
        assert_eq!(service.queue().entries(), &[remote]);

        service
            .apply_update(QueueUpdate::leave("04C3"))
            .await
            .unwrap();
        assert!(service.queue().is_empty());
    }

    #[tokio::test]
    async fn test_apply_invalid_update_rejected() {
        let (store, _clock, mut service) = setup();
        let update = QueueUpdate {
            uid: "x".repeat(32),
            timestamp: "2024-05-01 07:45:00".to_string(),
            number: 1,
            remove_from_queue: false,
        };

        let result = service.apply_update(update).await;
        assert!(matches!(result, Err(AppError::Domain(_))));
        assert_eq!(store.open_count(), 0);
    }
}
