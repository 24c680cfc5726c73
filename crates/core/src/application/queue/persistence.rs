// Load/Save round-trip for the active queue
//
// An early return via `?` drops the open handle, which releases the namespace
// without committing; `close` is only reached once every write succeeded.
//
// The counter is written before the queue namespace is opened. Raising it is
// harmless on its own, so the queue slots are the last thing a save commits.

use super::layout::{
    decode_slot, encode_slot, readable_slots, slot_key, COUNTER_KEY, COUNT_KEY,
    INITIAL_COUNTER, MAX_SLOTS,
};
use super::{sort_by_timestamp, PersistentOrderedQueue};
use crate::domain::{DomainError, PermanentNumber, QueueEntry};
use crate::error::Result;
use crate::port::NamespaceHandle;
use tracing::{debug, info, warn};

impl PersistentOrderedQueue {
    /// Rebuild the in-memory queue and counter from the store.
    ///
    /// Slots that are missing, have an empty UID, or fail to decode are
    /// skipped. The result is sorted by timestamp.
    pub async fn load(&mut self) -> Result<()> {
        let mut registry = self.store.open(self.namespaces.registry()).await?;
        let counter = registry.get_int(COUNTER_KEY, INITIAL_COUNTER).await?;
        registry.close().await?;

        let mut ns = self.store.open(self.namespaces.queue()).await?;
        let count = ns.get_int(COUNT_KEY, 0).await?;
        let count = readable_slots(self.namespaces.queue(), count);
        let mut entries = read_slots(ns.as_mut(), self.namespaces.queue(), count).await?;
        ns.close().await?;

        sort_by_timestamp(&mut entries);

        info!(
            namespace = %self.namespaces.queue(),
            slots = count,
            loaded = entries.len(),
            counter = counter,
            "Queue loaded"
        );

        self.entries = entries;
        self.counter = counter.max(INITIAL_COUNTER);
        Ok(())
    }

    /// Overwrite the persisted queue with the in-memory one, and persist the counter.
    pub async fn save(&self) -> Result<()> {
        self.save_entries(&self.entries).await
    }

    /// Full overwrite: the counter, then `count` plus every slot in `0..count`
    pub(super) async fn save_entries(&self, entries: &[QueueEntry]) -> Result<()> {
        if entries.len() as i64 > MAX_SLOTS {
            return Err(DomainError::CapacityExceeded {
                namespace: self.namespaces.queue().to_string(),
                max: MAX_SLOTS,
            }
            .into());
        }

        self.persist_counter(self.counter).await?;

        let mut ns = self.store.open(self.namespaces.queue()).await?;
        ns.put_int(COUNT_KEY, entries.len() as i64).await?;
        for (index, entry) in entries.iter().enumerate() {
            ns.put_string(&slot_key(index as i64), &encode_slot(entry)?)
                .await?;
        }
        ns.close().await?;

        debug!(
            namespace = %self.namespaces.queue(),
            count = entries.len(),
            "Queue saved"
        );
        Ok(())
    }

    /// Write `counter` to the registry, never lowering what is already stored
    pub(super) async fn persist_counter(&self, counter: PermanentNumber) -> Result<()> {
        let mut registry = self.store.open(self.namespaces.registry()).await?;
        let stored = registry.get_int(COUNTER_KEY, INITIAL_COUNTER).await?;
        if counter > stored {
            registry.put_int(COUNTER_KEY, counter).await?;
        }
        registry.close().await?;
        Ok(())
    }
}

/// Read slots `0..count`, skipping unusable ones
async fn read_slots(
    ns: &mut dyn NamespaceHandle,
    namespace: &str,
    count: i64,
) -> Result<Vec<QueueEntry>> {
    let mut entries = Vec::new();
    for index in 0..count {
        let raw = ns.get_string(&slot_key(index), "").await?;
        if raw.is_empty() {
            debug!(namespace = %namespace, slot = index, "Skipping empty slot");
            continue;
        }
        match decode_slot(&raw) {
            Ok(entry) if !entry.uid.is_empty() => entries.push(entry),
            Ok(_) => {
                debug!(namespace = %namespace, slot = index, "Skipping slot with empty UID");
            }
            Err(e) => {
                warn!(namespace = %namespace, slot = index, error = %e, "Skipping corrupted slot");
            }
        }
    }
    Ok(entries)
}
