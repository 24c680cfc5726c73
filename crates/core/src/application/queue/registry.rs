// Permanent Number Registry
//
// Append-only log of uid -> (number, first-seen time) in the registry
// namespace. It is read fresh from the store on every call and never consults
// the in-memory queue, so a UID keeps its number after leaving the queue.

use super::layout::{
    decode_slot, encode_slot, readable_slots, slot_key, COUNTER_KEY, COUNT_KEY,
    INITIAL_COUNTER, MAX_SLOTS,
};
use super::PersistentOrderedQueue;
use crate::domain::{format_timestamp, validate_uid, DomainError, PermanentNumber, QueueEntry};
use crate::error::Result;
use crate::port::NamespaceHandle;
use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

impl PersistentOrderedQueue {
    /// Return the UID's permanent number, assigning the next one on first sight.
    ///
    /// Idempotent per UID: later calls return the stored number whatever
    /// `now` is and whether or not the UID is queued.
    ///
    /// # Errors
    /// - `AppError::Domain(EmptyUid)` for an empty UID
    /// - `AppError::Domain(CounterExhausted)` if the counter cannot advance
    /// - `AppError::Domain(CapacityExceeded)` if the registry holds [`MAX_SLOTS`] UIDs
    /// - `AppError::Storage` if the registry cannot be read or written
    pub async fn get_or_assign_permanent_number(
        &mut self,
        uid: &str,
        now: &NaiveDateTime,
    ) -> Result<PermanentNumber> {
        validate_uid(uid)?;

        let mut ns = self.store.open(self.namespaces.registry()).await?;
        let saved_count = ns.get_int(COUNT_KEY, 0).await?;
        let saved_count = readable_slots(self.namespaces.registry(), saved_count);

        if let Some(record) = scan_registry(ns.as_mut(), uid, saved_count).await? {
            ns.close().await?;
            debug!(uid = %uid, number = record.number, "Permanent number recalled");
            return Ok(record.number);
        }

        if saved_count >= MAX_SLOTS {
            return Err(DomainError::CapacityExceeded {
                namespace: self.namespaces.registry().to_string(),
                max: MAX_SLOTS,
            }
            .into());
        }

        // The stored counter wins if another session advanced it without a load
        let stored_counter = ns.get_int(COUNTER_KEY, INITIAL_COUNTER).await?;
        let number = stored_counter.max(self.counter).max(INITIAL_COUNTER);
        let next = number
            .checked_add(1)
            .ok_or(DomainError::CounterExhausted(number))?;

        let record = QueueEntry::new(uid, format_timestamp(now), number);
        ns.put_string(&slot_key(saved_count), &encode_slot(&record)?)
            .await?;
        ns.put_int(COUNT_KEY, saved_count + 1).await?;
        ns.put_int(COUNTER_KEY, next).await?;
        ns.close().await?;

        self.counter = next;

        info!(
            uid = %uid,
            number = number,
            registered_at = %record.timestamp,
            "Permanent number assigned"
        );
        Ok(number)
    }

    /// Look up a UID's permanent number without assigning one
    pub async fn permanent_number(&self, uid: &str) -> Result<Option<PermanentNumber>> {
        let mut ns = self.store.open(self.namespaces.registry()).await?;
        let saved_count = ns.get_int(COUNT_KEY, 0).await?;
        let saved_count = readable_slots(self.namespaces.registry(), saved_count);
        let record = scan_registry(ns.as_mut(), uid, saved_count).await?;
        ns.close().await?;
        Ok(record.map(|r| r.number))
    }
}

/// Find the record for `uid` among slots `0..count`
async fn scan_registry(
    ns: &mut dyn NamespaceHandle,
    uid: &str,
    count: i64,
) -> Result<Option<QueueEntry>> {
    for index in 0..count {
        let raw = ns.get_string(&slot_key(index), "").await?;
        if raw.is_empty() {
            continue;
        }
        match decode_slot(&raw) {
            Ok(record) if record.uid == uid => return Ok(Some(record)),
            Ok(_) => {}
            Err(e) => {
                warn!(slot = index, error = %e, "Skipping corrupted registry slot");
            }
        }
    }
    Ok(None)
}
