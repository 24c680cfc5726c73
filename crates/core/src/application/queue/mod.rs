// Persistent Ordered Queue - owns the active queue, the counter and both namespaces

mod layout;
mod persistence;
mod registry;


pub use layout::{
    slot_key, QueueNamespaces, COUNTER_KEY, COUNT_KEY, INITIAL_COUNTER, MAX_SLOTS,
    REGISTRY_SUFFIX,
};

use crate::domain::{PermanentNumber, QueueEntry};
use crate::error::Result;
use crate::port::KeyValueStore;
use std::sync::Arc;
use tracing::{debug, info};

/// Durable queue of waiting participants, sorted by timestamp.
///
/// Every mutation is written through to the store before it becomes visible
/// in memory. Permanent numbers are allocated from a separate registry that
/// outlives queue membership (see [`Self::get_or_assign_permanent_number`]).
///
/// One instance per namespace. All mutating methods take `&mut self`, so
/// operations never overlap.
pub struct PersistentOrderedQueue {
    store: Arc<dyn KeyValueStore>,
    namespaces: QueueNamespaces,
    entries: Vec<QueueEntry>,
    counter: PermanentNumber,
}

impl PersistentOrderedQueue {
    /// Create an empty manager. Call [`Self::load`] to restore persisted state.
    pub fn new(store: Arc<dyn KeyValueStore>, namespace: &str) -> Result<Self> {
        Ok(Self {
            store,
            namespaces: QueueNamespaces::new(namespace)?,
            entries: Vec::new(),
            counter: INITIAL_COUNTER,
        })
    }

    /// Create a manager and restore its persisted state
    pub async fn open(store: Arc<dyn KeyValueStore>, namespace: &str) -> Result<Self> {
        let mut queue = Self::new(store, namespace)?;
        queue.load().await?;
        Ok(queue)
    }

    /// Read-only view of the active queue, in timestamp order
    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QueueEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Next permanent number this manager would assign
    pub fn counter(&self) -> PermanentNumber {
        self.counter
    }

    pub fn namespaces(&self) -> &QueueNamespaces {
        &self.namespaces
    }

    /// Append an entry, re-sort and persist.
    ///
    /// Duplicate UIDs are not checked here; use [`Self::add_if_new`].
    ///
    /// # Errors
    /// - `AppError::Domain` if the UID is empty or the timestamp malformed,
    ///   or the queue already holds [`MAX_SLOTS`] entries
    /// - `AppError::Storage` if persisting fails (the queue is left unchanged)
    pub async fn add(
        &mut self,
        uid: &str,
        timestamp: &str,
        number: PermanentNumber,
    ) -> Result<()> {
        let entry = QueueEntry::new(uid, timestamp, number);
        entry.validate()?;

        let mut next = self.entries.clone();
        next.push(entry);
        sort_by_timestamp(&mut next);

        self.save_entries(&next).await?;
        self.entries = next;

        debug!(uid = %uid, number = number, queue_len = self.entries.len(), "Entry added");
        Ok(())
    }

    /// Add only if `uid` is not already waiting. Returns whether it was added.
    pub async fn add_if_new(
        &mut self,
        uid: &str,
        timestamp: &str,
        number: PermanentNumber,
    ) -> Result<bool> {
        if self.exists(uid) {
            debug!(uid = %uid, "Entry already queued, skipping");
            return Ok(false);
        }
        self.add(uid, timestamp, number).await?;
        Ok(true)
    }

    /// Remove every entry with `uid` and persist. Returns how many were removed.
    pub async fn remove_by_uid(&mut self, uid: &str) -> Result<usize> {
        let next: Vec<QueueEntry> = self
            .entries
            .iter()
            .filter(|entry| entry.uid != uid)
            .cloned()
            .collect();
        let removed = self.entries.len() - next.len();

        self.save_entries(&next).await?;
        self.entries = next;

        info!(uid = %uid, removed = removed, "Removed from queue");
        Ok(removed)
    }

    /// Linear scan of the in-memory queue
    pub fn exists(&self, uid: &str) -> bool {
        self.entries.iter().any(|entry| entry.uid == uid)
    }

    pub fn find(&self, uid: &str) -> Option<&QueueEntry> {
        self.entries.iter().find(|entry| entry.uid == uid)
    }

    /// Console listing: header, one line per entry, footer
    pub fn render(&self) -> String {
        let mut out = String::from("Current Queue:\n");
        for entry in &self.entries {
            out.push_str(&entry.to_string());
            out.push('\n');
        }
        out.push_str(LISTING_FOOTER);
        out.push('\n');
        out
    }

    /// Write [`Self::render`] to stdout
    pub fn print(&self) {
        print!("{}", self.render());
    }
}

const LISTING_FOOTER: &str = "------------------------------";

/// Ascending by timestamp; stable, so equal timestamps keep insertion order
fn sort_by_timestamp(entries: &mut [QueueEntry]) {
    entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
}
