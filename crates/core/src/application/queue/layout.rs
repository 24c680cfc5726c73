// Persisted Layout
//
// queue namespace `N`:            count, UID_<i>
// registry namespace `N.registry`: count, counter, UID_<i>
//
// Each `UID_<i>` slot holds one JSON-encoded QueueEntry. Keeping the two
// lifecycles in separate namespaces means registry growth never touches the
// active queue's `count`.

use crate::domain::{PermanentNumber, QueueEntry};
use crate::error::{AppError, Result};
use tracing::warn;

/// Number of persisted slots in a namespace
pub const COUNT_KEY: &str = "count";

/// Next permanent number to assign (registry namespace only)
pub const COUNTER_KEY: &str = "counter";

/// Counter value for a fresh namespace
pub const INITIAL_COUNTER: PermanentNumber = 1;

/// Suffix appended to the base namespace for the permanent-number registry
pub const REGISTRY_SUFFIX: &str = ".registry";

/// Upper bound on `count` in either namespace
pub const MAX_SLOTS: i64 = 100_000;

/// Key of slot `index`
pub fn slot_key(index: i64) -> String {
    format!("UID_{}", index)
}

/// The pair of namespaces owned by one queue manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueNamespaces {
    queue: String,
    registry: String,
}

impl QueueNamespaces {
    pub fn new(base: &str) -> Result<Self> {
        if base.trim().is_empty() {
            return Err(AppError::Validation(
                "Namespace cannot be empty".to_string(),
            ));
        }
        // "x.registry" as a queue would share storage with the registry of "x"
        if base.ends_with(REGISTRY_SUFFIX) {
            return Err(AppError::Validation(format!(
                "Namespace {:?} must not end with {:?}",
                base, REGISTRY_SUFFIX
            )));
        }
        Ok(Self {
            queue: base.to_string(),
            registry: format!("{}{}", base, REGISTRY_SUFFIX),
        })
    }

    /// Namespace holding the active queue
    pub fn queue(&self) -> &str {
        &self.queue
    }

    /// Namespace holding the permanent-number registry
    pub fn registry(&self) -> &str {
        &self.registry
    }
}

/// Number of slots worth reading for a stored `count`
pub(crate) fn readable_slots(namespace: &str, count: i64) -> i64 {
    if count > MAX_SLOTS {
        warn!(
            namespace = %namespace,
            count = count,
            max = MAX_SLOTS,
            "Stored count out of range, reading first slots only"
        );
    }
    count.clamp(0, MAX_SLOTS)
}

pub(crate) fn encode_slot(entry: &QueueEntry) -> Result<String> {
    Ok(serde_json::to_string(entry)?)
}

pub(crate) fn decode_slot(raw: &str) -> serde_json::Result<QueueEntry> {
    serde_json::from_str(raw)
}
