// Queue Synchronisation Message
//
// A peer device broadcasts one of these whenever it changes its queue. The
// field bounds match the fixed-size message layout used on the wire.

use serde::{Deserialize, Serialize};

use crate::domain::entry::{validate_timestamp, validate_uid, PermanentNumber, QueueEntry};
use crate::domain::error::{DomainError, Result};

/// Maximum UID length in bytes (20-byte field, NUL-terminated)
pub const MAX_UPDATE_UID_LEN: usize = 19;

/// Maximum timestamp length in bytes (25-byte field, NUL-terminated)
pub const MAX_UPDATE_TIMESTAMP_LEN: usize = 24;

/// A queue change received from a peer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueUpdate {
    pub uid: String,
    pub timestamp: String,
    pub number: PermanentNumber,

    /// `true` asks the receiver to drop the UID instead of adding it
    #[serde(default)]
    pub remove_from_queue: bool,
}

impl QueueUpdate {
    pub fn join(entry: &QueueEntry) -> Self {
        Self {
            uid: entry.uid.clone(),
            timestamp: entry.timestamp.clone(),
            number: entry.number,
            remove_from_queue: false,
        }
    }

    pub fn leave(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            timestamp: String::new(),
            number: 0,
            remove_from_queue: true,
        }
    }

    /// Check the message against the wire bounds.
    ///
    /// Removal messages only need a UID; join messages must also carry a
    /// well-formed timestamp.
    pub fn validate(&self) -> Result<()> {
        validate_uid(&self.uid)?;
        if self.uid.len() > MAX_UPDATE_UID_LEN {
            return Err(DomainError::UidTooLong {
                len: self.uid.len(),
                max: MAX_UPDATE_UID_LEN,
            });
        }
        if self.timestamp.len() > MAX_UPDATE_TIMESTAMP_LEN {
            return Err(DomainError::InvalidTimestamp(self.timestamp.clone()));
        }
        if !self.remove_from_queue {
            validate_timestamp(&self.timestamp)?;
        }
        Ok(())
    }

    pub fn into_entry(self) -> QueueEntry {
        QueueEntry::new(self.uid, self.timestamp, self.number)
    }
}
