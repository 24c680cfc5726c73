// Domain Layer - Pure business logic and entities

pub mod entry;
pub mod error;
pub mod update;

// Re-exports
pub use entry::{
    format_timestamp, validate_timestamp, validate_uid, PermanentNumber, QueueEntry, Uid,
    TIMESTAMP_FORMAT, TIMESTAMP_LEN,
};
pub use error::DomainError;
pub use update::{QueueUpdate, MAX_UPDATE_TIMESTAMP_LEN, MAX_UPDATE_UID_LEN};
