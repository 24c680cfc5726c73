// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid timestamp (expected YYYY-MM-DD HH:MM:SS): {0:?}")]
    InvalidTimestamp(String),

    #[error("UID must not be empty")]
    EmptyUid,

    #[error("UID too long: {len} bytes (max {max})")]
    UidTooLong { len: usize, max: usize },

    #[error("Permanent number counter exhausted at {0}")]
    CounterExhausted(i64),

    #[error("Namespace {namespace:?} is full ({max} slots)")]
    CapacityExceeded { namespace: String, max: i64 },
}

pub type Result<T> = std::result::Result<T, DomainError>;
