// Queue Entry Domain Model

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, Result};

/// Participant identifier (e.g. an RFID tag UID)
pub type Uid = String;

/// Sequence number permanently bound to a UID once assigned
pub type PermanentNumber = i64;

/// `chrono` format string matching the persisted timestamp encoding
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Length of a `YYYY-MM-DD HH:MM:SS` timestamp
pub const TIMESTAMP_LEN: usize = 19;

/// One waiting participant.
///
/// `timestamp` is the sort key. It is fixed-width and zero-padded, so plain
/// string comparison orders entries chronologically.
///
/// The same shape is used for registry records, where `timestamp` is the
/// time the UID was first numbered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub uid: Uid,
    pub number: PermanentNumber,
    pub timestamp: String,
}

impl QueueEntry {
    pub fn new(
        uid: impl Into<String>,
        timestamp: impl Into<String>,
        number: PermanentNumber,
    ) -> Self {
        Self {
            uid: uid.into(),
            number,
            timestamp: timestamp.into(),
        }
    }

    /// Validate the fields that persistence and ordering depend on
    pub fn validate(&self) -> Result<()> {
        validate_uid(&self.uid)?;
        validate_timestamp(&self.timestamp)
    }
}

impl std::fmt::Display for QueueEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "No: {} | UID: {} | Time: {}",
            self.number, self.uid, self.timestamp
        )
    }
}

/// Format a clock reading as `YYYY-MM-DD HH:MM:SS` (zero-padded, 4-digit year)
pub fn format_timestamp<T: Datelike + Timelike>(now: &T) -> String {
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        now.year(),
        now.month(),
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    )
}

/// Reject UIDs that could not be told apart from an empty slot
pub fn validate_uid(uid: &str) -> Result<()> {
    if uid.is_empty() {
        return Err(DomainError::EmptyUid);
    }
    Ok(())
}

/// Accept only the exact fixed-width encoding, since ordering is lexicographic
pub fn validate_timestamp(timestamp: &str) -> Result<()> {
    if timestamp.len() != TIMESTAMP_LEN
        || NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).is_err()
    {
        return Err(DomainError::InvalidTimestamp(timestamp.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_format_timestamp_zero_pads() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 1)
            .unwrap();

        assert_eq!(format_timestamp(&now), "2024-03-07 09:05:01");
    }

    #[test]
    fn test_formatted_timestamp_is_valid() {
        let now = NaiveDate::from_ymd_opt(812, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();

        let formatted = format_timestamp(&now);
        assert_eq!(formatted, "0812-12-31 23:59:59");
        assert!(validate_timestamp(&formatted).is_ok());
    }

    #[test]
    fn test_validate_timestamp_rejects_unpadded() {
        assert!(validate_timestamp("2024-1-1 9:00:00").is_err());
        assert!(validate_timestamp("2024-01-01T09:00:00").is_err());
        assert!(validate_timestamp("").is_err());
        assert!(validate_timestamp("2024-13-01 09:00:00").is_err());
    }

    #[test]
    fn test_validate_uid() {
        assert!(matches!(validate_uid(""), Err(DomainError::EmptyUid)));
        assert!(validate_uid("04A1B2C3").is_ok());
    }

    #[test]
    fn test_display_line() {
        let entry = QueueEntry::new("04A1B2C3", "2024-01-01 10:00:00", 7);
        assert_eq!(
            entry.to_string(),
            "No: 7 | UID: 04A1B2C3 | Time: 2024-01-01 10:00:00"
        );
    }
}
