// Time Provider Port (for testability)

use chrono::NaiveDateTime;

/// Clock interface (allows fixed time in tests).
///
/// Readings expose year/month/day/hour/minute/second through
/// `chrono::Datelike` and `chrono::Timelike`.
pub trait TimeProvider: Send + Sync {
    /// Current local wall-clock time
    fn now(&self) -> NaiveDateTime;
}

/// System clock provider (production)
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use chrono::Duration;
    use std::sync::Mutex;

    /// Clock that only moves when told to
    pub struct FixedTimeProvider {
        now: Mutex<NaiveDateTime>,
    }

    impl FixedTimeProvider {
        pub fn new(now: NaiveDateTime) -> Self {
            Self {
                now: Mutex::new(now),
            }
        }

        /// Build from a `YYYY-MM-DD HH:MM:SS` string
        pub fn at(timestamp: &str) -> Self {
            let now = NaiveDateTime::parse_from_str(timestamp, crate::domain::TIMESTAMP_FORMAT)
                .expect("valid test timestamp");
            Self::new(now)
        }

        pub fn advance_secs(&self, secs: i64) {
            let mut now = self.now.lock().unwrap();
            *now += Duration::seconds(secs);
        }
    }

    impl TimeProvider for FixedTimeProvider {
        fn now(&self) -> NaiveDateTime {
            *self.now.lock().unwrap()
        }
    }
}
