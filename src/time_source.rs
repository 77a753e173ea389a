//! Time source abstraction for real and simulated clocks.
//!
//! Everything that needs "now" asks a [`TimeSource`] instead of reading the
//! system clock directly. The controller receives one explicitly; the logger
//! and the CLI use the process-wide default installed with
//! [`init_time_source`]. Tests and the `simulate` command swap in a
//! [`ManualTimeSource`] and move time by hand.

use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveTime, TimeZone, Timelike};
use once_cell::sync::OnceCell;
use std::sync::{Arc, Mutex};

use crate::common::constants::MINUTES_PER_HOUR;

/// Global time source instance, defaults to RealTimeSource
static TIME_SOURCE: OnceCell<Arc<dyn TimeSource>> = OnceCell::new();

/// Trait for abstracting the current instant.
pub trait TimeSource: Send + Sync {
    /// Get the current local time.
    fn now(&self) -> DateTime<Local>;

    /// Minutes elapsed since local midnight, in `[0, 1440)`.
    fn minutes_since_midnight(&self) -> u32 {
        let now = self.now();
        now.hour() * MINUTES_PER_HOUR + now.minute()
    }

    /// Check if this is a simulated time source
    fn is_simulated(&self) -> bool;
}

/// The system clock.
pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn is_simulated(&self) -> bool {
        false
    }
}

/// A clock that only moves when told to.
///
/// Used by tests to pin the controller to a given minute and by the
/// `simulate` command to fast-forward through boundaries.
pub struct ManualTimeSource {
    current: Mutex<DateTime<Local>>,
}

impl ManualTimeSource {
    pub fn new(start: DateTime<Local>) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// A clock pinned to `hour:minute` today.
    ///
    /// Falls back to the current time when the wall-clock time does not exist
    /// today (a DST gap).
    pub fn at(hour: u32, minute: u32) -> Self {
        let today = Local::now().date_naive();
        let start = NaiveTime::from_hms_opt(hour, minute, 0)
            .and_then(|time| Local.from_local_datetime(&today.and_time(time)).earliest())
            .unwrap_or_else(Local::now);
        Self::new(start)
    }

    pub fn set(&self, instant: DateTime<Local>) {
        *self.lock() = instant;
    }

    pub fn advance(&self, by: ChronoDuration) {
        let mut guard = self.lock();
        *guard += by;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DateTime<Local>> {
        // A poisoned clock still holds a valid instant.
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> DateTime<Local> {
        *self.lock()
    }

    fn is_simulated(&self) -> bool {
        true
    }
}

/// Initialize the global time source (call once at startup)
pub fn init_time_source(source: Arc<dyn TimeSource>) {
    TIME_SOURCE.set(source).ok();
}

/// Check if the time source has been initialized
pub fn is_initialized() -> bool {
    TIME_SOURCE.get().is_some()
}

/// The global time source, installing the real clock on first use.
pub fn global() -> Arc<dyn TimeSource> {
    Arc::clone(TIME_SOURCE.get_or_init(|| Arc::new(RealTimeSource)))
}

/// Get the current time from the global time source
pub fn now() -> DateTime<Local> {
    TIME_SOURCE.get_or_init(|| Arc::new(RealTimeSource)).now()
}

/// Minutes since local midnight according to the global time source.
pub fn minutes_since_midnight() -> u32 {
    TIME_SOURCE
        .get_or_init(|| Arc::new(RealTimeSource))
        .minutes_since_midnight()
}

/// Check if we're running in simulation mode
pub fn is_simulated() -> bool {
    TIME_SOURCE
        .get_or_init(|| Arc::new(RealTimeSource))
        .is_simulated()
}

/// Parse a datetime string in the format "YYYY-MM-DD HH:MM:SS"
pub fn parse_datetime(s: &str) -> Result<DateTime<Local>, String> {
    use chrono::NaiveDateTime;

    let naive = NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M:%S")
        .map_err(|e| format!("Invalid datetime format: {e}. Use YYYY-MM-DD HH:MM:SS"))?;

    Local
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| "Ambiguous or invalid local time".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_source_minutes_since_midnight() {
        let clock = ManualTimeSource::at(8, 20);
        assert_eq!(clock.minutes_since_midnight(), 500);
        assert!(clock.is_simulated());
    }

    #[test]
    fn test_manual_source_advance_wraps_past_midnight() {
        let clock = ManualTimeSource::new(parse_datetime("2025-03-01 23:50:00").unwrap());
        clock.advance(ChronoDuration::minutes(20));
        assert_eq!(clock.minutes_since_midnight(), 10);
    }

    #[test]
    fn test_manual_source_set() {
        let clock = ManualTimeSource::at(0, 0);
        clock.set(parse_datetime("2025-06-15 13:05:00").unwrap());
        assert_eq!(clock.minutes_since_midnight(), 785);
    }

    #[test]
    fn test_real_source_in_range() {
        let minutes = RealTimeSource.minutes_since_midnight();
        assert!(minutes < 1440);
        assert!(!RealTimeSource.is_simulated());
    }

    #[test]
    fn test_parse_datetime_rejects_garbage() {
        assert!(parse_datetime("2025-06-15 13:05:00").is_ok());
        assert!(parse_datetime(" 2025-06-15 13:05:00 ").is_ok());
        assert!(parse_datetime("2025-06-15 13:05").is_err());
        assert!(parse_datetime("tomorrow").is_err());
    }
}
