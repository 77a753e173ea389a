//! Application-wide constants and defaults.
//!
//! Keeping these in one place lets configuration loading, the controller and the
//! CLI agree on the same fallbacks without threading them through call sites.

use std::time::Duration;

use crate::core::TimeOfDay;

// # Application Defaults

/// Default start of the light interval (HH:MM).
pub const DEFAULT_LIGHT_START: &str = "07:00";
/// Default start of the dark interval (HH:MM).
pub const DEFAULT_DARK_START: &str = "22:00";
/// Parsed forms of the two defaults above.
pub const DEFAULT_LIGHT_START_TIME: TimeOfDay = TimeOfDay::const_hm(7, 0);
pub const DEFAULT_DARK_START_TIME: TimeOfDay = TimeOfDay::const_hm(22, 0);
/// Mode used when nothing has been persisted yet.
pub const DEFAULT_MODE: &str = "auto";
/// Storage key holding the persisted mode.
pub const DEFAULT_STORAGE_KEY: &str = "themeclock-mode";
/// Attribute written to the target element.
pub const DEFAULT_ATTRIBUTE: &str = "data-theme";

// # Clock Arithmetic

pub const MINUTES_PER_HOUR: u32 = 60;
pub const HOURS_PER_DAY: u32 = 24;
pub const MINUTES_PER_DAY: u32 = MINUTES_PER_HOUR * HOURS_PER_DAY;
pub const MILLIS_PER_MINUTE: u64 = 60_000;

/// Upper bound for any armed timer. A boundary is never more than a day away,
/// so anything larger points at a clock anomaly.
pub const MAX_TIMER_DELAY: Duration = Duration::from_millis(MINUTES_PER_DAY as u64 * MILLIS_PER_MINUTE);

// # File Names

pub const CONFIG_DIR_NAME: &str = "themeclock";
pub const CONFIG_FILE_NAME: &str = "themeclock.toml";
pub const STORE_FILE_NAME: &str = "store.json";
pub const TARGET_FILE_NAME: &str = "theme";

// # Runtime

/// Granularity at which the run loop checks for shutdown while waiting.
pub const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Disagreement between wall-clock and monotonic time, in seconds, that counts
/// as a clock change or a resume from suspend.
pub const CLOCK_JUMP_THRESHOLD_SECS: i64 = 5;

// # Exit Code

pub const EXIT_FAILURE: i32 = 1;

#[cfg(test)]
pub mod test_constants {
    pub const TEST_LIGHT_START: &str = "07:00";
    pub const TEST_DARK_START: &str = "22:00";
    pub const TEST_LIGHT_MINUTES: u32 = 420;
    pub const TEST_DARK_MINUTES: u32 = 1320;
}
