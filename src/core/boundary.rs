//! Time-boundary arithmetic for the light/dark cycle.
//!
//! All functions here are pure: they take the two daily boundaries and the
//! current minute of the day and answer "which theme is active" and "when is
//! the next change". Intervals are half-open, so the boundary minute belongs to
//! the interval it starts and never to the one it ends.
//!
//! The light interval wraps past midnight when `light_start > dark_start`
//! (e.g. light from 22:00 to 07:00). A pair with equal boundaries has an empty
//! light interval and is dark around the clock.
//!
//! `current_minutes` is read modulo one day, so a value of 1440 or more
//! names the same minute as its remainder.

use std::cmp::Ordering;
use std::time::Duration;

use super::{Theme, TimeOfDay};
use crate::common::constants::{MAX_TIMER_DELAY, MILLIS_PER_MINUTE, MINUTES_PER_DAY};

/// Whether the light interval contains `current_minutes`.
pub fn is_light_now(light_start: TimeOfDay, dark_start: TimeOfDay, current_minutes: u32) -> bool {
    let (l, d, c) = (
        light_start.minutes(),
        dark_start.minutes(),
        current_minutes % MINUTES_PER_DAY,
    );

    match l.cmp(&d) {
        Ordering::Less => c >= l && c < d,
        Ordering::Greater => c >= l || c < d,
        // Empty light interval
        Ordering::Equal => false,
    }
}

/// Minute of the next theme change, counted from today's midnight.
///
/// Values of 1440 or more mean the change happens tomorrow. The result is
/// always greater than `current_minutes % 1440`.
pub fn next_boundary_minutes(
    light_start: TimeOfDay,
    dark_start: TimeOfDay,
    current_minutes: u32,
) -> u32 {
    let (l, d, c) = (
        light_start.minutes(),
        dark_start.minutes(),
        current_minutes % MINUTES_PER_DAY,
    );

    match l.cmp(&d) {
        Ordering::Less => {
            if c < l {
                l
            } else if c < d {
                d
            } else {
                l + MINUTES_PER_DAY
            }
        }
        Ordering::Greater => {
            if c < d {
                // Early-morning part of the wrapped light interval
                d
            } else if c >= l {
                // Evening part: dark starts tomorrow
                d + MINUTES_PER_DAY
            } else {
                l
            }
        }
        // Nothing ever changes; wake at the next occurrence of the shared minute.
        Ordering::Equal => {
            if c < l {
                l
            } else {
                l + MINUTES_PER_DAY
            }
        }
    }
}

/// Milliseconds from `current_minutes` until the next theme change.
///
/// Always strictly positive and at most one day.
pub fn milliseconds_until_next_boundary(
    light_start: TimeOfDay,
    dark_start: TimeOfDay,
    current_minutes: u32,
) -> u64 {
    let c = current_minutes % MINUTES_PER_DAY;
    let delta = next_boundary_minutes(light_start, dark_start, c) - c;
    u64::from(delta) * MILLIS_PER_MINUTE
}

/// Clamp a computed delay to [`MAX_TIMER_DELAY`].
///
/// Arithmetic alone never exceeds a day, but a clock that jumps between reading
/// the time and arming the timer can produce nonsense.
pub fn capped_delay(millis: u64) -> Duration {
    Duration::from_millis(millis).min(MAX_TIMER_DELAY)
}

/// The two daily boundaries that split the day into light and dark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryPair {
    pub light_start: TimeOfDay,
    pub dark_start: TimeOfDay,
}

impl BoundaryPair {
    pub fn new(light_start: TimeOfDay, dark_start: TimeOfDay) -> Self {
        Self {
            light_start,
            dark_start,
        }
    }

    /// True when the light interval crosses midnight.
    pub fn wraps_midnight(&self) -> bool {
        self.light_start > self.dark_start
    }

    /// True when both boundaries are the same minute (always dark).
    pub fn is_degenerate(&self) -> bool {
        self.light_start == self.dark_start
    }

    pub fn is_light_at(&self, current_minutes: u32) -> bool {
        is_light_now(self.light_start, self.dark_start, current_minutes)
    }

    pub fn theme_at(&self, current_minutes: u32) -> Theme {
        if self.is_light_at(current_minutes) {
            Theme::Light
        } else {
            Theme::Dark
        }
    }

    pub fn next_boundary(&self, current_minutes: u32) -> u32 {
        next_boundary_minutes(self.light_start, self.dark_start, current_minutes)
    }

    /// Delay until the next change, already capped for timer use.
    pub fn delay_until_next_boundary(&self, current_minutes: u32) -> Duration {
        capped_delay(milliseconds_until_next_boundary(
            self.light_start,
            self.dark_start,
            current_minutes,
        ))
    }

    /// Time of day of the next change.
    pub fn next_boundary_time(&self, current_minutes: u32) -> TimeOfDay {
        let minutes = self.next_boundary(current_minutes) % MINUTES_PER_DAY;
        TimeOfDay::from_minutes(minutes).unwrap_or(TimeOfDay::MIDNIGHT)
    }
}
