//! Theme calculation core.
//!
//! This module answers two questions for a pair of daily boundaries and an
//! instant: which theme is active, and how long until it changes. Everything
//! here is pure and free of I/O so it can be evaluated from any thread.
//!
//! ## Key Functionality
//! - **Time parsing**: `HH:MM` strings into [`TimeOfDay`] with typed errors
//! - **Theme detection**: half-open light/dark intervals, including midnight wraparound
//! - **Scheduling**: delay until the next boundary, capped for timer use
//! - **Change reporting**: standardized messages when the displayed theme changes

pub mod boundary;
pub mod state_detection;
pub mod time_of_day;

pub use boundary::{
    BoundaryPair, capped_delay, is_light_now, milliseconds_until_next_boundary,
    next_boundary_minutes,
};
pub use state_detection::{ThemeChange, detect_theme_change, log_theme_announcement};
pub use time_of_day::{TimeOfDay, TimeParseError, parse_time_of_day};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The computed theme. Carries no history; it is purely a function of the
/// boundaries and the current instant (or of a manual override).
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    /// Value written to the theme attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Light => "Light",
            Self::Dark => "Dark",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Light => "󰖨 ",
            Self::Dark => " ",
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-facing override state.
///
/// `Auto` follows the clock; `Light` and `Dark` pin the theme until the mode
/// changes again.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Auto,
    Light,
    Dark,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// The pinned theme of a manual mode, `None` for `Auto`.
    pub fn forced_theme(&self) -> Option<Theme> {
        match self {
            Self::Auto => None,
            Self::Light => Some(Theme::Light),
            Self::Dark => Some(Theme::Dark),
        }
    }

    pub fn is_manual(&self) -> bool {
        !matches!(self, Self::Auto)
    }
}

impl From<Theme> for Mode {
    fn from(theme: Theme) -> Self {
        match theme {
            Theme::Light => Mode::Light,
            Theme::Dark => Mode::Dark,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "automatic" | "system" => Ok(Mode::Auto),
            "light" => Ok(Mode::Light),
            "dark" => Ok(Mode::Dark),
            other => anyhow::bail!("Unknown mode '{other}' (expected auto, light or dark)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("auto".parse::<Mode>().unwrap(), Mode::Auto);
        assert_eq!(" Light ".parse::<Mode>().unwrap(), Mode::Light);
        assert_eq!("DARK".parse::<Mode>().unwrap(), Mode::Dark);
        assert_eq!("system".parse::<Mode>().unwrap(), Mode::Auto);
        assert!("dusk".parse::<Mode>().is_err());
    }

    #[test]
    fn test_mode_forced_theme() {
        assert_eq!(Mode::Auto.forced_theme(), None);
        assert_eq!(Mode::Light.forced_theme(), Some(Theme::Light));
        assert_eq!(Mode::Dark.forced_theme(), Some(Theme::Dark));
        assert!(!Mode::Auto.is_manual());
        assert!(Mode::Dark.is_manual());
    }

    #[test]
    fn test_theme_display_and_opposite() {
        assert_eq!(Theme::Light.to_string(), "light");
        assert_eq!(Theme::Dark.to_string(), "dark");
        assert_eq!(Theme::Light.opposite(), Theme::Dark);
        assert_eq!(Mode::from(Theme::Dark), Mode::Dark);
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Theme::Dark).unwrap(), "\"dark\"");
        assert_eq!(
            serde_json::from_str::<Mode>("\"auto\"").unwrap(),
            Mode::Auto
        );
    }
}
