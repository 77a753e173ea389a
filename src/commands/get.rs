//! Get command: report the current theme without changing anything.
//!
//! Reads the configuration and the persisted mode, then prints the theme,
//! the mode, and when the next automatic change happens. With `--json` the
//! same information is printed as a single JSON object for scripts.

use anyhow::Result;
use serde_json::json;

use crate::common::utils::format_minutes;
use crate::config::Config;
use crate::core::{BoundaryPair, Mode, Theme, TimeOfDay};
use crate::time_source;

/// What `get` reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeReport {
    pub theme: Theme,
    pub mode: Mode,
    pub boundaries: BoundaryPair,
    /// Next automatic change and the minutes until it; `None` in a manual mode.
    pub next_change: Option<(TimeOfDay, u64)>,
}

impl ThemeReport {
    /// Compute the report for `mode` at `current_minutes`.
    pub fn compute(boundaries: BoundaryPair, mode: Mode, current_minutes: u32) -> Self {
        let theme = mode
            .forced_theme()
            .unwrap_or_else(|| boundaries.theme_at(current_minutes));

        let next_change = (!mode.is_manual()).then(|| {
            let delay = boundaries.delay_until_next_boundary(current_minutes);
            (
                boundaries.next_boundary_time(current_minutes),
                delay.as_secs() / 60,
            )
        });

        Self {
            theme,
            mode,
            boundaries,
            next_change,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "theme": self.theme,
            "mode": self.mode.as_str(),
            "light_start": self.boundaries.light_start,
            "dark_start": self.boundaries.dark_start,
            "next_change": self.next_change.map(|(time, _)| time),
            "minutes_until_change": self.next_change.map(|(_, minutes)| minutes),
        })
    }
}

/// Handle the get command.
pub fn handle_get_command(json_output: bool) -> Result<()> {
    // Keep stdout clean for scripts
    if json_output {
        crate::logger::Log::set_enabled(false);
    }

    let config = Config::load()?;
    let mut storage = super::open_storage();
    let mode = storage
        .load_mode(config.storage_key())
        .unwrap_or_else(|| config.default_mode());

    let report = ThemeReport::compute(
        config.boundaries(),
        mode,
        time_source::minutes_since_midnight(),
    );

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report.to_json())?);
        return Ok(());
    }

    log_version!();
    log_block_start!(
        "Current theme: {} {}",
        report.theme.display_name(),
        report.theme.symbol()
    );
    log_indented!("Mode: {}", report.mode);
    log_indented!(
        "Light from {} to {}",
        report.boundaries.light_start,
        report.boundaries.dark_start
    );
    match report.next_change {
        Some((time, minutes)) => {
            log_indented!("Next change at {time} (in {})", format_minutes(minutes));
        }
        None => log_indented!("No automatic changes while a manual mode is set"),
    }
    log_end!();
    Ok(())
}

pub fn display_help() {
    log_version!();
    log_block_start!("get - Show the current theme and mode");
    log_block_start!("Usage: themeclock get [--json]");
    log_block_start!("Options:");
    log_indented!("--json, -j    Print the report as JSON");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::constants::*;

    fn default_pair() -> BoundaryPair {
        BoundaryPair::new(DEFAULT_LIGHT_START_TIME, DEFAULT_DARK_START_TIME)
    }

    #[test]
    fn test_report_auto_mode() {
        let report = ThemeReport::compute(default_pair(), Mode::Auto, 500);
        assert_eq!(report.theme, Theme::Light);
        assert_eq!(report.next_change, Some((TimeOfDay::const_hm(22, 0), 820)));
    }

    #[test]
    fn test_report_manual_mode() {
        let report = ThemeReport::compute(default_pair(), Mode::Dark, 500);
        assert_eq!(report.theme, Theme::Dark);
        assert_eq!(report.next_change, None);
    }

    #[test]
    fn test_report_json_shape() {
        let value = ThemeReport::compute(default_pair(), Mode::Auto, 1380).to_json();
        assert_eq!(value["theme"], "dark");
        assert_eq!(value["mode"], "auto");
        assert_eq!(value["light_start"], "07:00");
        assert_eq!(value["next_change"], "07:00");
        assert_eq!(value["minutes_until_change"], 480);

        let value = ThemeReport::compute(default_pair(), Mode::Light, 1380).to_json();
        assert!(value["next_change"].is_null());
    }
}
