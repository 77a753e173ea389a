//! Implementation of the simulate command.
//!
//! Installs a manual clock as the global time source, then jumps it from
//! boundary to boundary between the requested start and end instants. The
//! controller runs exactly as it does in the daemon, so the log shows every
//! change it would make, each line stamped with the simulated time.
//!
//! Simulation always runs in `auto` mode against in-memory storage and a
//! logging sink; nothing on disk is touched.

use anyhow::Result;
use chrono::{DateTime, Duration as ChronoDuration, Local};
use std::sync::Arc;

use crate::config::Config;
use crate::controller::{ControllerOptions, ThemeController};
use crate::core::{Mode, Theme};
use crate::sink::LogSink;
use crate::storage::ThemeStorage;
use crate::time_source::{self, ManualTimeSource, TimeSource};

/// Handle the simulate command.
///
/// # Arguments
/// * `start_time` - Start time in format "YYYY-MM-DD HH:MM:SS"
/// * `end_time` - End time in format "YYYY-MM-DD HH:MM:SS"
pub fn handle_simulate_command(start_time: &str, end_time: &str) -> Result<()> {
    let start = time_source::parse_datetime(start_time)
        .map_err(|e| anyhow::anyhow!("Invalid start time: {e}"))?;
    let end = time_source::parse_datetime(end_time)
        .map_err(|e| anyhow::anyhow!("Invalid end time: {e}"))?;

    if end <= start {
        anyhow::bail!("End time must be after start time");
    }

    let config = Config::load()?;

    // Install the clock before any logging so every line carries a timestamp
    let clock = Arc::new(ManualTimeSource::new(start));
    time_source::init_time_source(clock.clone());

    log_version!();
    log_block_start!("Simulation Mode");
    log_decorated!(
        "Simulating from {} to {}",
        start.format("%Y-%m-%d %H:%M:%S"),
        end.format("%Y-%m-%d %H:%M:%S")
    );
    let duration = end.signed_duration_since(start);
    log_indented!(
        "Total simulated time: {} hours {} minutes",
        duration.num_hours(),
        duration.num_minutes() % 60
    );

    let options = ControllerOptions {
        default_mode: Mode::Auto,
        ..ControllerOptions::from_config(&config)
    };
    let controller = ThemeController::new(options, ThemeStorage::in_memory(), LogSink, clock.clone());

    let changes = run_simulation(&controller, &clock, end);

    log_block_start!("Simulation complete");
    log_indented!("{} theme change(s)", changes.len());
    log_end!();
    Ok(())
}

/// Advance `clock` boundary by boundary until `end`, refreshing the
/// controller at each step. Returns every change with the instant it happened.
pub fn run_simulation(
    controller: &ThemeController,
    clock: &ManualTimeSource,
    end: DateTime<Local>,
) -> Vec<(DateTime<Local>, Theme)> {
    let mut changes = Vec::new();
    let mut theme = controller.theme();

    while let Some(delay) = controller.next_change() {
        let now = clock.now();
        if now >= end {
            break;
        }

        let step = ChronoDuration::from_std(delay).unwrap_or_else(|_| ChronoDuration::days(1));
        clock.set((now + step).min(end));
        controller.refresh();

        let current = controller.theme();
        if current != theme {
            theme = current;
            changes.push((clock.now(), current));
        }
    }

    changes
}

pub fn display_help() {
    log_version!();
    log_block_start!("simulate - Fast-forward through theme changes");
    log_block_start!("Usage: themeclock simulate <start> <end>");
    log_indented!("<start>, <end>   Local times as \"YYYY-MM-DD HH:MM:SS\"");
    log_block_start!("Example:");
    log_indented!("themeclock simulate \"2025-06-10 06:00:00\" \"2025-06-12 06:00:00\"");
    log_end!();
}
