//! Set command: choose `auto`, `light` or `dark` and persist the choice.

use anyhow::Result;

use crate::config::Config;
use crate::controller::{ControllerOptions, ThemeController};
use crate::core::Mode;
use crate::time_source;

/// Handle the set command.
pub fn handle_set_command(mode: Mode) -> Result<()> {
    log_version!();

    let config = Config::load()?;
    let controller = ThemeController::new(
        ControllerOptions::from_config(&config),
        super::open_storage(),
        super::attribute_sink(&config)?,
        time_source::global(),
    );

    controller.set_mode(mode);

    log_block_start!("Mode is now {}", controller.mode());
    log_indented!("Theme: {}", controller.theme().display_name());
    if let Some(time) = controller.next_change_time() {
        log_indented!("Next automatic change at {time}");
    }
    log_indented!("A running themeclock picks this up on SIGHUP");
    log_end!();
    Ok(())
}

pub fn display_help() {
    log_version!();
    log_block_start!("set - Choose the theme mode");
    log_block_start!("Usage: themeclock set <auto|light|dark>");
    log_indented!("auto     Follow the light_start/dark_start schedule");
    log_indented!("light    Keep the light theme until changed");
    log_indented!("dark     Keep the dark theme until changed");
    log_end!();
}
