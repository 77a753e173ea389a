//! Toggle command: force the theme opposite to the one currently shown.

use anyhow::Result;

use crate::config::Config;
use crate::controller::{ControllerOptions, ThemeController};
use crate::time_source;

/// Handle the toggle command.
pub fn handle_toggle_command() -> Result<()> {
    log_version!();

    let config = Config::load()?;
    let controller = ThemeController::new(
        ControllerOptions::from_config(&config),
        super::open_storage(),
        super::attribute_sink(&config)?,
        time_source::global(),
    );

    let theme = controller.toggle();
    log_indented!("Run `themeclock set auto` to return to the schedule");
    log_debug!("Toggled to {theme} ({} mode)", controller.mode());
    log_end!();
    Ok(())
}

pub fn display_help() {
    log_version!();
    log_block_start!("toggle - Switch to the opposite theme");
    log_block_start!("Usage: themeclock toggle");
    log_indented!("Sets a manual mode opposite to the theme currently shown");
    log_end!();
}
