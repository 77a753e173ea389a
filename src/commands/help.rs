//! Help command implementation for themeclock.
//!
//! Dispatches to command-specific help, or shows the command overview.

use anyhow::Result;

/// Show brief usage for a command (used for error messages)
pub fn show_command_usage(command: &str) {
    match command {
        "get" | "g" => log_block_start!("Usage: themeclock get [--json]"),
        "set" | "s" => log_block_start!("Usage: themeclock set <auto|light|dark>"),
        "simulate" | "S" => log_block_start!("Usage: themeclock simulate <start> <end>"),
        "toggle" | "t" => log_block_start!("Usage: themeclock toggle"),
        _ => log_block_start!("Usage: themeclock [OPTIONS] [COMMAND]"),
    }
}

/// Run the help command (dispatcher)
///
/// # Arguments
/// * `command` - Optional command name to get help for (None = general help)
pub fn run_help_command(command: Option<&str>) -> Result<()> {
    match command {
        None => display_general_help(),
        Some("get") | Some("g") => super::get::display_help(),
        Some("help") | Some("h") => display_help_help(),
        Some("set") | Some("s") => super::set::display_help(),
        Some("simulate") | Some("S") => super::simulate::display_help(),
        Some("toggle") | Some("t") => super::toggle::display_help(),
        Some(unknown) => {
            log_warning!("Unknown command: {unknown}");
            display_general_help();
        }
    }
    Ok(())
}

fn display_general_help() {
    log_version!();
    log_block_start!("Available Commands:");
    log_indented!("get, g [--json]          Show the current theme and mode");
    log_indented!("help, h [COMMAND]        Show detailed help for a command");
    log_indented!("set, s <auto|light|dark> Choose and persist the theme mode");
    log_indented!("simulate, S <start> <end> Fast-forward through theme changes");
    log_indented!("toggle, t                Switch to the opposite theme");
    log_pipe!();
    log_info!("Use 'themeclock help <command>' to see detailed help for a specific command.");
    log_indented!("Use 'themeclock --help' to see all options and general usage.");
    log_end!();
}

fn display_help_help() {
    log_version!();
    log_block_start!("help - Show help for themeclock commands");
    log_block_start!("Usage: themeclock help [COMMAND]");
    log_end!();
}
