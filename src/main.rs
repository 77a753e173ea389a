//! Main application entry point.
//!
//! Parses the command line, applies the global flags (`--debug`, `--config`)
//! and dispatches to the daemon or one of the one-shot commands. Errors are
//! printed in the logger's style and turned into a non-zero exit code.

use anyhow::Result;

use themeclock::Themeclock;
use themeclock::args::{self, CliAction, ParsedArgs};
use themeclock::commands;
use themeclock::common::constants::EXIT_FAILURE;
use themeclock::logger::Log;
use themeclock::log_error_exit;

fn main() {
    let parsed_args = ParsedArgs::from_env();

    if let Err(e) = dispatch(parsed_args.action) {
        log_error_exit!("{e:#}");
        std::process::exit(EXIT_FAILURE);
    }
}

fn dispatch(action: CliAction) -> Result<()> {
    match action {
        CliAction::ShowVersion => {
            args::display_version_info();
            Ok(())
        }
        CliAction::ShowHelp => {
            args::display_help();
            Ok(())
        }
        CliAction::ShowHelpDueToError => {
            args::display_help();
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::HelpCommand { command } => commands::help::run_help_command(command.as_deref()),
        CliAction::Run {
            debug_enabled,
            config_dir,
        } => {
            init(debug_enabled, config_dir)?;
            Themeclock::new(debug_enabled).run()
        }
        CliAction::Get {
            debug_enabled,
            config_dir,
            json,
        } => {
            init(debug_enabled, config_dir)?;
            commands::get::handle_get_command(json)
        }
        CliAction::Set {
            debug_enabled,
            config_dir,
            mode,
        } => {
            init(debug_enabled, config_dir)?;
            commands::set::handle_set_command(mode)
        }
        CliAction::Toggle {
            debug_enabled,
            config_dir,
        } => {
            init(debug_enabled, config_dir)?;
            commands::toggle::handle_toggle_command()
        }
        CliAction::Simulate {
            debug_enabled,
            config_dir,
            start_time,
            end_time,
        } => {
            init(debug_enabled, config_dir)?;
            commands::simulate::handle_simulate_command(&start_time, &end_time)
        }
    }
}

/// Apply the global flags shared by every command.
fn init(debug_enabled: bool, config_dir: Option<String>) -> Result<()> {
    Log::set_debug(debug_enabled);
    themeclock::config::set_config_dir(config_dir)?;
    Ok(())
}
