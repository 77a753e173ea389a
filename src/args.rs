//! Command-line argument parsing and processing.
//!
//! This module handles parsing of command-line arguments and provides a clean
//! interface for the main application logic. Global flags (`--config`,
//! `--debug`, `--help`, `--version`) may appear anywhere; the first positional
//! argument selects the command.

use crate::core::Mode;

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the scheduler until interrupted
    Run {
        debug_enabled: bool,
        config_dir: Option<String>,
    },
    /// Print the current theme, mode and next change
    Get {
        debug_enabled: bool,
        config_dir: Option<String>,
        json: bool,
    },
    /// Persist a mode
    Set {
        debug_enabled: bool,
        config_dir: Option<String>,
        mode: Mode,
    },
    /// Force the theme opposite to the current one
    Toggle {
        debug_enabled: bool,
        config_dir: Option<String>,
    },
    /// Fast-forward a simulated clock between two instants
    Simulate {
        debug_enabled: bool,
        config_dir: Option<String>,
        start_time: String,
        end_time: String,
    },
    /// Help for a specific command
    HelpCommand { command: Option<String> },
    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to an invalid argument and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// The first item is the program name and is skipped.
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        let mut debug_enabled = false;
        let mut display_help = false;
        let mut display_version = false;
        let mut json = false;
        let mut config_dir: Option<String> = None;
        let mut positionals: Vec<String> = Vec::new();

        let mut i = 0;
        while i < args_vec.len() {
            let arg = &args_vec[i];
            match arg.as_str() {
                "--help" | "-h" => display_help = true,
                "--version" | "-V" | "-v" => display_version = true,
                "--debug" | "-d" => debug_enabled = true,
                "--json" | "-j" => json = true,
                "--config" | "-c" => {
                    match args_vec.get(i + 1) {
                        Some(dir) if !dir.starts_with('-') => {
                            config_dir = Some(dir.clone());
                            i += 1;
                        }
                        _ => {
                            log_warning!("Missing directory for {arg}. Usage: --config <dir>");
                            return ParsedArgs::error();
                        }
                    }
                }
                flag if flag.starts_with('-') && flag.len() > 1 => {
                    log_warning!("Unknown argument: {flag}");
                    return ParsedArgs::error();
                }
                _ => positionals.push(arg.clone()),
            }
            i += 1;
        }

        // Version and help take precedence over everything else
        if display_version {
            return ParsedArgs {
                action: CliAction::ShowVersion,
            };
        }
        if display_help {
            return ParsedArgs {
                action: CliAction::ShowHelp,
            };
        }

        // Only `get` has a machine-readable form
        let is_get = positionals
            .first()
            .is_some_and(|command| matches!(command.as_str(), "get" | "g"));
        if json && !is_get {
            log_warning!("--json is only supported by the get command");
            return ParsedArgs::usage_error("get");
        }

        let Some(command) = positionals.first() else {
            return ParsedArgs {
                action: CliAction::Run {
                    debug_enabled,
                    config_dir,
                },
            };
        };
        let rest = &positionals[1..];

        let action = match command.as_str() {
            "run" | "r" if rest.is_empty() => CliAction::Run {
                debug_enabled,
                config_dir,
            },
            "get" | "g" if rest.is_empty() => CliAction::Get {
                debug_enabled,
                config_dir,
                json,
            },
            "toggle" | "t" if rest.is_empty() => CliAction::Toggle {
                debug_enabled,
                config_dir,
            },
            "set" | "s" => match rest {
                [value] => match value.parse::<Mode>() {
                    Ok(mode) => CliAction::Set {
                        debug_enabled,
                        config_dir,
                        mode,
                    },
                    Err(e) => {
                        log_warning!("{e}");
                        return ParsedArgs::usage_error("set");
                    }
                },
                _ => return ParsedArgs::usage_error("set"),
            },
            "simulate" | "S" => match rest {
                [start, end] => CliAction::Simulate {
                    debug_enabled,
                    config_dir,
                    start_time: start.clone(),
                    end_time: end.clone(),
                },
                _ => return ParsedArgs::usage_error("simulate"),
            },
            "help" | "h" if rest.len() <= 1 => CliAction::HelpCommand {
                command: rest.first().cloned(),
            },
            "run" | "r" | "get" | "g" | "toggle" | "t" | "help" | "h" => {
                log_warning!("Unexpected arguments after '{command}'");
                return ParsedArgs::usage_error(command);
            }
            unknown => {
                log_warning!("Unknown command: {unknown}");
                return ParsedArgs::error();
            }
        };

        ParsedArgs { action }
    }

    /// Convenience method to parse from std::env::args()
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }

    fn error() -> ParsedArgs {
        ParsedArgs {
            action: CliAction::ShowHelpDueToError,
        }
    }

    fn usage_error(command: &str) -> ParsedArgs {
        crate::commands::help::show_command_usage(command);
        Self::error()
    }
}

/// Displays version information using custom logging style.
pub fn display_version_info() {
    log_version!();
    log_pipe!();
    println!("┗ {}", env!("CARGO_PKG_DESCRIPTION"));
}

/// Displays custom help message using logger methods.
pub fn display_help() {
    log_version!();
    log_block_start!(env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("themeclock [OPTIONS] [COMMAND]");
    log_block_start!("Options:");
    log_indented!("-c, --config <dir>        Use custom configuration directory");
    log_indented!("-d, --debug               Enable detailed debug output");
    log_indented!("-h, --help                Print help information");
    log_indented!("-V, --version             Print version information");
    log_block_start!("Commands:");
    log_indented!("run, r                    Keep the theme in sync with the clock (default)");
    log_indented!("get, g [--json]           Show the current theme and mode");
    log_indented!("help, h [COMMAND]         Show detailed help for a command");
    log_indented!("set, s <auto|light|dark>  Choose and persist the theme mode");
    log_indented!("simulate, S <start> <end> Fast-forward through theme changes");
    log_indented!("toggle, t                 Switch to the opposite theme");
    log_end!();
}
