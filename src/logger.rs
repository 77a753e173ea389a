//! Structured logging with box-drawing output.
//!
//! Every line the application prints goes through the macros defined here so the
//! output keeps one visual style:
//!
//! ```text
//! ┏ themeclock v0.1.0 ━━╸
//! ┃
//! ┣ Entering light theme
//! ┃   Next change at 22:00 (in 13h 40m)
//! ╹
//! ```
//!
//! ## Conventions
//!
//! - `log_block_start!` opens a new conceptual block (`┃` spacer, then `┣ message`).
//! - `log_decorated!` continues the current block (`┣ message`).
//! - `log_indented!` prints details that belong to the preceding line.
//! - `log_pipe!` inserts an empty `┃` line, typically before a `[LEVEL]` message.
//! - `log_info!`, `log_warning!`, `log_error!` and `log_debug!` print a `[LEVEL]` tag.
//!   `log_debug!` is silent unless debug output was switched on.
//! - `log_version!` and `log_end!` frame the whole session.
//!
//! Output can be muted globally with [`Log::set_enabled`], which tests and the
//! one-shot commands use to keep stdout clean.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);
static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

/// Global switches for the logging macros.
pub struct Log;

impl Log {
    /// Enable or disable all log output.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Enable or disable `log_debug!` output.
    pub fn set_debug(enabled: bool) {
        DEBUG_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_debug() -> bool {
        DEBUG_ENABLED.load(Ordering::SeqCst)
    }

    /// Timestamp prefix shown while running on a simulated clock.
    ///
    /// Returns an empty string on the real clock, where the terminal already
    /// gives the reader a sense of time.
    pub fn timestamp_prefix() -> String {
        if crate::time_source::is_initialized() && crate::time_source::is_simulated() {
            format!("[{}] ", crate::time_source::now().format("%H:%M:%S"))
        } else {
            String::new()
        }
    }
}

/// Write already formatted text to stdout. Public for macro access.
pub fn write_output(text: &str) {
    let mut stdout = std::io::stdout().lock();
    let _ = stdout.write_all(text.as_bytes());
    let _ = stdout.flush();
}

/// Shared body of the logging macros: `lead` is printed before the prefix-less
/// message, `spacer` controls the leading `┃` line.
#[doc(hidden)]
#[macro_export]
macro_rules! __log_line {
    ($spacer:expr, $lead:expr, $($arg:tt)+) => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::timestamp_prefix();
            let message = format!($($arg)+);
            let mut formatted = String::new();
            if $spacer {
                formatted.push_str(&format!("{prefix}┃\n"));
            }
            formatted.push_str(&format!("{prefix}{}{message}\n", $lead));
            $crate::logger::write_output(&formatted);
        }
    }};
}

/// Log a message that continues the current block.
#[macro_export]
macro_rules! log_decorated {
    ($($arg:tt)+) => {
        $crate::__log_line!(false, "┣ ", $($arg)+)
    };
}

/// Log a detail line belonging to the preceding message.
#[macro_export]
macro_rules! log_indented {
    ($($arg:tt)+) => {
        $crate::__log_line!(false, "┃   ", $($arg)+)
    };
}

/// Log a block start message, opening a new conceptual block.
#[macro_export]
macro_rules! log_block_start {
    ($($arg:tt)+) => {
        $crate::__log_line!(true, "┣ ", $($arg)+)
    };
}

/// Log an empty pipe line for vertical spacing.
#[macro_export]
macro_rules! log_pipe {
    () => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::timestamp_prefix();
            $crate::logger::write_output(&format!("{prefix}┃\n"));
        }
    }};
}

/// Log the application version header.
#[macro_export]
macro_rules! log_version {
    () => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::timestamp_prefix();
            let version = env!("CARGO_PKG_VERSION");
            $crate::logger::write_output(&format!("{prefix}┏ themeclock v{version} ━━╸\n"));
        }
    }};
}

/// Log the final termination marker.
#[macro_export]
macro_rules! log_end {
    () => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::timestamp_prefix();
            $crate::logger::write_output(&format!("{prefix}╹\n"));
        }
    }};
}

/// Log an informational message in green.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)+) => {
        $crate::__log_line!(false, "┣[\x1b[32mINFO\x1b[0m] ", $($arg)+)
    };
}

/// Log a warning in yellow.
#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)+) => {
        $crate::__log_line!(false, "┣[\x1b[33mWARNING\x1b[0m] ", $($arg)+)
    };
}

/// Log an error in red.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)+) => {
        $crate::__log_line!(false, "┣[\x1b[31mERROR\x1b[0m] ", $($arg)+)
    };
}

/// Log an error that terminates the current flow, closing the box.
#[macro_export]
macro_rules! log_error_exit {
    ($($arg:tt)+) => {
        $crate::__log_line!(true, "┗[\x1b[31mERROR\x1b[0m] ", $($arg)+)
    };
}

/// Log a debug message. Only printed when debug output is enabled.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)+) => {{
        if $crate::logger::Log::is_debug() {
            $crate::__log_line!(false, "┣[\x1b[32mDEBUG\x1b[0m] ", $($arg)+)
        }
    }};
}
