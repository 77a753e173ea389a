//! Theme change detection and logging.
//!
//! The controller compares the theme it last applied with the one it just
//! computed; this module classifies that comparison and prints the matching
//! announcement.

use super::Theme;

/// What happened between two evaluations.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ThemeChange {
    /// Nothing applied yet; the first theme is being set.
    Initial(Theme),
    /// Same theme as before.
    None,
    /// The theme flipped.
    Switched { from: Theme, to: Theme },
}

impl ThemeChange {
    /// Whether the sink needs to be written.
    pub fn requires_apply(&self) -> bool {
        !matches!(self, ThemeChange::None)
    }
}

/// Classify the transition from `previous` to `next`.
pub fn detect_theme_change(previous: Option<Theme>, next: Theme) -> ThemeChange {
    match previous {
        None => ThemeChange::Initial(next),
        Some(prev) if prev == next => ThemeChange::None,
        Some(prev) => ThemeChange::Switched {
            from: prev,
            to: next,
        },
    }
}

/// Log the announcement for a change. `manual` marks changes caused by an
/// override rather than the clock.
pub fn log_theme_announcement(change: &ThemeChange, manual: bool) {
    let source = if manual { "manual" } else { "scheduled" };
    match change {
        ThemeChange::None => {}
        ThemeChange::Initial(theme) => {
            log_block_start!(
                "Entering {} theme {}",
                theme.display_name().to_lowercase(),
                theme.symbol()
            );
        }
        ThemeChange::Switched { from, to } => {
            log_block_start!(
                "Switching from {} to {} theme {}",
                from.display_name().to_lowercase(),
                to.display_name().to_lowercase(),
                to.symbol()
            );
            log_indented!("Change source: {source}");
        }
    }
}
