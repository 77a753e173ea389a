//! Configuration system for themeclock.
//!
//! Settings are read from `themeclock.toml` in `XDG_CONFIG_HOME/themeclock/`,
//! or from a custom directory given with `--config`:
//!
//! ```toml
//! #[Schedule]
//! light_start = "07:00"      # Start of the light interval (HH:MM)
//! dark_start = "22:00"       # Start of the dark interval (HH:MM)
//!
//! #[Behavior]
//! default_mode = "auto"      # Mode used until one is persisted: "auto", "light", "dark"
//! persist_auto = false       # Store "auto" explicitly instead of clearing the key
//!
//! #[Output]
//! storage_key = "themeclock-mode" # Key under which the mode is persisted
//! attribute = "data-theme"        # Attribute name written to the target
//! target = "~/.local/state/themeclock/default/theme" # File standing in for the themed element
//! ```
//!
//! ## Validation and Fallbacks
//!
//! Structural problems (empty keys, unknown modes, malformed TOML) are errors.
//! Boundary times are different: an invalid `light_start` or `dark_start` is
//! replaced with its documented default (`07:00` / `22:00`) and a warning, so a
//! typo never leaves the user without a theme.

pub mod builder;
pub mod loading;
pub mod validation;

#[cfg(test)]
mod tests;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::common::constants::*;
use crate::core::{BoundaryPair, Mode};

pub use builder::create_default_config;
pub use loading::{get_config_path, get_custom_config_dir, load, load_from_path, set_config_dir};
pub use validation::{resolve_boundaries, validate_config};

/// Settings loaded from `themeclock.toml`.
///
/// Every field is optional; accessors apply the defaults from
/// [`crate::common::constants`].
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Start of the light interval, `HH:MM`.
    pub light_start: Option<String>,
    /// Start of the dark interval, `HH:MM`.
    pub dark_start: Option<String>,
    /// Mode used when nothing has been persisted.
    pub default_mode: Option<String>,
    /// Key the mode is persisted under.
    pub storage_key: Option<String>,
    /// Attribute name written by the attribute sink.
    pub attribute: Option<String>,
    /// Path of the attribute file. Defaults to a file in the state directory.
    pub target: Option<String>,
    /// Persist `auto` as a value instead of removing the key.
    pub persist_auto: Option<bool>,
}

impl Config {
    /// Load using automatic path detection.
    pub fn load() -> Result<Self> {
        loading::load()
    }

    /// Boundaries with invalid times replaced by defaults.
    pub fn boundaries(&self) -> BoundaryPair {
        resolve_boundaries(self.light_start.as_deref(), self.dark_start.as_deref())
    }

    /// The configured default mode. Validation guarantees it parses; an
    /// unvalidated bad value falls back to `auto`.
    pub fn default_mode(&self) -> Mode {
        self.default_mode
            .as_deref()
            .and_then(|mode| mode.parse().ok())
            .unwrap_or_default()
    }

    pub fn storage_key(&self) -> &str {
        self.storage_key.as_deref().unwrap_or(DEFAULT_STORAGE_KEY)
    }

    pub fn attribute(&self) -> &str {
        self.attribute.as_deref().unwrap_or(DEFAULT_ATTRIBUTE)
    }

    pub fn persist_auto(&self) -> bool {
        self.persist_auto.unwrap_or(false)
    }

    /// Where the attribute sink writes. A leading `~/` is expanded.
    pub fn target_path(&self) -> Result<PathBuf> {
        match self.target.as_deref() {
            Some(target) => Ok(expand_home(target)),
            None => {
                let state_dir =
                    crate::storage::get_state_dir(get_custom_config_dir().as_deref())?;
                Ok(state_dir.join(TARGET_FILE_NAME))
            }
        }
    }

    /// Print the effective settings in the block style.
    pub fn log_config(&self) {
        let boundaries = self.boundaries();
        log_block_start!("Loaded configuration");
        log_indented!("Light starts at {}", boundaries.light_start);
        log_indented!("Dark starts at {}", boundaries.dark_start);
        if boundaries.wraps_midnight() {
            log_indented!("Light interval wraps past midnight");
        }
        log_indented!("Default mode: {}", self.default_mode());
        log_indented!(
            "Attribute: {} (storage key \"{}\")",
            self.attribute(),
            self.storage_key()
        );
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}
