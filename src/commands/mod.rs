//! Command-line command handlers for themeclock.
//!
//! Each one-shot command lives in its own submodule. The daemon runner lives in
//! `themeclock.rs`; the helpers here build the storage and sink it shares with
//! the commands.

pub mod get;
pub mod help;
pub mod set;
pub mod simulate;
pub mod toggle;

use anyhow::Result;

use crate::config::{Config, get_custom_config_dir};
use crate::sink::AttributeSink;
use crate::storage::{FileStore, ThemeStorage, get_state_dir};

/// Storage backed by the state directory, or in-memory storage when the state
/// directory cannot be determined.
pub fn open_storage() -> ThemeStorage {
    match get_state_dir(get_custom_config_dir().as_deref()) {
        Ok(dir) => ThemeStorage::new(FileStore::in_dir(&dir)),
        Err(e) => {
            log_warning!("State directory unavailable: {e}");
            log_indented!("The selected mode will not persist across runs");
            ThemeStorage::in_memory()
        }
    }
}

/// The attribute sink described by `config`.
pub fn attribute_sink(config: &Config) -> Result<AttributeSink> {
    Ok(AttributeSink::new(config.target_path()?, config.attribute()))
}
