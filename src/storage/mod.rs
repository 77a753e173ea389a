//! Persistence shim for the selected mode.
//!
//! Backends implement the small [`KeyValueStore`] contract and are free to fail.
//! [`ThemeStorage`] wraps a backend and turns every failure into an empty or
//! `false` result, so a missing, read-only or corrupt store degrades to "nothing
//! persisted" instead of taking the theme down with it.
//!
//! State files live under `XDG_STATE_HOME/themeclock/{namespace}`, keeping
//! configuration and state separate. The namespace is `default` for the
//! default config directory and `custom_<hash>` for directories given with
//! `--config`, so two configurations never share a stored mode.

pub mod file;

pub use file::FileStore;

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::common::constants::CONFIG_DIR_NAME;
use crate::core::Mode;

/// Minimal get/set/remove contract over string keys and values.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    fn remove(&mut self, key: &str) -> Result<()>;

    /// Short backend name for diagnostics.
    fn name(&self) -> &'static str;
}

/// In-process store, used by tests and when no state directory is available.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// A store that is never available, like a browser with storage disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStore;

impl KeyValueStore for UnavailableStore {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        anyhow::bail!("storage is unavailable")
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
        anyhow::bail!("storage is unavailable")
    }

    fn remove(&mut self, _key: &str) -> Result<()> {
        anyhow::bail!("storage is unavailable")
    }

    fn name(&self) -> &'static str {
        "unavailable"
    }
}

/// Never-failing facade over a [`KeyValueStore`].
pub struct ThemeStorage {
    backend: Box<dyn KeyValueStore>,
}

impl ThemeStorage {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Storage that only lives as long as the process.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Read a value, treating any backend failure as "absent".
    pub fn read(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                log_debug!("Storage read of '{key}' failed: {e:#}");
                None
            }
        }
    }

    /// Write a value. Returns `false` when the backend refused it.
    pub fn write(&mut self, key: &str, value: &str) -> bool {
        match self.backend.set(key, value) {
            Ok(()) => true,
            Err(e) => {
                log_debug!("Storage write of '{key}' failed: {e:#}");
                false
            }
        }
    }

    /// Remove a value. Returns `false` when the backend refused it.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.backend.remove(key) {
            Ok(()) => true,
            Err(e) => {
                log_debug!("Storage removal of '{key}' failed: {e:#}");
                false
            }
        }
    }

    /// The persisted mode, if any.
    ///
    /// A stored value that does not parse is dropped from the store so it does
    /// not linger.
    pub fn load_mode(&mut self, key: &str) -> Option<Mode> {
        let raw = self.read(key)?;
        match raw.parse::<Mode>() {
            Ok(mode) => Some(mode),
            Err(_) => {
                log_warning!("Ignoring unrecognized stored mode '{}'", raw.trim());
                self.remove(key);
                None
            }
        }
    }

    pub fn save_mode(&mut self, key: &str, mode: Mode) -> bool {
        self.write(key, mode.as_str())
    }

    pub fn clear_mode(&mut self, key: &str) -> bool {
        self.remove(key)
    }
}

impl std::fmt::Debug for ThemeStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeStorage")
            .field("backend", &self.backend.name())
            .finish()
    }
}

/// Get the state directory for a given configuration directory.
pub fn get_state_dir(config_dir: Option<&Path>) -> Result<PathBuf> {
    let state_home = std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("/tmp"))
                .join(".local/state")
        });

    let namespace = match config_dir {
        None => "default".to_string(),
        Some(path) => {
            let default_config = dirs::config_dir()
                .context("Could not determine config directory")?
                .join(CONFIG_DIR_NAME);
            if path == default_config {
                "default".to_string()
            } else {
                get_state_namespace(path)
            }
        }
    };

    Ok(state_home.join(CONFIG_DIR_NAME).join(namespace))
}

/// Stable namespace for a custom config directory.
fn get_state_namespace(config_path: &Path) -> String {
    let canonical = config_path
        .canonicalize()
        .unwrap_or_else(|_| config_path.to_path_buf());

    let hash = sha256::digest(canonical.to_string_lossy().as_bytes());
    format!("custom_{}", &hash[..16])
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "themeclock-mode";

    #[test]
    fn test_memory_store_roundtrip() {
        let mut storage = ThemeStorage::in_memory();
        assert_eq!(storage.read(KEY), None);
        assert!(storage.write(KEY, "dark"));
        assert_eq!(storage.read(KEY).as_deref(), Some("dark"));
        assert!(storage.remove(KEY));
        assert_eq!(storage.read(KEY), None);
        // Removing a missing key is not an error
        assert!(storage.remove(KEY));
    }

    #[test]
    fn test_unavailable_store_degrades() {
        let mut storage = ThemeStorage::new(UnavailableStore);
        assert_eq!(storage.read(KEY), None);
        assert!(!storage.write(KEY, "light"));
        assert!(!storage.remove(KEY));
        assert_eq!(storage.load_mode(KEY), None);
        assert!(!storage.save_mode(KEY, Mode::Dark));
        assert_eq!(storage.backend_name(), "unavailable");
    }

    #[test]
    fn test_mode_persistence() {
        let mut storage = ThemeStorage::in_memory();
        assert!(storage.save_mode(KEY, Mode::Light));
        assert_eq!(storage.load_mode(KEY), Some(Mode::Light));
        assert!(storage.clear_mode(KEY));
        assert_eq!(storage.load_mode(KEY), None);
    }

    #[test]
    fn test_garbage_mode_is_dropped() {
        crate::logger::Log::set_enabled(false);
        let mut storage = ThemeStorage::in_memory();
        storage.write(KEY, "sepia");
        assert_eq!(storage.load_mode(KEY), None);
        assert_eq!(storage.read(KEY), None);
    }

    #[test]
    fn test_custom_namespace_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let first = get_state_namespace(dir.path());
        let second = get_state_namespace(dir.path());
        assert_eq!(first, second);
        assert!(first.starts_with("custom_"));
        assert_eq!(first.len(), "custom_".len() + 16);
    }
}
