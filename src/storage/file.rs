//! JSON-file backed key/value store.
//!
//! The whole store is one flat JSON object. Writes take an exclusive `fs2`
//! lock on a sibling `.lock` file, re-read the current contents, and replace
//! the file atomically through a temporary file in the same directory, so a
//! crash mid-write leaves the previous contents intact.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::KeyValueStore;
use crate::common::constants::STORE_FILE_NAME;
use crate::common::utils::private_path;

type Entries = BTreeMap<String, String>;

/// Key/value store persisted as a JSON object on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store file inside a state directory.
    pub fn in_dir(state_dir: &Path) -> Self {
        Self::new(state_dir.join(STORE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    fn read_entries(&self) -> Result<Entries> {
        if !self.path.exists() {
            return Ok(Entries::new());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read store {}", private_path(&self.path)))?;
        if content.trim().is_empty() {
            return Ok(Entries::new());
        }

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse store {}", private_path(&self.path)))
    }

    fn write_entries(&self, entries: &Entries) -> Result<()> {
        let dir = self
            .path
            .parent()
            .context("Store path has no parent directory")?;

        let mut temp = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temp file in {}", private_path(dir)))?;
        serde_json::to_writer_pretty(&mut temp, entries)?;
        temp.write_all(b"\n")?;
        temp.flush()?;

        temp.persist(&self.path)
            .with_context(|| format!("Failed to replace store {}", private_path(&self.path)))?;
        Ok(())
    }

    /// Run a read-modify-write cycle under the exclusive lock.
    fn update(&self, apply: impl FnOnce(&mut Entries) -> bool) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", private_path(dir)))?;
        }

        let lock_file: File = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.lock_path())
            .context("Failed to open store lock file")?;
        lock_file
            .lock_exclusive()
            .context("Failed to lock store")?;

        let result = (|| -> Result<()> {
            let mut entries = self.read_entries()?;
            if apply(&mut entries) {
                self.write_entries(&entries)?;
            }
            Ok(())
        })();

        let _ = FileExt::unlock(&lock_file);
        result
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_entries()?.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        self.update(|entries| entries.remove(key).is_some())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
