//! Output side of the controller: where the computed theme ends up.
//!
//! The controller never knows what "applying a theme" means. It hands each new
//! theme to a [`ThemeSink`], which might write an attribute file, log, or (in
//! tests) record what it saw. Sink failures are reported by the controller as
//! warnings and never stop the schedule.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::common::utils::private_path;
use crate::core::Theme;

/// Receiver of theme changes.
pub trait ThemeSink: Send {
    /// Apply `theme` to the designated target.
    fn apply(&mut self, theme: Theme) -> Result<()>;

    /// Human-readable name for this sink.
    fn sink_name(&self) -> &'static str;
}

/// Writes `attribute="value"` to a file standing in for the themed element.
///
/// Anything that wants to follow the theme (a shell prompt, a status bar, a
/// static-site build step) can watch or read this one-line file.
#[derive(Debug, Clone)]
pub struct AttributeSink {
    target: PathBuf,
    attribute: String,
}

impl AttributeSink {
    pub fn new(target: impl Into<PathBuf>, attribute: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            attribute: attribute.into(),
        }
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// The exact line written for `theme`.
    pub fn render(&self, theme: Theme) -> String {
        format!("{}=\"{}\"\n", self.attribute, theme.as_str())
    }
}

impl ThemeSink for AttributeSink {
    fn apply(&mut self, theme: Theme) -> Result<()> {
        if let Some(parent) = self.target.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", private_path(parent)))?;
        }

        fs::write(&self.target, self.render(theme))
            .with_context(|| format!("Failed to write {}", private_path(&self.target)))
    }

    fn sink_name(&self) -> &'static str {
        "attribute"
    }
}

/// A sink that only reports the theme in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ThemeSink for LogSink {
    fn apply(&mut self, theme: Theme) -> Result<()> {
        log_indented!("Theme attribute set to \"{}\"", theme.as_str());
        Ok(())
    }

    fn sink_name(&self) -> &'static str {
        "log"
    }
}

/// Records every applied theme; shared handle lets tests inspect it while the
/// controller owns the sink.
#[cfg(any(test, feature = "testing-support"))]
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    applied: std::sync::Arc<std::sync::Mutex<Vec<Theme>>>,
    fail: bool,
}

#[cfg(any(test, feature = "testing-support"))]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every apply fails after recording the attempt.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn applied(&self) -> Vec<Theme> {
        self.applied
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<Theme> {
        self.applied().last().copied()
    }
}

#[cfg(any(test, feature = "testing-support"))]
impl ThemeSink for RecordingSink {
    fn apply(&mut self, theme: Theme) -> Result<()> {
        if let Ok(mut guard) = self.applied.lock() {
            guard.push(theme);
        }
        if self.fail {
            anyhow::bail!("recording sink configured to fail");
        }
        Ok(())
    }

    fn sink_name(&self) -> &'static str {
        "recording"
    }
}
