//! Default configuration file generation.
//!
//! The generated file lists every setting with an aligned comment, grouped in
//! `#[Section]` headers, so users can discover options by reading it.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::common::constants::*;

/// Write a default `themeclock.toml` to `path`, creating parent directories.
pub fn create_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    fs::write(path, default_config_content())
        .with_context(|| format!("Failed to write default config to {}", path.display()))
}

/// Contents of the default configuration file.
pub fn default_config_content() -> String {
    let mut content = ConfigBuilder::new()
        .add_section("Schedule")
        .add_setting(
            "light_start",
            &format!("\"{DEFAULT_LIGHT_START}\""),
            "Start of the light interval (HH:MM)",
        )
        .add_setting(
            "dark_start",
            &format!("\"{DEFAULT_DARK_START}\""),
            "Start of the dark interval (HH:MM)",
        )
        .add_section("Behavior")
        .add_setting(
            "default_mode",
            &format!("\"{DEFAULT_MODE}\""),
            "Mode until one is chosen: \"auto\", \"light\" or \"dark\"",
        )
        .add_setting(
            "persist_auto",
            "false",
            "Store \"auto\" explicitly instead of clearing the stored mode",
        )
        .add_section("Output")
        .add_setting(
            "storage_key",
            &format!("\"{DEFAULT_STORAGE_KEY}\""),
            "Key the selected mode is persisted under",
        )
        .add_setting(
            "attribute",
            &format!("\"{DEFAULT_ATTRIBUTE}\""),
            "Attribute written to the target file",
        )
        .build();
    content.push('\n');
    content
}

struct ConfigBuilder {
    entries: Vec<ConfigEntry>,
}

enum ConfigEntry {
    Section(String),
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(ConfigEntry::Section(format!("#[{title}]")));
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(ConfigEntry::Setting {
            line: format!("{key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    /// Render with all comments aligned one column past the longest setting.
    fn build(self) -> String {
        let width = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                ConfigEntry::Setting { line, .. } => Some(line.len()),
                ConfigEntry::Section(_) => None,
            })
            .max()
            .unwrap_or(0)
            + 1;

        let mut lines = Vec::new();
        for entry in self.entries {
            match entry {
                ConfigEntry::Section(header) => {
                    if !lines.is_empty() {
                        lines.push(String::new());
                    }
                    lines.push(header);
                }
                ConfigEntry::Setting { line, comment } => {
                    lines.push(format!("{line:<width$}{comment}"));
                }
            }
        }

        lines.join("\n")
    }
}
