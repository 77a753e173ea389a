//! Configuration validation and boundary fallbacks.

use anyhow::Result;

use super::Config;
use crate::common::constants::*;
use crate::core::{BoundaryPair, Mode, TimeOfDay, parse_time_of_day};

/// Reject configurations that cannot be made to work.
///
/// Boundary times are not checked here. They fall back to
/// defaults in [`resolve_boundaries`] instead of failing the load.
pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(mode) = config.default_mode.as_deref() {
        mode.parse::<Mode>()
            .map_err(|e| anyhow::anyhow!("default_mode: {e}"))?;
    }

    if let Some(key) = config.storage_key.as_deref()
        && key.trim().is_empty()
    {
        anyhow::bail!("storage_key must not be empty");
    }

    if let Some(attribute) = config.attribute.as_deref() {
        let attribute = attribute.trim();
        if attribute.is_empty() {
            anyhow::bail!("attribute must not be empty");
        }
        if attribute.chars().any(|c| c.is_whitespace() || c == '=' || c == '"') {
            anyhow::bail!("attribute '{attribute}' must not contain whitespace, '=' or quotes");
        }
    }

    if let Some(target) = config.target.as_deref()
        && target.trim().is_empty()
    {
        anyhow::bail!("target must not be empty when set");
    }

    Ok(())
}

/// Parse one configured boundary, falling back to `default` with a warning.
pub fn resolve_time(value: Option<&str>, default: TimeOfDay, field: &str) -> TimeOfDay {
    let Some(raw) = value else {
        return default;
    };

    match parse_time_of_day(raw) {
        Ok(time) => time,
        Err(e) => {
            log_warning!("Invalid {field}: {e}");
            log_indented!("Using default {field} of {default}");
            default
        }
    }
}

/// Build the boundary pair from the two configured strings.
pub fn resolve_boundaries(light_start: Option<&str>, dark_start: Option<&str>) -> BoundaryPair {
    let pair = BoundaryPair::new(
        resolve_time(light_start, DEFAULT_LIGHT_START_TIME, "light_start"),
        resolve_time(dark_start, DEFAULT_DARK_START_TIME, "dark_start"),
    );

    if pair.is_degenerate() {
        log_warning!(
            "light_start and dark_start are both {}; the theme will stay dark",
            pair.light_start
        );
    }

    pair
}
