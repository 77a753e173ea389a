use super::loading::parse_config;
use super::validation::{resolve_time, validate_config};
use super::*;
use crate::common::constants::test_constants::*;
use crate::core::TimeOfDay;
use serial_test::serial;
use std::fs;
use tempfile::tempdir;

fn create_test_config(light_start: &str, dark_start: &str) -> Config {
    Config {
        light_start: Some(light_start.to_string()),
        dark_start: Some(dark_start.to_string()),
        ..Config::default()
    }
}

#[test]
fn test_config_defaults() {
    let config = Config::default();
    let boundaries = config.boundaries();
    assert_eq!(boundaries.light_start.minutes(), TEST_LIGHT_MINUTES);
    assert_eq!(boundaries.dark_start.minutes(), TEST_DARK_MINUTES);
    assert_eq!(config.default_mode(), Mode::Auto);
    assert_eq!(config.storage_key(), DEFAULT_STORAGE_KEY);
    assert_eq!(config.attribute(), DEFAULT_ATTRIBUTE);
    assert!(!config.persist_auto());
}

#[test]
fn test_default_constants_agree() {
    assert_eq!(
        crate::core::parse_time_of_day(DEFAULT_LIGHT_START).unwrap(),
        DEFAULT_LIGHT_START_TIME
    );
    assert_eq!(
        crate::core::parse_time_of_day(DEFAULT_DARK_START).unwrap(),
        DEFAULT_DARK_START_TIME
    );
}

#[test]
fn test_config_custom_boundaries() {
    let config = create_test_config("22:00", "07:00");
    let boundaries = config.boundaries();
    assert!(boundaries.wraps_midnight());
    assert_eq!(boundaries.light_start.to_string(), "22:00");
    assert_eq!(boundaries.dark_start.to_string(), "07:00");
}

#[test]
fn test_invalid_times_fall_back_to_defaults() {
    crate::logger::Log::set_enabled(false);

    let config = create_test_config("25:00", "not a time");
    let boundaries = config.boundaries();
    assert_eq!(boundaries.light_start, DEFAULT_LIGHT_START_TIME);
    assert_eq!(boundaries.dark_start, DEFAULT_DARK_START_TIME);

    // Only the broken side is replaced
    let config = create_test_config("06:30", "22:00:00");
    let boundaries = config.boundaries();
    assert_eq!(boundaries.light_start.to_string(), "06:30");
    assert_eq!(boundaries.dark_start, DEFAULT_DARK_START_TIME);
}

#[test]
fn test_resolve_time_missing_uses_default() {
    let default = TimeOfDay::const_hm(5, 0);
    assert_eq!(resolve_time(None, default, "light_start"), default);
    assert_eq!(
        resolve_time(Some(" 05:45 "), default, "light_start").to_string(),
        "05:45"
    );
}

#[test]
fn test_invalid_times_do_not_fail_validation() {
    let config = create_test_config("99:99", "abc");
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_validation_rejects_unknown_mode() {
    let config = Config {
        default_mode: Some("sepia".to_string()),
        ..Config::default()
    };
    let err = validate_config(&config).unwrap_err();
    assert!(err.to_string().contains("default_mode"));
}

#[test]
fn test_validation_rejects_empty_fields() {
    let config = Config {
        storage_key: Some("  ".to_string()),
        ..Config::default()
    };
    assert!(validate_config(&config).is_err());

    let config = Config {
        attribute: Some(String::new()),
        ..Config::default()
    };
    assert!(validate_config(&config).is_err());

    let config = Config {
        attribute: Some("data theme".to_string()),
        ..Config::default()
    };
    assert!(validate_config(&config).is_err());

    let config = Config {
        target: Some(String::new()),
        ..Config::default()
    };
    assert!(validate_config(&config).is_err());
}

#[test]
fn test_config_toml_parsing() {
    let config = parse_config(
        r#"
light_start = "06:15"
dark_start = "21:45"
default_mode = "dark"
storage_key = "my-theme"
attribute = "data-color-scheme"
target = "/tmp/themeclock-test/theme"
persist_auto = true
"#,
    )
    .unwrap();

    assert_eq!(config.boundaries().light_start.to_string(), "06:15");
    assert_eq!(config.boundaries().dark_start.to_string(), "21:45");
    assert_eq!(config.default_mode(), Mode::Dark);
    assert_eq!(config.storage_key(), "my-theme");
    assert_eq!(config.attribute(), "data-color-scheme");
    assert!(config.persist_auto());
    assert_eq!(
        config.target_path().unwrap(),
        std::path::PathBuf::from("/tmp/themeclock-test/theme")
    );
}

#[test]
fn test_config_malformed_toml() {
    assert!(parse_config("light_start = ").is_err());
    assert!(parse_config("light_start = 7").is_err());
    assert!(parse_config("unknown_field = true").is_err());
}

#[test]
fn test_default_config_file_creation() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("themeclock").join("themeclock.toml");

    create_default_config(&path).unwrap();
    assert!(path.exists());

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("#[Schedule]"));
    assert!(content.contains("light_start = \"07:00\""));

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.boundaries().light_start, DEFAULT_LIGHT_START_TIME);
    assert_eq!(config.boundaries().dark_start, DEFAULT_DARK_START_TIME);
    assert_eq!(config.default_mode(), Mode::Auto);
}

#[test]
fn test_default_config_comments_aligned() {
    let content = builder::default_config_content();
    let columns: Vec<usize> = content
        .lines()
        .filter(|line| !line.starts_with("#[") && !line.is_empty())
        .filter_map(|line| line.find(" # "))
        .collect();
    assert!(!columns.is_empty());
    assert!(columns.iter().all(|&c| c == columns[0]));
}

#[test]
fn test_load_from_missing_path_fails() {
    let dir = tempdir().unwrap();
    assert!(load_from_path(&dir.path().join("missing.toml")).is_err());
}

#[test]
#[serial]
fn test_target_path_defaults_to_state_dir() {
    let dir = tempdir().unwrap();
    let original = std::env::var("XDG_STATE_HOME").ok();
    unsafe {
        std::env::set_var("XDG_STATE_HOME", dir.path());
    }

    let target = Config::default().target_path();

    unsafe {
        match original {
            Some(val) => std::env::set_var("XDG_STATE_HOME", val),
            None => std::env::remove_var("XDG_STATE_HOME"),
        }
    }

    let target = target.unwrap();
    assert!(target.starts_with(dir.path().join("themeclock")));
    assert!(target.ends_with("theme"));
}
