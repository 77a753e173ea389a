use chrono::Duration as ChronoDuration;
use std::fs;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;
use tempfile::tempdir;
use themeclock::controller::{ControllerOptions, ThemeController};
use themeclock::core::{Mode, Theme};
use themeclock::logger::Log;
use themeclock::sink::{AttributeSink, RecordingSink, ThemeSink};
use themeclock::storage::{FileStore, ThemeStorage};
use themeclock::time_source::ManualTimeSource;

fn quiet() {
    Log::set_enabled(false);
}

#[test]
fn test_mode_survives_restart_with_file_store() {
    quiet();
    let dir = tempdir().unwrap();
    let clock = Arc::new(ManualTimeSource::at(12, 0));

    {
        let controller = ThemeController::new(
            ControllerOptions::default(),
            ThemeStorage::new(FileStore::in_dir(dir.path())),
            RecordingSink::new(),
            clock.clone(),
        );
        assert_eq!(controller.theme(), Theme::Light);
        controller.set_mode(Mode::Dark);
    }

    let sink = RecordingSink::new();
    let controller = ThemeController::new(
        ControllerOptions::default(),
        ThemeStorage::new(FileStore::in_dir(dir.path())),
        sink.clone(),
        clock.clone(),
    );
    assert_eq!(controller.mode(), Mode::Dark);
    assert_eq!(sink.applied(), vec![Theme::Dark]);

    // Back to auto removes the stored mode, so the next start follows the clock
    controller.set_mode(Mode::Auto);
    drop(controller);

    let controller = ThemeController::new(
        ControllerOptions::default(),
        ThemeStorage::new(FileStore::in_dir(dir.path())),
        RecordingSink::new(),
        clock,
    );
    assert_eq!(controller.mode(), Mode::Auto);
    assert_eq!(controller.theme(), Theme::Light);
}

#[test]
fn test_attribute_file_follows_theme() {
    quiet();
    let dir = tempdir().unwrap();
    let target = dir.path().join("out").join("theme");
    let clock = Arc::new(ManualTimeSource::at(21, 30));

    let controller = ThemeController::new(
        ControllerOptions::default(),
        ThemeStorage::in_memory(),
        AttributeSink::new(&target, "data-theme"),
        clock.clone(),
    );
    assert_eq!(fs::read_to_string(&target).unwrap(), "data-theme=\"light\"\n");

    clock.advance(ChronoDuration::minutes(30));
    controller.refresh();
    assert_eq!(fs::read_to_string(&target).unwrap(), "data-theme=\"dark\"\n");

    controller.toggle();
    assert_eq!(fs::read_to_string(&target).unwrap(), "data-theme=\"light\"\n");
    assert_eq!(controller.mode(), Mode::Light);
}

#[test]
fn test_corrupt_store_falls_back_to_default_mode() {
    quiet();
    let dir = tempdir().unwrap();
    let store = FileStore::in_dir(dir.path());
    fs::write(store.path(), "{ not json").unwrap();

    let options = ControllerOptions {
        default_mode: Mode::Light,
        ..ControllerOptions::default()
    };
    let controller = ThemeController::new(
        options,
        ThemeStorage::new(store),
        RecordingSink::new(),
        Arc::new(ManualTimeSource::at(23, 0)),
    );
    assert_eq!(controller.mode(), Mode::Light);
    assert_eq!(controller.theme(), Theme::Light);
}

/// Sink that reports each applied theme over a channel.
struct ChannelSink(mpsc::Sender<Theme>);

impl ThemeSink for ChannelSink {
    fn apply(&mut self, theme: Theme) -> anyhow::Result<()> {
        let _ = self.0.send(theme);
        Ok(())
    }

    fn sink_name(&self) -> &'static str {
        "channel"
    }
}

#[test]
fn test_manual_mode_does_not_fire() {
    quiet();
    let (tx, rx) = mpsc::channel();
    let controller = ThemeController::new(
        ControllerOptions {
            default_mode: Mode::Dark,
            ..ControllerOptions::default()
        },
        ThemeStorage::in_memory(),
        ChannelSink(tx),
        Arc::new(ManualTimeSource::at(12, 0)),
    );
    assert_eq!(rx.recv().unwrap(), Theme::Dark);
    assert!(!controller.timer_armed());
    assert_eq!(controller.next_change(), None);
    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
}
