//! Application coordinator for the long-running `run` command.
//!
//! Loads the configuration, builds the controller with file-backed storage and
//! the attribute sink, then waits on the signal channel. The controller's own
//! timer performs the scheduled switches; the loop here reacts to signals:
//!
//! - `Reload` re-reads `themeclock.toml` and the stored mode
//! - `Refresh` recomputes the theme against the clock
//! - `Shutdown` returns, dropping the controller and cancelling its timer
//!
//! Between signals the loop also watches for the wall clock jumping relative
//! to monotonic time. A pending timer measures monotonic time, so after the
//! user sets the clock or the machine resumes from suspend it would fire late.
//! A detected jump triggers a refresh instead.

use anyhow::Result;
use chrono::{DateTime, Duration as ChronoDuration, Local};
use std::sync::mpsc::RecvTimeoutError;
use std::time::{Duration, Instant};

use crate::{
    commands::{attribute_sink, open_storage},
    common::constants::{CLOCK_JUMP_THRESHOLD_SECS, SHUTDOWN_POLL_INTERVAL},
    common::utils::{format_minutes, private_path},
    config::Config,
    controller::{ControllerOptions, ThemeController},
    io::signals::{SignalMessage, SignalState, setup_signal_handler},
    time_source,
};

/// Builder for configuring and running the themeclock daemon.
///
/// ```no_run
/// use themeclock::Themeclock;
///
/// # fn main() -> anyhow::Result<()> {
/// Themeclock::new(false).run()?;
/// # Ok(())
/// # }
/// ```
pub struct Themeclock {
    debug_enabled: bool,
    show_headers: bool,
}

impl Themeclock {
    pub fn new(debug_enabled: bool) -> Self {
        Self {
            debug_enabled,
            show_headers: true,
        }
    }

    /// Skip the version header.
    pub fn without_headers(mut self) -> Self {
        self.show_headers = false;
        self
    }

    /// Execute until a shutdown signal arrives.
    pub fn run(self) -> Result<()> {
        if self.show_headers {
            log_version!();
            if self.debug_enabled {
                log_pipe!();
                log_debug!("Debug mode enabled - showing timer and storage details");
            }
        }

        let signal_state = setup_signal_handler()?;

        let config = Config::load()?;
        config.log_config();

        let storage = open_storage();
        let sink = attribute_sink(&config)?;
        log_debug!(
            "Writing theme to {} via {} storage",
            crate::common::utils::private_path(sink.target()),
            storage.backend_name()
        );

        let controller = ThemeController::new(
            ControllerOptions::from_config(&config),
            storage,
            sink,
            time_source::global(),
        );
        log_next_change(&controller);

        run_loop(&controller, &signal_state, config, Config::load);

        log_block_start!("Shutting down themeclock");
        drop(controller);
        log_end!();
        Ok(())
    }
}

/// Wait for signals and dispatch them to `controller` until shutdown.
///
/// `config` is the configuration the controller was built from. `reload`
/// supplies a fresh one for `Reload` messages. A reload that fails keeps the
/// current settings.
pub fn run_loop<F>(
    controller: &ThemeController,
    signal_state: &SignalState,
    mut config: Config,
    mut reload: F,
) where
    F: FnMut() -> Result<Config>,
{
    let mut clock = ClockWatch::new(controller.now());

    while signal_state.is_running() {
        let received = signal_state
            .signal_receiver
            .recv_timeout(SHUTDOWN_POLL_INTERVAL);

        if let Some(jump) = clock.check(controller.now()) {
            log_block_start!(
                "Clock jumped by {}, re-evaluating theme",
                format_jump(jump)
            );
            controller.refresh();
            log_next_change(controller);
        }

        let message = match received {
            Ok(message) => message,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        match message {
            SignalMessage::Shutdown => break,
            SignalMessage::Reload => match reload() {
                Ok(new_config) => {
                    log_block_start!("Reloading configuration");
                    controller.apply_options(ControllerOptions::from_config(&new_config));
                    if new_config.attribute() != config.attribute()
                        || new_config.target != config.target
                    {
                        switch_sink(controller, &new_config);
                    }
                    config = new_config;
                    log_next_change(controller);
                }
                Err(e) => {
                    log_warning!("Failed to reload configuration: {e:#}");
                    log_indented!("Keeping the current settings");
                }
            },
            SignalMessage::Refresh => {
                log_debug!("Refresh requested");
                controller.refresh();
                log_next_change(controller);
            }
        }
    }
}

fn switch_sink(controller: &ThemeController, config: &Config) {
    match attribute_sink(config) {
        Ok(sink) => {
            log_indented!(
                "Writing {} to {}",
                config.attribute(),
                private_path(sink.target())
            );
            controller.replace_sink(sink);
        }
        Err(e) => {
            log_warning!("Cannot switch output target: {e:#}");
            log_indented!("Keeping the previous target");
        }
    }
}

/// Tracks wall-clock time against monotonic time between loop iterations.
struct ClockWatch {
    wall: DateTime<Local>,
    instant: Instant,
}

impl ClockWatch {
    fn new(wall: DateTime<Local>) -> Self {
        Self {
            wall,
            instant: Instant::now(),
        }
    }

    /// Record a new observation. Returns the jump if the wall clock moved
    /// differently from monotonic time since the last one.
    fn check(&mut self, wall: DateTime<Local>) -> Option<ChronoDuration> {
        let instant = Instant::now();
        let jump = detect_clock_jump(wall - self.wall, instant - self.instant);
        self.wall = wall;
        self.instant = instant;
        jump
    }
}

/// The difference between wall-clock and monotonic elapsed time, when it
/// reaches [`CLOCK_JUMP_THRESHOLD_SECS`].
fn detect_clock_jump(
    wall_elapsed: ChronoDuration,
    mono_elapsed: Duration,
) -> Option<ChronoDuration> {
    let mono_elapsed = ChronoDuration::from_std(mono_elapsed).ok()?;
    let jump = wall_elapsed.checked_sub(&mono_elapsed)?;
    (jump.num_seconds().abs() >= CLOCK_JUMP_THRESHOLD_SECS).then_some(jump)
}

fn format_jump(jump: ChronoDuration) -> String {
    let secs = jump.num_seconds();
    let direction = if secs < 0 { "backwards" } else { "forwards" };
    if secs.abs() < 120 {
        format!("{}s {direction}", secs.abs())
    } else {
        format!("{} {direction}", format_minutes(secs.unsigned_abs() / 60))
    }
}

fn log_next_change(controller: &ThemeController) {
    match (controller.next_change_time(), controller.next_change()) {
        (Some(time), Some(delay)) => {
            log_indented!(
                "Next change at {time} (in {})",
                format_minutes(delay.as_secs() / 60)
            );
        }
        _ => log_indented!("Manual {} mode, no scheduled changes", controller.mode()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Mode, Theme};
    use crate::sink::RecordingSink;
    use crate::storage::{KeyValueStore, MemoryStore, ThemeStorage};
    use crate::time_source::ManualTimeSource;
    use std::sync::Arc;

    fn controller_with(
        hour: u32,
        minute: u32,
        storage: ThemeStorage,
    ) -> (ThemeController, RecordingSink, Arc<ManualTimeSource>) {
        crate::logger::Log::set_enabled(false);
        let sink = RecordingSink::new();
        let clock = Arc::new(ManualTimeSource::at(hour, minute));
        let controller = ThemeController::new(
            ControllerOptions::default(),
            storage,
            sink.clone(),
            clock.clone(),
        );
        (controller, sink, clock)
    }

    fn controller_at(hour: u32, minute: u32) -> (ThemeController, RecordingSink) {
        let (controller, sink, _clock) = controller_with(hour, minute, ThemeStorage::in_memory());
        (controller, sink)
    }

    #[test]
    fn test_run_loop_reload_applies_new_boundaries() {
        let (controller, sink) = controller_at(12, 0);
        let state = SignalState::detached();
        state.signal_sender.send(SignalMessage::Reload).unwrap();
        state.signal_sender.send(SignalMessage::Shutdown).unwrap();

        run_loop(&controller, &state, Config::default(), || {
            Ok(Config {
                light_start: Some("13:00".to_string()),
                dark_start: Some("23:00".to_string()),
                ..Config::default()
            })
        });

        assert_eq!(controller.boundaries().light_start.to_string(), "13:00");
        assert_eq!(controller.theme(), Theme::Dark);
        assert_eq!(sink.applied(), vec![Theme::Light, Theme::Dark]);
    }

    #[test]
    fn test_run_loop_reload_switches_storage_key() {
        let mut store = MemoryStore::new();
        store.set("other-key", "dark").unwrap();
        let (controller, sink, _clock) = controller_with(12, 0, ThemeStorage::new(store));
        assert_eq!(controller.mode(), Mode::Auto);

        let state = SignalState::detached();
        state.signal_sender.send(SignalMessage::Reload).unwrap();
        state.signal_sender.send(SignalMessage::Shutdown).unwrap();

        run_loop(&controller, &state, Config::default(), || {
            Ok(Config {
                storage_key: Some("other-key".to_string()),
                ..Config::default()
            })
        });

        assert_eq!(controller.mode(), Mode::Dark);
        assert_eq!(sink.applied(), vec![Theme::Light, Theme::Dark]);
    }

    #[test]
    fn test_run_loop_reload_switches_output_target() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first");
        let second = dir.path().join("second");
        let initial = Config {
            target: Some(first.to_string_lossy().into_owned()),
            ..Config::default()
        };
        let (controller, sink) = controller_at(23, 0);

        let state = SignalState::detached();
        state.signal_sender.send(SignalMessage::Reload).unwrap();
        state.signal_sender.send(SignalMessage::Shutdown).unwrap();

        run_loop(&controller, &state, initial, || {
            Ok(Config {
                target: Some(second.to_string_lossy().into_owned()),
                attribute: Some("data-mode".to_string()),
                ..Config::default()
            })
        });

        assert_eq!(
            std::fs::read_to_string(&second).unwrap(),
            "data-mode=\"dark\"\n"
        );
        controller.toggle();
        assert_eq!(
            std::fs::read_to_string(&second).unwrap(),
            "data-mode=\"light\"\n"
        );
        // The previous sink saw only the initial theme
        assert_eq!(sink.applied(), vec![Theme::Dark]);
    }

    #[test]
    fn test_run_loop_failed_reload_keeps_settings() {
        let (controller, _sink) = controller_at(12, 0);
        let before = controller.boundaries();
        let state = SignalState::detached();
        state.signal_sender.send(SignalMessage::Reload).unwrap();
        state.signal_sender.send(SignalMessage::Refresh).unwrap();
        state.signal_sender.send(SignalMessage::Shutdown).unwrap();

        run_loop(&controller, &state, Config::default(), || {
            anyhow::bail!("broken file")
        });

        assert_eq!(controller.boundaries(), before);
        assert_eq!(controller.mode(), Mode::Auto);
    }

    #[test]
    fn test_run_loop_refreshes_after_clock_jump() {
        let (controller, sink, clock) = controller_with(6, 0, ThemeStorage::in_memory());
        assert_eq!(controller.theme(), Theme::Dark);

        let state = SignalState::detached();
        let sender = state.signal_sender.clone();

        std::thread::scope(|scope| {
            let controller = &controller;
            scope.spawn(move || {
                run_loop(controller, &state, Config::default(), || {
                    anyhow::bail!("no reload in this test")
                })
            });

            std::thread::sleep(Duration::from_millis(300));
            clock.advance(ChronoDuration::hours(6));
            // Several poll intervals pass without any signal
            std::thread::sleep(Duration::from_millis(1200));
            sender.send(SignalMessage::Shutdown).unwrap();
        });

        assert_eq!(controller.theme(), Theme::Light);
        assert_eq!(sink.applied(), vec![Theme::Dark, Theme::Light]);
        assert!(controller.timer_armed());
    }

    #[test]
    fn test_detect_clock_jump() {
        let mono = Duration::from_millis(250);
        assert_eq!(
            detect_clock_jump(ChronoDuration::milliseconds(250), mono),
            None
        );
        assert_eq!(
            detect_clock_jump(ChronoDuration::milliseconds(4_000), mono),
            None
        );
        assert_eq!(
            detect_clock_jump(ChronoDuration::hours(6), mono),
            Some(ChronoDuration::hours(6) - ChronoDuration::milliseconds(250))
        );
        assert_eq!(
            detect_clock_jump(ChronoDuration::minutes(-30), mono),
            Some(ChronoDuration::minutes(-30) - ChronoDuration::milliseconds(250))
        );
        // Resume from suspend: monotonic time stood still
        assert!(detect_clock_jump(ChronoDuration::minutes(40), Duration::ZERO).is_some());
    }

    #[test]
    fn test_format_jump() {
        assert_eq!(format_jump(ChronoDuration::seconds(-7)), "7s backwards");
        assert_eq!(format_jump(ChronoDuration::hours(6)), "6h 0m forwards");
    }

    #[test]
    fn test_run_loop_stops_when_flag_cleared() {
        let (controller, _sink) = controller_at(12, 0);
        let state = SignalState::detached();
        state
            .running
            .store(false, std::sync::atomic::Ordering::SeqCst);

        // Returns immediately without a message
        run_loop(&controller, &state, Config::default(), Config::load);
    }
}
