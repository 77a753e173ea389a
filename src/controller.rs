//! The theme controller: one owner for mode, boundaries, and the timer.
//!
//! [`ThemeController`] is the state container the rest of the program talks
//! to. It restores the persisted mode on construction, computes the theme for
//! the current instant, hands it to a [`ThemeSink`], and in `auto` mode keeps
//! exactly one [`TimerHandle`] armed for the next boundary.
//!
//! ## Rescheduling
//!
//! Every operation that can move the next boundary (mode changes, new
//! boundaries, refreshes, timer firings) follows the same order: cancel the
//! outstanding timer, recompute and apply, then arm a fresh timer if the mode
//! is `auto`. Cancelling bumps a generation counter, and each timer carries the
//! generation it was armed under. A callback that lost the race against a
//! cancel still finds a newer generation and does nothing.
//!
//! The timer callback only holds a [`Weak`] reference, so a controller that is
//! dropped while a timer is pending is freed normally and its timer cancelled.

use chrono::{DateTime, Local};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use crate::common::constants::*;
use crate::config::{Config, resolve_boundaries};
use crate::core::{
    BoundaryPair, Mode, Theme, TimeOfDay, detect_theme_change, log_theme_announcement,
};
use crate::io::timer::{DeferredTimer, TimerHandle};
use crate::sink::ThemeSink;
use crate::storage::ThemeStorage;
use crate::time_source::TimeSource;

/// Settings the controller needs, independent of where they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerOptions {
    pub boundaries: BoundaryPair,
    /// Mode used when nothing is persisted.
    pub default_mode: Mode,
    pub storage_key: String,
    /// Store `auto` explicitly instead of removing the key.
    pub persist_auto: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            boundaries: BoundaryPair::new(DEFAULT_LIGHT_START_TIME, DEFAULT_DARK_START_TIME),
            default_mode: Mode::Auto,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            persist_auto: false,
        }
    }
}

impl ControllerOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            boundaries: config.boundaries(),
            default_mode: config.default_mode(),
            storage_key: config.storage_key().to_string(),
            persist_auto: config.persist_auto(),
        }
    }
}

/// Owns the schedule and the single outstanding timer.
pub struct ThemeController {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    boundaries: BoundaryPair,
    mode: Mode,
    /// Theme computed by the last evaluation.
    theme: Theme,
    /// Theme the sink last accepted. `None` until the first successful apply.
    applied: Option<Theme>,
    storage_key: String,
    persist_auto: bool,
    storage: ThemeStorage,
    sink: Box<dyn ThemeSink>,
    time_source: Arc<dyn TimeSource>,
    timer: Option<TimerHandle>,
    generation: u64,
    self_ref: Weak<Mutex<Inner>>,
}

impl ThemeController {
    /// Build a controller, restore the persisted mode, apply the theme and arm
    /// the timer when in `auto` mode.
    pub fn new(
        options: ControllerOptions,
        mut storage: ThemeStorage,
        sink: impl ThemeSink + 'static,
        time_source: Arc<dyn TimeSource>,
    ) -> Self {
        let mode = match storage.load_mode(&options.storage_key) {
            Some(mode) => {
                log_debug!("Restored {mode} mode from {} storage", storage.backend_name());
                mode
            }
            None => options.default_mode,
        };

        let theme = mode.forced_theme().unwrap_or_else(|| {
            options
                .boundaries
                .theme_at(time_source.minutes_since_midnight())
        });

        let inner = Arc::new_cyclic(|weak| {
            Mutex::new(Inner {
                boundaries: options.boundaries,
                mode,
                theme,
                applied: None,
                storage_key: options.storage_key,
                persist_auto: options.persist_auto,
                storage,
                sink: Box::new(sink),
                time_source,
                timer: None,
                generation: 0,
                self_ref: weak.clone(),
            })
        });

        let controller = Self { inner };
        {
            let mut inner = controller.lock();
            let manual = inner.mode.is_manual();
            inner.apply_current(manual);
            inner.reschedule();
        }
        controller
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        lock_inner(&self.inner)
    }

    /// The theme currently in effect.
    pub fn theme(&self) -> Theme {
        self.lock().theme
    }

    pub fn mode(&self) -> Mode {
        self.lock().mode
    }

    pub fn boundaries(&self) -> BoundaryPair {
        self.lock().boundaries
    }

    /// Time until the next automatic change, or `None` in a manual mode.
    pub fn next_change(&self) -> Option<Duration> {
        let inner = self.lock();
        if inner.mode.is_manual() {
            return None;
        }
        let minutes = inner.time_source.minutes_since_midnight();
        Some(inner.boundaries.delay_until_next_boundary(minutes))
    }

    /// Wall-clock time of the next automatic change, or `None` in a manual mode.
    pub fn next_change_time(&self) -> Option<TimeOfDay> {
        let inner = self.lock();
        if inner.mode.is_manual() {
            return None;
        }
        let minutes = inner.time_source.minutes_since_midnight();
        Some(inner.boundaries.next_boundary_time(minutes))
    }

    /// The controller's notion of the current time.
    pub fn now(&self) -> DateTime<Local> {
        self.lock().time_source.now()
    }

    /// Whether a boundary timer is currently armed.
    pub fn timer_armed(&self) -> bool {
        self.lock()
            .timer
            .as_ref()
            .is_some_and(TimerHandle::is_pending)
    }

    /// Switch modes, persist the choice, and reschedule.
    pub fn set_mode(&self, mode: Mode) {
        let mut inner = self.lock();
        inner.persist_mode(mode);

        if inner.mode != mode {
            log_block_start!("Switching to {mode} mode");
            inner.mode = mode;
        }

        inner.cancel_timer();
        inner.apply_current(mode.is_manual());
        inner.reschedule();
    }

    /// Force the theme opposite to the one on screen. Returns the new theme.
    pub fn toggle(&self) -> Theme {
        let target = self.theme().opposite();
        self.set_mode(Mode::from(target));
        target
    }

    /// Replace the boundaries and reschedule.
    pub fn set_boundaries(&self, boundaries: BoundaryPair) {
        let mut inner = self.lock();
        inner.adopt_boundaries(boundaries);

        inner.cancel_timer();
        inner.apply_current(false);
        inner.reschedule();
    }

    /// Replace the boundaries from `HH:MM` strings. Unparseable times fall back
    /// to the defaults with a warning.
    pub fn set_times(&self, light_start: &str, dark_start: &str) -> BoundaryPair {
        let boundaries = resolve_boundaries(Some(light_start), Some(dark_start));
        self.set_boundaries(boundaries);
        boundaries
    }

    /// Re-read the persisted mode, for when another process changed it.
    pub fn reload_mode(&self, default_mode: Mode) -> Mode {
        let mut inner = self.lock();
        let mode = inner.adopt_stored_mode(default_mode);

        inner.cancel_timer();
        inner.apply_current(mode.is_manual());
        inner.reschedule();
        mode
    }

    /// Adopt a complete set of options, as after a configuration reload.
    ///
    /// The mode is re-read under the new storage key and falls back to the new
    /// `default_mode`. Returns the resulting mode.
    pub fn apply_options(&self, options: ControllerOptions) -> Mode {
        let mut inner = self.lock();
        inner.adopt_boundaries(options.boundaries);
        if inner.storage_key != options.storage_key {
            log_indented!("Storage key changed to {}", options.storage_key);
            inner.storage_key = options.storage_key;
        }
        inner.persist_auto = options.persist_auto;
        let mode = inner.adopt_stored_mode(options.default_mode);

        inner.cancel_timer();
        inner.apply_current(mode.is_manual());
        inner.reschedule();
        mode
    }

    /// Send the theme to a different sink from now on. The current theme is
    /// applied to it immediately.
    pub fn replace_sink(&self, sink: impl ThemeSink + 'static) {
        let mut inner = self.lock();
        log_debug!(
            "Replacing {} sink with {} sink",
            inner.sink.sink_name(),
            sink.sink_name()
        );
        inner.sink = Box::new(sink);
        inner.applied = None;
        let manual = inner.mode.is_manual();
        inner.apply_current(manual);
    }

    /// Recompute against the current time and re-arm the timer.
    pub fn refresh(&self) {
        let mut inner = self.lock();
        inner.cancel_timer();
        inner.apply_current(false);
        inner.reschedule();
    }

    fn on_timer_fired(inner: &Arc<Mutex<Inner>>, generation: u64) {
        let mut inner = lock_inner(inner);
        if inner.generation != generation {
            log_debug!(
                "Ignoring stale timer (generation {generation}, current {})",
                inner.generation
            );
            return;
        }

        log_debug!("Boundary timer fired");
        inner.cancel_timer();
        inner.apply_current(false);
        inner.reschedule();
    }

    #[cfg(test)]
    fn generation(&self) -> u64 {
        self.lock().generation
    }
}

impl Drop for ThemeController {
    fn drop(&mut self) {
        self.lock().cancel_timer();
    }
}

impl std::fmt::Debug for ThemeController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("ThemeController")
            .field("boundaries", &inner.boundaries)
            .field("mode", &inner.mode)
            .field("theme", &inner.theme)
            .field("storage", &inner.storage)
            .field("sink", &inner.sink.sink_name())
            .field("generation", &inner.generation)
            .finish()
    }
}

fn lock_inner(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Inner {
    fn current_minutes(&self) -> u32 {
        self.time_source.minutes_since_midnight()
    }

    /// Compute the theme for now and hand it to the sink if it changed.
    fn apply_current(&mut self, manual: bool) {
        let next = self
            .mode
            .forced_theme()
            .unwrap_or_else(|| self.boundaries.theme_at(self.current_minutes()));
        self.theme = next;

        let change = detect_theme_change(self.applied, next);
        if !change.requires_apply() {
            return;
        }

        log_theme_announcement(&change, manual);
        match self.sink.apply(next) {
            Ok(()) => self.applied = Some(next),
            Err(e) => {
                // Leave `applied` alone so the next evaluation retries.
                log_warning!(
                    "Failed to apply {} theme via {} sink: {e:#}",
                    next.as_str(),
                    self.sink.sink_name()
                );
            }
        }
    }

    fn adopt_boundaries(&mut self, boundaries: BoundaryPair) {
        if self.boundaries != boundaries {
            log_block_start!(
                "Schedule updated: light at {}, dark at {}",
                boundaries.light_start,
                boundaries.dark_start
            );
            self.boundaries = boundaries;
        }
    }

    /// Switch to the mode stored under the current key, or `default_mode`.
    fn adopt_stored_mode(&mut self, default_mode: Mode) -> Mode {
        let key = self.storage_key.clone();
        let mode = self.storage.load_mode(&key).unwrap_or(default_mode);
        if self.mode != mode {
            log_block_start!("Stored mode changed to {mode}");
            self.mode = mode;
        }
        mode
    }

    fn persist_mode(&mut self, mode: Mode) {
        let key = self.storage_key.clone();
        let stored = if mode == Mode::Auto && !self.persist_auto {
            self.storage.clear_mode(&key)
        } else {
            self.storage.save_mode(&key, mode)
        };

        if !stored {
            log_debug!(
                "Mode {mode} kept in memory only ({} storage unavailable)",
                self.storage.backend_name()
            );
        }
    }

    fn cancel_timer(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }

    /// Arm the boundary timer when in `auto` mode. Assumes any previous timer
    /// has been cancelled.
    fn reschedule(&mut self) {
        if self.mode.is_manual() {
            return;
        }

        let minutes = self.current_minutes();
        let delay = self.boundaries.delay_until_next_boundary(minutes);
        let generation = self.generation;
        let weak = self.self_ref.clone();

        log_debug!(
            "Next boundary at {} (in {})",
            self.boundaries.next_boundary_time(minutes),
            crate::common::utils::format_minutes(delay.as_secs() / 60)
        );

        self.timer = Some(DeferredTimer::schedule(delay, move || {
            if let Some(inner) = weak.upgrade() {
                ThemeController::on_timer_fired(&inner, generation);
            }
        }));
    }
}
