//! One-shot deferred callbacks with idempotent cancellation.
//!
//! [`DeferredTimer::schedule`] parks a worker thread on a channel with
//! `recv_timeout`. If the deadline passes the callback runs; a cancel message
//! (or the handle being dropped) wakes the worker early and it exits without
//! running anything.
//!
//! The handle tracks a three-state flag so that cancel and fire race safely:
//! whichever side moves the flag out of `PENDING` first wins, and the loser
//! does nothing. Cancelling a handle that already fired or was already
//! cancelled is therefore a no-op.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::mpsc::{RecvTimeoutError, Sender, channel};
use std::thread;
use std::time::Duration;

const PENDING: u8 = 0;
const FIRED: u8 = 1;
const CANCELLED: u8 = 2;

/// Lifecycle of a scheduled callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Pending,
    Fired,
    Cancelled,
}

/// Spawns one-shot timers.
pub struct DeferredTimer;

impl DeferredTimer {
    /// Run `callback` once after `delay` unless the returned handle is
    /// cancelled or dropped first.
    pub fn schedule<F>(delay: Duration, callback: F) -> TimerHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let state = Arc::new(AtomicU8::new(PENDING));
        let (cancel_tx, cancel_rx) = channel::<()>();

        let worker_state = Arc::clone(&state);
        let spawned = thread::Builder::new()
            .name("themeclock-timer".to_string())
            .spawn(move || match cancel_rx.recv_timeout(delay) {
                Err(RecvTimeoutError::Timeout) => {
                    if worker_state
                        .compare_exchange(PENDING, FIRED, Ordering::SeqCst, Ordering::SeqCst)
                        .is_ok()
                    {
                        callback();
                    }
                }
                // Cancelled or handle dropped
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {}
            });

        if let Err(e) = spawned {
            log_warning!("Failed to spawn timer thread: {e}");
            state.store(CANCELLED, Ordering::SeqCst);
        }

        TimerHandle {
            state,
            cancel_tx,
            delay,
        }
    }
}

/// Owned handle to a scheduled callback. Dropping it cancels the callback.
#[derive(Debug)]
pub struct TimerHandle {
    state: Arc<AtomicU8>,
    cancel_tx: Sender<()>,
    delay: Duration,
}

impl TimerHandle {
    /// Cancel the callback if it has not run yet. Safe to call repeatedly.
    ///
    /// Returns `true` only for the call that actually prevented the callback.
    pub fn cancel(&self) -> bool {
        let won = self
            .state
            .compare_exchange(PENDING, CANCELLED, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if won {
            // Wake the worker; it may already have exited.
            let _ = self.cancel_tx.send(());
        }
        won
    }

    pub fn state(&self) -> TimerState {
        match self.state.load(Ordering::SeqCst) {
            PENDING => TimerState::Pending,
            FIRED => TimerState::Fired,
            _ => TimerState::Cancelled,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state() == TimerState::Pending
    }

    /// The delay the timer was armed with.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc;

    #[test]
    fn test_timer_fires_once() {
        let (tx, rx) = mpsc::channel();
        let handle = DeferredTimer::schedule(Duration::from_millis(10), move || {
            tx.send(()).unwrap();
        });

        rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(handle.state(), TimerState::Fired);
        assert!(!handle.is_pending());
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn test_cancel_prevents_callback() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let handle = DeferredTimer::schedule(Duration::from_millis(200), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(handle.is_pending());
        assert!(handle.cancel());
        assert_eq!(handle.state(), TimerState::Cancelled);

        thread::sleep(Duration::from_millis(300));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let handle = DeferredTimer::schedule(Duration::from_secs(60), || {});
        assert!(handle.cancel());
        assert!(!handle.cancel());
        assert!(!handle.cancel());
        assert_eq!(handle.state(), TimerState::Cancelled);
    }

    #[test]
    fn test_cancel_after_fire_is_noop() {
        let (tx, rx) = mpsc::channel();
        let handle = DeferredTimer::schedule(Duration::from_millis(5), move || {
            tx.send(()).unwrap();
        });
        rx.recv_timeout(Duration::from_secs(5)).unwrap();

        assert!(!handle.cancel());
        assert_eq!(handle.state(), TimerState::Fired);
    }

    #[test]
    fn test_drop_cancels() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let handle = DeferredTimer::schedule(Duration::from_millis(100), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        drop(handle);

        thread::sleep(Duration::from_millis(200));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_delay_is_recorded() {
        let handle = DeferredTimer::schedule(Duration::from_secs(42), || {});
        assert_eq!(handle.delay(), Duration::from_secs(42));
    }
}
