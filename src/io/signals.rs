//! Signal handling for the long-running `run` command.
//!
//! A background thread turns Unix signals into [`SignalMessage`]s on a channel
//! that the run loop waits on:
//!
//! - `SIGINT`, `SIGTERM`: shut down
//! - `SIGHUP`: reload the configuration file
//! - `SIGUSR1`: re-evaluate the theme now (e.g. after the system clock changed)

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM, SIGUSR1},
    iterator::Signals,
};
use std::{
    sync::Arc,
    sync::atomic::{AtomicBool, Ordering},
    sync::mpsc::{Receiver, Sender, channel},
    thread,
};

/// Messages delivered to the run loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalMessage {
    Shutdown,
    Reload,
    Refresh,
}

/// Signal handling state shared between threads.
pub struct SignalState {
    /// Cleared once a shutdown signal arrives.
    pub running: Arc<AtomicBool>,
    pub signal_receiver: Receiver<SignalMessage>,
    /// Kept so other producers (and tests) can inject messages.
    pub signal_sender: Sender<SignalMessage>,
}

impl SignalState {
    /// A state with no OS handlers attached.
    pub fn detached() -> Self {
        let (signal_sender, signal_receiver) = channel();
        Self {
            running: Arc::new(AtomicBool::new(true)),
            signal_receiver,
            signal_sender,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Map a raw signal number to the message the run loop understands.
pub fn classify_signal(sig: i32) -> Option<SignalMessage> {
    match sig {
        SIGINT | SIGTERM => Some(SignalMessage::Shutdown),
        SIGHUP => Some(SignalMessage::Reload),
        SIGUSR1 => Some(SignalMessage::Refresh),
        _ => None,
    }
}

/// Set up signal handling for the application.
///
/// Spawns a thread that forwards signals to the returned state's channel and
/// clears the running flag on shutdown signals.
pub fn setup_signal_handler() -> Result<SignalState> {
    let state = SignalState::detached();

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP, SIGUSR1])
        .context("failed to register signal handlers")?;

    let running = Arc::clone(&state.running);
    let sender = state.signal_sender.clone();

    thread::spawn(move || {
        for sig in signals.forever() {
            let Some(message) = classify_signal(sig) else {
                continue;
            };

            if message == SignalMessage::Shutdown {
                running.store(false, Ordering::SeqCst);
            }

            log_debug!("Received signal {sig}, forwarding {message:?}");

            if sender.send(message).is_err() {
                // Run loop is gone
                break;
            }
        }
    });

    Ok(state)
}
