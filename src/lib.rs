//! # themeclock
//!
//! Switches a light/dark theme attribute based on local wall-clock time, with
//! a persisted manual override.
//!
//! This library exists to enable testing of the internals and to keep CLI
//! dispatch (`main.rs`) separate from application logic.
//!
//! ## Architecture
//!
//! - **Core**: `core` holds the pure boundary arithmetic (`TimeOfDay`,
//!   `BoundaryPair`, `is_light_now`, `next_boundary_minutes`) and the
//!   `Theme`/`Mode` types
//! - **State**: `controller` owns mode, boundaries and the single boundary timer
//! - **Persistence**: `storage` wraps a get/set/remove key-value backend
//! - **Output**: `sink` writes the theme attribute
//! - **Configuration**: `config` for the TOML settings file
//! - **Commands**: `commands` for the one-shot CLI subcommands
//! - **Infrastructure**: `io` (timer, signals), `time_source`, `logger`

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

pub mod args;
pub mod commands;
pub mod common;
pub mod config;
pub mod controller;
pub mod core;
pub mod io;
pub mod sink;
pub mod storage;
pub mod time_source;

mod themeclock;

pub use crate::controller::{ControllerOptions, ThemeController};
pub use crate::core::{BoundaryPair, Mode, Theme, TimeOfDay};
pub use crate::themeclock::{Themeclock, run_loop};
