//! # Photoperiod Library
//!
//! Internal library for the photoperiod binary application
//!
//! This library exists to enable testing of the cycle arithmetic and the live
//! view, and to keep CLI dispatch (main.rs) separate from application logic.
//!
//! ## Architecture
//!
//! - **Cycle**: `cycle` module with the light/dark arithmetic, the calendar grid
//!   and the status snapshot. Pure functions of a config and an instant.
//! - **Configuration**: `config` module for TOML-based settings with hot-reload
//! - **Live view**: `live` refreshes the status on a timer and reacts to
//!   reload and shutdown signals
//! - **Commands**: `commands` module for CLI subcommands (status, grid, get,
//!   set, export, import, simulate)
//! - **Infrastructure**: time source, signal handling and logging

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

pub mod args;
pub mod commands;
pub mod config;
pub mod constants;
pub mod cycle;
pub mod live;
pub mod signals;
pub mod time_source;
