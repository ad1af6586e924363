//! CLI module for the pomodoro session host.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `display`: Label formatting and output
//! - `label`: Label worker kept in sync with the session controller

pub mod commands;
pub mod display;
pub mod label;

pub use commands::{Cli, Commands, RunArgs, StartKind};
pub use display::Display;
pub use label::LabelUpdater;
