//! Command definitions for the pomodoro session host.
//!
//! Uses clap derive macro for argument parsing.

use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::types::{SessionConfig, SessionKind};

// ============================================================================
// CLI Structure
// ============================================================================

/// Pomodoro session host - runs the session controller until interrupted
#[derive(Parser, Debug)]
#[command(
    name = "pomodoro-session",
    version,
    about = "ポモドーロセッションコントローラー",
    long_about = "作業と休憩のサイクルを管理するポモドーロタイマー。\n\
                  Ctrl-C または SIGTERM で安全に終了します。",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute (defaults to `run`)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the controller until a termination signal arrives
    Run(RunArgs),

    /// Construct the controller and shut it down immediately
    Smoke,
}

// ============================================================================
// Run Command Arguments
// ============================================================================

/// Session kind that can be started from the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartKind {
    Pomodoro,
    Break,
}

impl From<StartKind> for SessionKind {
    fn from(kind: StartKind) -> Self {
        match kind {
            StartKind::Pomodoro => SessionKind::Pomodoro,
            StartKind::Break => SessionKind::Break,
        }
    }
}

/// Arguments for the run command
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Pomodoro duration in minutes (1-120)
    #[arg(
        short,
        long,
        default_value = "25",
        value_parser = clap::value_parser!(u32).range(1..=120)
    )]
    pub pomodoro: u32,

    /// Break duration in minutes (1-60)
    #[arg(
        short,
        long,
        default_value = "5",
        value_parser = clap::value_parser!(u32).range(1..=60)
    )]
    pub break_time: u32,

    /// Seconds between label refreshes while a session is running (1-3600)
    #[arg(
        short,
        long,
        default_value = "10",
        value_parser = clap::value_parser!(u64).range(1..=3600)
    )]
    pub refresh: u64,

    /// Start a session immediately
    #[arg(short, long, value_enum)]
    pub start: Option<StartKind>,

    /// Print status lines as JSON
    #[arg(long)]
    pub json: bool,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            pomodoro: 25,
            break_time: 5,
            refresh: 10,
            start: None,
            json: false,
        }
    }
}

impl RunArgs {
    /// Builds the controller configuration from the parsed durations.
    pub fn config(&self) -> SessionConfig {
        SessionConfig::from_minutes(self.pomodoro, self.break_time)
    }

    /// Returns the label refresh cadence.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh)
    }
}

// ============================================================================
// Tests
// ============================================================================
