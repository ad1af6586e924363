//! Pomodoro Session Library
//!
//! This library provides the session controller behind the pomodoro timer.
//! It includes:
//! - A session controller tracking the work/break cycle with one countdown
//! - Observer subscriptions notified on every state transition
//! - Shutdown bounded by a deadline or cancellation signal
//! - Type definitions for state and configuration
//! - CLI parsing and display utilities for the host process

pub mod cli;
pub mod session;
pub mod types;

// Re-export commonly used types for convenience
pub use session::{SessionController, SessionError, Subscription, SubscriptionId};
pub use types::{SessionConfig, SessionKind, SessionState, StatusSnapshot};
