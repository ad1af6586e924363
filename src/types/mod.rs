//! Core data types for the pomodoro session controller.
//!
//! This module defines the data structures used for:
//! - Session state (the single source of truth for "what is happening now")
//! - Session kinds and their configured durations
//! - Serializable status snapshots for presentation surfaces

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::session::SessionError;

// ============================================================================
// SessionState
// ============================================================================

/// Represents the current state of the session controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No session is running
    #[default]
    Idle,
    /// A pomodoro (work) session is counting down
    PomodoroRunning,
    /// A break session is counting down
    BreakRunning,
}

impl SessionState {
    /// Returns the string representation of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::PomodoroRunning => "pomodoro_running",
            SessionState::BreakRunning => "break_running",
        }
    }

    /// Returns true if a session is counting down.
    pub fn is_running(&self) -> bool {
        !matches!(self, SessionState::Idle)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SessionKind
// ============================================================================

/// The kind of a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Pomodoro,
    Break,
}

impl SessionKind {
    /// Returns the state a session of this kind runs in.
    pub fn running_state(&self) -> SessionState {
        match self {
            SessionKind::Pomodoro => SessionState::PomodoroRunning,
            SessionKind::Break => SessionState::BreakRunning,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Pomodoro => "pomodoro",
            SessionKind::Break => "break",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SessionConfig
// ============================================================================

/// Durations used by the session controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Length of a pomodoro session
    pub pomodoro: Duration,
    /// Length of a break session
    pub break_time: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            pomodoro: Duration::from_secs(25 * 60),
            break_time: Duration::from_secs(5 * 60),
        }
    }
}

impl SessionConfig {
    /// Creates a configuration from explicit durations.
    pub fn new(pomodoro: Duration, break_time: Duration) -> Self {
        Self {
            pomodoro,
            break_time,
        }
    }

    /// Creates a configuration from whole minutes.
    pub fn from_minutes(pomodoro_minutes: u32, break_minutes: u32) -> Self {
        Self::new(
            Duration::from_secs(u64::from(pomodoro_minutes) * 60),
            Duration::from_secs(u64::from(break_minutes) * 60),
        )
    }

    /// Replaces the pomodoro duration.
    pub fn with_pomodoro(mut self, duration: Duration) -> Self {
        self.pomodoro = duration;
        self
    }

    /// Replaces the break duration.
    pub fn with_break(mut self, duration: Duration) -> Self {
        self.break_time = duration;
        self
    }

    /// Returns the configured duration for the given session kind.
    pub fn duration_for(&self, kind: SessionKind) -> Duration {
        match kind {
            SessionKind::Pomodoro => self.pomodoro,
            SessionKind::Break => self.break_time,
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidDuration`] if either duration is zero.
    pub fn validate(&self) -> Result<(), SessionError> {
        for kind in [SessionKind::Pomodoro, SessionKind::Break] {
            if self.duration_for(kind).is_zero() {
                return Err(SessionError::InvalidDuration { kind });
            }
        }
        Ok(())
    }
}

// ============================================================================
// StatusSnapshot
// ============================================================================

/// A consistent view of the controller at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Current state
    pub state: SessionState,
    /// Whole seconds left in the active session (0 when idle)
    pub remaining_seconds: u64,
}

impl StatusSnapshot {
    pub fn new(state: SessionState, remaining: Duration) -> Self {
        Self {
            state,
            remaining_seconds: remaining.as_secs(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod session_state_tests {
        use super::*;

        #[test]
        fn test_default_is_idle() {
            assert_eq!(SessionState::default(), SessionState::Idle);
        }

        #[test]
        fn test_as_str() {
            assert_eq!(SessionState::Idle.as_str(), "idle");
            assert_eq!(SessionState::PomodoroRunning.as_str(), "pomodoro_running");
            assert_eq!(SessionState::BreakRunning.as_str(), "break_running");
        }

        #[test]
        fn test_is_running() {
            assert!(!SessionState::Idle.is_running());
            assert!(SessionState::PomodoroRunning.is_running());
            assert!(SessionState::BreakRunning.is_running());
        }

        #[test]
        fn test_serialization_uses_snake_case() {
            let json = serde_json::to_string(&SessionState::PomodoroRunning).unwrap();
            assert_eq!(json, "\"pomodoro_running\"");

            let state: SessionState = serde_json::from_str("\"break_running\"").unwrap();
            assert_eq!(state, SessionState::BreakRunning);
        }

        #[test]
        fn test_display_matches_as_str() {
            assert_eq!(SessionState::BreakRunning.to_string(), "break_running");
        }
    }

    mod session_kind_tests {
        use super::*;

        #[test]
        fn test_running_state() {
            assert_eq!(
                SessionKind::Pomodoro.running_state(),
                SessionState::PomodoroRunning
            );
            assert_eq!(SessionKind::Break.running_state(), SessionState::BreakRunning);
        }

        #[test]
        fn test_display() {
            assert_eq!(SessionKind::Pomodoro.to_string(), "pomodoro");
            assert_eq!(SessionKind::Break.to_string(), "break");
        }
    }

    mod session_config_tests {
        use super::*;

        #[test]
        fn test_default_config() {
            let config = SessionConfig::default();
            assert_eq!(config.pomodoro, Duration::from_secs(1500));
            assert_eq!(config.break_time, Duration::from_secs(300));
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_from_minutes() {
            let config = SessionConfig::from_minutes(50, 10);
            assert_eq!(config.pomodoro, Duration::from_secs(3000));
            assert_eq!(config.break_time, Duration::from_secs(600));
        }

        #[test]
        fn test_builder_methods() {
            let config = SessionConfig::default()
                .with_pomodoro(Duration::from_millis(10))
                .with_break(Duration::from_millis(5));
            assert_eq!(config.duration_for(SessionKind::Pomodoro), Duration::from_millis(10));
            assert_eq!(config.duration_for(SessionKind::Break), Duration::from_millis(5));
        }

        #[test]
        fn test_validate_zero_pomodoro() {
            let config = SessionConfig::default().with_pomodoro(Duration::ZERO);
            assert_eq!(
                config.validate(),
                Err(SessionError::InvalidDuration {
                    kind: SessionKind::Pomodoro
                })
            );
        }

        #[test]
        fn test_validate_zero_break() {
            let config = SessionConfig::default().with_break(Duration::ZERO);
            assert_eq!(
                config.validate(),
                Err(SessionError::InvalidDuration {
                    kind: SessionKind::Break
                })
            );
        }
    }

    mod status_snapshot_tests {
        use super::*;

        #[test]
        fn test_truncates_to_whole_seconds() {
            let snapshot =
                StatusSnapshot::new(SessionState::PomodoroRunning, Duration::from_millis(1999));
            assert_eq!(snapshot.remaining_seconds, 1);
        }

        #[test]
        fn test_serialization() {
            let snapshot = StatusSnapshot::new(SessionState::Idle, Duration::ZERO);
            let json = serde_json::to_string(&snapshot).unwrap();
            assert_eq!(json, r#"{"state":"idle","remaining_seconds":0}"#);
        }
    }
}
