//! Display utilities for the pomodoro session host.
//!
//! This module provides formatted output for:
//! - State labels kept in sync with the controller
//! - Remaining-time labels refreshed on the host's own cadence
//! - Error messages

use std::time::Duration;

use crate::types::{SessionState, StatusSnapshot};

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Returns the human-readable name of a state.
    pub fn state_label(state: SessionState) -> &'static str {
        match state {
            SessionState::Idle => "待機中",
            SessionState::PomodoroRunning => "ポモドーロ中",
            SessionState::BreakRunning => "休憩中",
        }
    }

    /// Formats remaining time as whole minutes, e.g. `24m`.
    pub fn format_minutes(remaining: Duration) -> String {
        format!("{}m", remaining.as_secs() / 60)
    }

    /// Builds the status label, e.g. `ポモドーロ中 24m`.
    pub fn label(status: &StatusSnapshot) -> String {
        let name = Self::state_label(status.state);
        if status.state.is_running() {
            let remaining = Duration::from_secs(status.remaining_seconds);
            format!("{} {}", name, Self::format_minutes(remaining))
        } else {
            name.to_string()
        }
    }

    /// Renders a status line as plain text or JSON.
    pub fn render_status(status: &StatusSnapshot, json: bool) -> String {
        if json {
            match serde_json::to_string(status) {
                Ok(line) => return line,
                Err(e) => tracing::warn!(error = %e, "failed to serialize status"),
            }
        }
        Self::label(status)
    }

    /// Shows the current status.
    pub fn show_status(status: &StatusSnapshot, json: bool) {
        println!("{}", Self::render_status(status, json));
    }

    /// Shows the smoke check result.
    pub fn show_smoke_success() {
        println!("smoke OK");
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("エラー: {}", message);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod format_minutes_tests {
        use super::*;

        #[test]
        fn test_format_zero() {
            assert_eq!(Display::format_minutes(Duration::ZERO), "0m");
        }

        #[test]
        fn test_format_truncates_seconds() {
            assert_eq!(Display::format_minutes(Duration::from_secs(59)), "0m");
            assert_eq!(Display::format_minutes(Duration::from_secs(24 * 60 + 59)), "24m");
        }

        #[test]
        fn test_format_25_minutes() {
            assert_eq!(Display::format_minutes(Duration::from_secs(25 * 60)), "25m");
        }
    }

    mod label_tests {
        use super::*;

        #[test]
        fn test_state_labels() {
            assert_eq!(Display::state_label(SessionState::Idle), "待機中");
            assert_eq!(Display::state_label(SessionState::PomodoroRunning), "ポモドーロ中");
            assert_eq!(Display::state_label(SessionState::BreakRunning), "休憩中");
        }

        #[test]
        fn test_label_running() {
            let status = StatusSnapshot::new(
                SessionState::PomodoroRunning,
                Duration::from_secs(24 * 60 + 30),
            );
            assert_eq!(Display::label(&status), "ポモドーロ中 24m");
        }

        #[test]
        fn test_label_idle_omits_time() {
            let status = StatusSnapshot::new(SessionState::Idle, Duration::ZERO);
            assert_eq!(Display::label(&status), "待機中");
        }

        #[test]
        fn test_render_json() {
            let status = StatusSnapshot::new(SessionState::BreakRunning, Duration::from_secs(300));
            assert_eq!(
                Display::render_status(&status, true),
                r#"{"state":"break_running","remaining_seconds":300}"#
            );
        }

        #[test]
        fn test_render_text() {
            let status = StatusSnapshot::new(SessionState::BreakRunning, Duration::from_secs(300));
            assert_eq!(Display::render_status(&status, false), "休憩中 5m");
        }
    }

    mod output_tests {
        use super::*;

        #[test]
        fn test_show_status() {
            // Verifies the function doesn't panic
            let status = StatusSnapshot::new(SessionState::Idle, Duration::ZERO);
            Display::show_status(&status, false);
            Display::show_status(&status, true);
        }

        #[test]
        fn test_show_smoke_success() {
            Display::show_smoke_success();
        }

        #[test]
        fn test_show_error() {
            Display::show_error("Test error message");
        }
    }
}
