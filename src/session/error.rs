//! Session controller error types.
//!
//! Only construction and shutdown surface errors. Transitions, stale
//! expiries and observer failures never reach callers or observers.

use thiserror::Error;

use crate::types::SessionKind;

/// Errors that can occur when constructing or shutting down a controller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A configured session duration was zero.
    #[error("{kind}の時間は0より大きい値を指定してください")]
    InvalidDuration { kind: SessionKind },

    /// The controller was constructed outside of a tokio runtime.
    #[error("tokioランタイムの外でセッションコントローラーを作成することはできません")]
    RuntimeUnavailable,

    /// The shutdown deadline elapsed before cleanup completed.
    #[error("シャットダウンがタイムアウトしました")]
    ShutdownTimedOut,

    /// The shutdown cancellation signal fired before cleanup completed.
    #[error("シャットダウンがキャンセルされました")]
    ShutdownCancelled,
}

impl SessionError {
    /// Returns true if this error reports an exhausted shutdown budget.
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::ShutdownTimedOut | Self::ShutdownCancelled)
    }

    /// Returns true if this error reports misuse at construction time.
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::InvalidDuration { .. } | Self::RuntimeUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_duration() {
        let err = SessionError::InvalidDuration {
            kind: SessionKind::Break,
        };
        assert!(err.to_string().contains("break"));
        assert!(err.to_string().contains("0より大きい"));
    }

    #[test]
    fn test_error_display_timeout() {
        let err = SessionError::ShutdownTimedOut;
        assert!(err.to_string().contains("タイムアウト"));
    }

    #[test]
    fn test_error_display_cancelled() {
        let err = SessionError::ShutdownCancelled;
        assert!(err.to_string().contains("キャンセル"));
    }

    #[test]
    fn test_is_cancellation() {
        assert!(SessionError::ShutdownTimedOut.is_cancellation());
        assert!(SessionError::ShutdownCancelled.is_cancellation());
        assert!(!SessionError::RuntimeUnavailable.is_cancellation());
    }

    #[test]
    fn test_is_contract_violation() {
        assert!(SessionError::RuntimeUnavailable.is_contract_violation());
        assert!(SessionError::InvalidDuration {
            kind: SessionKind::Pomodoro
        }
        .is_contract_violation());
        assert!(!SessionError::ShutdownTimedOut.is_contract_violation());
    }
}
