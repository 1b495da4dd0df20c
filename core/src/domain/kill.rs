//! Termination outcome types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::TerminateError;

/// How a termination ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KillMethod {
    /// The process exited after the cooperative signal.
    Graceful,
    /// The process needed the unconditional signal.
    Forced,
    /// Nothing was terminated.
    Failed,
}

impl std::fmt::Display for KillMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            KillMethod::Graceful => "GRACEFUL",
            KillMethod::Forced => "FORCED",
            KillMethod::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Result of a termination attempt.
///
/// Every exit path of the termination engine produces a fully populated
/// value. `duration` covers all work performed, including a full grace
/// period wait that ended in a failed escalation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KillResult {
    pub success: bool,
    pub method: KillMethod,
    pub message: String,
    pub duration: Duration,
    /// Classification of the failure, `None` on success.
    pub error: Option<TerminateError>,
}

impl KillResult {
    pub(crate) fn succeeded(method: KillMethod, message: String, duration: Duration) -> Self {
        Self {
            success: true,
            method,
            message,
            duration,
            error: None,
        }
    }

    pub(crate) fn failed(
        method: KillMethod,
        message: String,
        duration: Duration,
        error: TerminateError,
    ) -> Self {
        Self {
            success: false,
            method,
            message,
            duration,
            error: Some(error),
        }
    }

    /// Whether the attempt ended because the caller cancelled it.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.error, Some(TerminateError::Cancelled))
    }

    /// Whether protection refused the attempt before any signal was sent.
    pub fn is_protected_refusal(&self) -> bool {
        matches!(self.error, Some(TerminateError::ProtectedProcess { .. }))
    }
}
