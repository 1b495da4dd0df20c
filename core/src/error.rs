//! Error types for the portchaser-core library.

use thiserror::Error;

use crate::process::SignalKind;

/// Result type alias for portchaser operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Crate-level errors (configuration and scanning).
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Port discovery failed.
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
}

/// Errors that can occur during port discovery.
#[derive(Error, Debug)]
pub enum ScanError {
    /// A listing utility ran but reported failure.
    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    /// A listing utility is not installed or could not be spawned.
    #[error("Listing utility unavailable: {0}")]
    ToolUnavailable(String),

    /// Failed to parse command output.
    #[error("Failed to parse output: {0}")]
    ParseError(String),

    /// A single process-table lookup failed.
    #[error("Process lookup failed for PID {pid}: {reason}")]
    ProcessLookup { pid: u32, reason: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure reported by a platform process handle when delivering a signal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    /// The target process does not exist (or no longer exists).
    #[error("no such process")]
    NoSuchProcess,

    /// The caller is not allowed to signal the target.
    #[error("permission denied")]
    PermissionDenied,

    /// Any other OS-level failure.
    #[error("OS error {code}: {message}")]
    Os { code: i32, message: String },
}

/// Classification of a failed (or refused) termination.
///
/// Carried on [`crate::KillResult::error`]. The timing race where a process
/// vanishes between a check and a signal is a success path and has no variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TerminateError {
    /// PID 0 or a value that cannot address a single process.
    #[error("invalid PID {0}")]
    InvalidPid(u32),

    /// Refused by system-process protection; no signal was sent.
    #[error("PID {pid} is a protected system process")]
    ProtectedProcess { pid: u32 },

    /// The target was not running when checked.
    #[error("PID {pid} is not running")]
    NotRunning { pid: u32 },

    /// The OS rejected the signal.
    #[error("failed to send {signal} to PID {pid}: {source}")]
    SignalSendFailure {
        pid: u32,
        signal: SignalKind,
        #[source]
        source: SignalError,
    },

    /// The caller's cancellation token fired.
    #[error("operation cancelled")]
    Cancelled,
}
