//! Platform process-control capability.
//!
//! The termination engine talks to the OS only through two small traits:
//! [`ProcessControl`] opens a [`ProcessHandle`] for a PID, and the handle
//! delivers one of three [`SignalKind`]s before being released.
//!
//! Two self-contained implementations exist, chosen at compile time by
//! [`platform_control`]:
//! - POSIX: real `SIGTERM`/`SIGKILL`, existence probe with signal 0.
//! - Windows: a single `TerminateProcess` primitive for both phases, so
//!   graceful and forced termination cannot be told apart.

use std::sync::Arc;

use crate::error::SignalError;

#[cfg(unix)]
mod posix;

#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub use posix::PosixControl;

#[cfg(windows)]
pub use windows::WindowsControl;

/// Signals the termination engine can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    /// Zero-effect existence check (signal 0).
    Probe,
    /// Cooperative termination request (SIGTERM).
    Graceful,
    /// Unconditional termination (SIGKILL).
    Forced,
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SignalKind::Probe => "probe signal",
            SignalKind::Graceful => "graceful signal",
            SignalKind::Forced => "forced signal",
        };
        f.write_str(name)
    }
}

/// An opened process that can receive signals.
pub trait ProcessHandle: Send {
    /// Deliver a signal to the process.
    ///
    /// [`SignalError::NoSuchProcess`] means the process is gone, which
    /// callers treat as a benign outcome.
    fn signal(&self, kind: SignalKind) -> Result<(), SignalError>;

    /// Release any OS resources held by the handle.
    fn release(self: Box<Self>);
}

/// Factory for process handles on the current platform.
pub trait ProcessControl: Send + Sync {
    /// Open a handle for `pid`. The PID has already been validated as
    /// positive by the caller.
    fn open(&self, pid: i32) -> Result<Box<dyn ProcessHandle>, SignalError>;

    /// Whether graceful and forced signals have different semantics.
    fn distinct_signals(&self) -> bool;
}

/// Open, signal and release in one step.
pub fn send_signal(
    control: &dyn ProcessControl,
    pid: i32,
    kind: SignalKind,
) -> Result<(), SignalError> {
    let handle = control.open(pid)?;
    let result = handle.signal(kind);
    handle.release();
    result
}

/// Check whether `pid` refers to a live process.
///
/// Permission denied on the probe still proves the process exists.
pub fn probe(control: &dyn ProcessControl, pid: i32) -> bool {
    match send_signal(control, pid, SignalKind::Probe) {
        Ok(()) => true,
        Err(SignalError::PermissionDenied) => true,
        Err(_) => false,
    }
}

/// Create the process control implementation for this platform.
#[cfg(unix)]
pub fn platform_control() -> Arc<dyn ProcessControl> {
    Arc::new(PosixControl::new())
}

/// Create the process control implementation for this platform.
#[cfg(windows)]
pub fn platform_control() -> Arc<dyn ProcessControl> {
    Arc::new(WindowsControl::new())
}

#[cfg(not(any(unix, windows)))]
compile_error!("Unsupported platform: only Unix-like systems and Windows are supported");
