//! POSIX process control using real signals.
//!
//! - `kill(pid, 0)` to check existence
//! - `SIGTERM` for graceful termination
//! - `SIGKILL` for forced termination

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tracing::debug;

use super::{ProcessControl, ProcessHandle, SignalKind};
use crate::error::SignalError;

/// Signal-based process control for Unix-like systems.
#[derive(Debug, Default)]
pub struct PosixControl;

impl PosixControl {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessControl for PosixControl {
    fn open(&self, pid: i32) -> Result<Box<dyn ProcessHandle>, SignalError> {
        // Opening never fails on POSIX; existence is only known once a
        // signal is attempted.
        Ok(Box::new(PosixHandle {
            pid: Pid::from_raw(pid),
        }))
    }

    fn distinct_signals(&self) -> bool {
        true
    }
}

/// A PID addressed through `kill(2)`.
#[derive(Debug)]
struct PosixHandle {
    pid: Pid,
}

impl ProcessHandle for PosixHandle {
    fn signal(&self, kind: SignalKind) -> Result<(), SignalError> {
        let signal = match kind {
            SignalKind::Probe => None,
            SignalKind::Graceful => Some(Signal::SIGTERM),
            SignalKind::Forced => Some(Signal::SIGKILL),
        };

        if kind != SignalKind::Probe {
            debug!(pid = self.pid.as_raw(), signal = ?signal, "Sending signal to process");
        }

        kill(self.pid, signal).map_err(map_errno)
    }

    fn release(self: Box<Self>) {}
}

fn map_errno(errno: Errno) -> SignalError {
    match errno {
        Errno::ESRCH => SignalError::NoSuchProcess,
        Errno::EPERM => SignalError::PermissionDenied,
        other => SignalError::Os {
            code: other as i32,
            message: other.desc().to_string(),
        },
    }
}
