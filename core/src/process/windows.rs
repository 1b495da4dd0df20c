//! Windows process control.
//!
//! Windows has no cooperative termination signal for arbitrary processes;
//! both graceful and forced requests map to `TerminateProcess`. Existence is
//! checked with `GetExitCodeProcess`.

use tracing::debug;
use windows::Win32::Foundation::{
    CloseHandle, E_ACCESSDENIED, ERROR_INVALID_PARAMETER, HANDLE, STILL_ACTIVE,
};
use windows::Win32::System::Threading::{
    GetExitCodeProcess, OpenProcess, TerminateProcess, PROCESS_QUERY_LIMITED_INFORMATION,
    PROCESS_TERMINATE,
};

use super::{ProcessControl, ProcessHandle, SignalKind};
use crate::error::SignalError;

/// Exit code reported by processes we terminate.
const TERMINATED_EXIT_CODE: u32 = 1;

/// Single-primitive process control for Windows.
#[derive(Debug, Default)]
pub struct WindowsControl;

impl WindowsControl {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessControl for WindowsControl {
    fn open(&self, pid: i32) -> Result<Box<dyn ProcessHandle>, SignalError> {
        let handle = unsafe {
            OpenProcess(
                PROCESS_TERMINATE | PROCESS_QUERY_LIMITED_INFORMATION,
                false,
                pid as u32,
            )
        }
        .map_err(map_error)?;

        Ok(Box::new(WindowsHandle { handle }))
    }

    fn distinct_signals(&self) -> bool {
        false
    }
}

/// An open process handle, closed on release or drop.
struct WindowsHandle {
    handle: HANDLE,
}

// The handle is an opaque kernel object reference; it is only used from
// one thread at a time and closed exactly once.
unsafe impl Send for WindowsHandle {}

impl ProcessHandle for WindowsHandle {
    fn signal(&self, kind: SignalKind) -> Result<(), SignalError> {
        match kind {
            SignalKind::Probe => {
                let mut code = 0u32;
                unsafe { GetExitCodeProcess(self.handle, &mut code) }.map_err(map_error)?;
                if code == STILL_ACTIVE.0 as u32 {
                    Ok(())
                } else {
                    Err(SignalError::NoSuchProcess)
                }
            }
            SignalKind::Graceful | SignalKind::Forced => {
                debug!(kind = %kind, "Calling TerminateProcess");
                unsafe { TerminateProcess(self.handle, TERMINATED_EXIT_CODE) }.map_err(map_error)
            }
        }
    }

    fn release(self: Box<Self>) {}
}

impl Drop for WindowsHandle {
    fn drop(&mut self) {
        let _ = unsafe { CloseHandle(self.handle) };
    }
}

fn map_error(err: windows::core::Error) -> SignalError {
    if err.code() == E_ACCESSDENIED {
        SignalError::PermissionDenied
    } else if err.code() == ERROR_INVALID_PARAMETER.to_hresult() {
        // OpenProcess reports an unknown PID as an invalid parameter.
        SignalError::NoSuchProcess
    } else {
        SignalError::Os {
            code: err.code().0,
            message: err.message().to_string(),
        }
    }
}
