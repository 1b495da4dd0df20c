//! Process termination engine.
//!
//! Termination follows a two-phase escalation:
//! 1. Refuse protected targets and targets that are not running
//! 2. Send the graceful signal (SIGTERM)
//! 3. Poll every 100ms until the process exits, the grace period runs out,
//!    or the caller cancels
//! 4. On timeout, send the forced signal (SIGKILL), let it settle, and check
//!    once more
//!
//! A process that disappears between any check and the following signal is
//! treated as terminated, so concurrent calls for the same PID are harmless.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval, sleep, sleep_until, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::{KillMethod, KillResult, PortEntry};
use crate::error::{SignalError, TerminateError};
use crate::process::{self, ProcessControl, SignalKind};

/// Shortest liveness polling interval; a zero interval would never yield.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Termination engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminationSettings {
    /// Wait between the graceful and the forced signal.
    pub grace_period: Duration,
    /// Refuse system processes (see [`PortEntry::is_protected`]).
    pub system_protection: bool,
    /// PIDs below this are considered system processes.
    pub low_pid_threshold: u32,
    /// Liveness polling interval during the grace period. Values below
    /// 1ms are raised to 1ms.
    pub poll_interval: Duration,
    /// Wait after the forced signal before the final check.
    pub settle_time: Duration,
}

impl Default for TerminationSettings {
    fn default() -> Self {
        Self {
            grace_period: Duration::from_secs(3),
            system_protection: true,
            low_pid_threshold: 100,
            poll_interval: Duration::from_millis(100),
            settle_time: Duration::from_millis(50),
        }
    }
}

/// Graceful-then-forced process terminator.
///
/// The engine holds no per-call state; any number of terminations for
/// different PIDs can run concurrently on one instance.
pub struct TerminationEngine {
    control: Arc<dyn ProcessControl>,
    settings: TerminationSettings,
}

impl TerminationEngine {
    /// Create an engine using the current platform's process control.
    pub fn new(settings: TerminationSettings) -> Self {
        Self::with_control(settings, process::platform_control())
    }

    /// Create an engine with an explicit process control implementation.
    pub fn with_control(settings: TerminationSettings, control: Arc<dyn ProcessControl>) -> Self {
        Self { control, settings }
    }

    /// Current settings.
    pub fn settings(&self) -> &TerminationSettings {
        &self.settings
    }

    /// Check if a process is running.
    pub fn is_running(&self, pid: u32) -> bool {
        match valid_pid(pid) {
            Some(raw) => process::probe(self.control.as_ref(), raw),
            None => false,
        }
    }

    /// Terminate `pid` using the configured grace period.
    ///
    /// `entry` is the scan result the PID came from, if any; only its policy
    /// flags are read.
    pub async fn terminate(
        &self,
        cancel: &CancellationToken,
        pid: u32,
        entry: Option<&PortEntry>,
    ) -> KillResult {
        self.terminate_with_grace(cancel, pid, entry, self.settings.grace_period)
            .await
    }

    /// Terminate `pid` with an explicit grace period.
    pub async fn terminate_with_grace(
        &self,
        cancel: &CancellationToken,
        pid: u32,
        entry: Option<&PortEntry>,
        grace_period: Duration,
    ) -> KillResult {
        let started = Instant::now();

        let Some(raw_pid) = valid_pid(pid) else {
            warn!(pid = pid, "Refusing to signal invalid PID");
            return KillResult::failed(
                KillMethod::Failed,
                format!("PID {} is not a valid termination target", pid),
                started.elapsed(),
                TerminateError::InvalidPid(pid),
            );
        };

        if self.settings.system_protection && self.is_protected(pid, entry) {
            info!(pid = pid, "Refusing to terminate protected process");
            return KillResult::failed(
                KillMethod::Failed,
                format!("PID {} is a protected system process", pid),
                started.elapsed(),
                TerminateError::ProtectedProcess { pid },
            );
        }

        if cancel.is_cancelled() {
            return cancelled(started);
        }

        if !process::probe(self.control.as_ref(), raw_pid) {
            debug!(pid = pid, "Process not running");
            return KillResult::failed(
                KillMethod::Failed,
                format!("PID {} is not running", pid),
                started.elapsed(),
                TerminateError::NotRunning { pid },
            );
        }

        match process::send_signal(self.control.as_ref(), raw_pid, SignalKind::Graceful) {
            Ok(()) => {
                debug!(pid = pid, "Graceful signal sent, waiting for process to exit");
            }
            Err(SignalError::NoSuchProcess) => {
                debug!(pid = pid, "Process exited before the graceful signal");
                return KillResult::succeeded(
                    KillMethod::Graceful,
                    self.annotate(format!("PID {} exited before it was signalled", pid)),
                    started.elapsed(),
                );
            }
            Err(source) => {
                warn!(pid = pid, error = %source, "Failed to send graceful signal");
                return KillResult::failed(
                    KillMethod::Failed,
                    format!("Failed to send graceful signal to PID {}: {}", pid, source),
                    started.elapsed(),
                    TerminateError::SignalSendFailure {
                        pid,
                        signal: SignalKind::Graceful,
                        source,
                    },
                );
            }
        }

        let grace_timer = sleep_until(Instant::now() + grace_period);
        tokio::pin!(grace_timer);

        let mut ticker = interval(self.settings.poll_interval.max(MIN_POLL_INTERVAL));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; polling starts one interval in.
        ticker.tick().await;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(pid = pid, "Termination cancelled during grace period");
                    return cancelled(started);
                }
                _ = &mut grace_timer => {
                    return self.escalate(pid, raw_pid, started).await;
                }
                _ = ticker.tick() => {
                    if !process::probe(self.control.as_ref(), raw_pid) {
                        debug!(pid = pid, "Process exited after graceful signal");
                        return KillResult::succeeded(
                            KillMethod::Graceful,
                            self.annotate(format!("PID {} exited gracefully", pid)),
                            started.elapsed(),
                        );
                    }
                }
            }
        }
    }

    async fn escalate(&self, pid: u32, raw_pid: i32, started: Instant) -> KillResult {
        // The process may have exited between the last poll and the deadline.
        if !process::probe(self.control.as_ref(), raw_pid) {
            return KillResult::succeeded(
                KillMethod::Graceful,
                self.annotate(format!("PID {} exited at the end of the grace period", pid)),
                started.elapsed(),
            );
        }

        debug!(pid = pid, "Grace period elapsed, sending forced signal");
        match process::send_signal(self.control.as_ref(), raw_pid, SignalKind::Forced) {
            Ok(()) => {}
            Err(SignalError::NoSuchProcess) => {
                return KillResult::succeeded(
                    KillMethod::Graceful,
                    self.annotate(format!("PID {} exited before the forced signal", pid)),
                    started.elapsed(),
                );
            }
            Err(source) => {
                warn!(pid = pid, error = %source, "Failed to send forced signal");
                return KillResult::failed(
                    KillMethod::Failed,
                    format!("Failed to send forced signal to PID {}: {}", pid, source),
                    started.elapsed(),
                    TerminateError::SignalSendFailure {
                        pid,
                        signal: SignalKind::Forced,
                        source,
                    },
                );
            }
        }

        sleep(self.settings.settle_time).await;

        if process::probe(self.control.as_ref(), raw_pid) {
            warn!(pid = pid, "Process survived the forced signal");
            KillResult {
                success: false,
                method: KillMethod::Forced,
                message: format!("PID {} is still running after the forced signal", pid),
                duration: started.elapsed(),
                error: None,
            }
        } else {
            KillResult::succeeded(
                KillMethod::Forced,
                self.annotate(format!("PID {} was forcibly terminated", pid)),
                started.elapsed(),
            )
        }
    }

    fn is_protected(&self, pid: u32, entry: Option<&PortEntry>) -> bool {
        pid < self.settings.low_pid_threshold || entry.is_some_and(|e| e.is_system)
    }

    /// Mark messages on platforms where the two phases share one primitive.
    fn annotate(&self, message: String) -> String {
        if self.control.distinct_signals() {
            message
        } else {
            format!(
                "{} (graceful and forced termination are indistinguishable on this platform)",
                message
            )
        }
    }
}

/// Convert a PID into a positive `i32`, the only form that addresses a
/// single process. 0 and anything that would wrap negative are rejected.
fn valid_pid(pid: u32) -> Option<i32> {
    match i32::try_from(pid) {
        Ok(raw) if raw > 0 => Some(raw),
        _ => None,
    }
}

fn cancelled(started: Instant) -> KillResult {
    KillResult::failed(
        KillMethod::Failed,
        "operation cancelled".to_string(),
        started.elapsed(),
        TerminateError::Cancelled,
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use parking_lot::Mutex;

    use super::*;
    use crate::process::ProcessHandle;

    #[derive(Debug, Clone, Copy)]
    enum Behavior {
        ExitOnGraceful,
        ExitAfter(Duration),
        IgnoreGraceful,
        Unkillable,
        DenyGraceful,
        VanishOnGraceful,
    }

    #[derive(Debug)]
    struct FakeProcess {
        behavior: Behavior,
        alive: bool,
        exit_at: Option<Instant>,
    }

    /// In-memory process table that records every signal.
    #[derive(Default)]
    struct FakeControl {
        processes: Mutex<HashMap<i32, FakeProcess>>,
        sent: Mutex<Vec<(i32, SignalKind)>>,
        single_primitive: bool,
    }

    impl FakeControl {
        fn with(pid: i32, behavior: Behavior) -> Arc<Self> {
            let control = Self::default();
            control.spawn(pid, behavior);
            Arc::new(control)
        }

        fn spawn(&self, pid: i32, behavior: Behavior) {
            self.processes.lock().insert(
                pid,
                FakeProcess {
                    behavior,
                    alive: true,
                    exit_at: None,
                },
            );
        }

        fn sent(&self) -> Vec<(i32, SignalKind)> {
            self.sent.lock().clone()
        }

        fn non_probe_signals(&self) -> Vec<SignalKind> {
            self.sent()
                .into_iter()
                .map(|(_, kind)| kind)
                .filter(|kind| *kind != SignalKind::Probe)
                .collect()
        }

        fn deliver(&self, pid: i32, kind: SignalKind) -> Result<(), SignalError> {
            self.sent.lock().push((pid, kind));
            let mut processes = self.processes.lock();
            let Some(process) = processes.get_mut(&pid) else {
                return Err(SignalError::NoSuchProcess);
            };

            if let Some(exit_at) = process.exit_at {
                if Instant::now() >= exit_at {
                    process.alive = false;
                }
            }
            if !process.alive {
                return Err(SignalError::NoSuchProcess);
            }

            match (kind, process.behavior) {
                (SignalKind::Probe, _) => Ok(()),
                (SignalKind::Graceful, Behavior::ExitOnGraceful) => {
                    process.alive = false;
                    Ok(())
                }
                (SignalKind::Graceful, Behavior::ExitAfter(delay)) => {
                    process.exit_at = Some(Instant::now() + delay);
                    Ok(())
                }
                (SignalKind::Graceful, Behavior::DenyGraceful) => Err(SignalError::PermissionDenied),
                (SignalKind::Graceful, Behavior::VanishOnGraceful) => {
                    process.alive = false;
                    Err(SignalError::NoSuchProcess)
                }
                (SignalKind::Graceful, _) => Ok(()),
                (SignalKind::Forced, Behavior::Unkillable) => Ok(()),
                (SignalKind::Forced, _) => {
                    process.alive = false;
                    Ok(())
                }
            }
        }
    }

    struct FakeHandle {
        control: Arc<FakeControl>,
        pid: i32,
    }

    impl ProcessHandle for FakeHandle {
        fn signal(&self, kind: SignalKind) -> Result<(), SignalError> {
            self.control.deliver(self.pid, kind)
        }

        fn release(self: Box<Self>) {}
    }

    /// Wrapper so handles can keep a reference to the shared fake.
    struct SharedFake(Arc<FakeControl>);

    impl ProcessControl for SharedFake {
        fn open(&self, pid: i32) -> Result<Box<dyn ProcessHandle>, SignalError> {
            Ok(Box::new(FakeHandle {
                control: self.0.clone(),
                pid,
            }))
        }

        fn distinct_signals(&self) -> bool {
            !self.0.single_primitive
        }
    }

    fn engine(fake: &Arc<FakeControl>, grace_period: Duration) -> TerminationEngine {
        TerminationEngine::with_control(
            TerminationSettings {
                grace_period,
                ..TerminationSettings::default()
            },
            Arc::new(SharedFake(fake.clone())),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_running_sends_no_signal() {
        let fake = Arc::new(FakeControl::default());
        let engine = engine(&fake, Duration::from_secs(3));

        let result = engine
            .terminate(&CancellationToken::new(), 4242, None)
            .await;

        assert!(!result.success);
        assert_eq!(result.method, KillMethod::Failed);
        assert_eq!(result.error, Some(TerminateError::NotRunning { pid: 4242 }));
        assert!(fake.non_probe_signals().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_protected_entry_sends_zero_signals() {
        let fake = FakeControl::with(4242, Behavior::ExitOnGraceful);
        let engine = engine(&fake, Duration::from_secs(3));
        let mut entry = PortEntry::listening(80, 4242, "nginx", "root");
        entry.is_system = true;

        let result = engine
            .terminate(&CancellationToken::new(), 4242, Some(&entry))
            .await;

        assert!(!result.success);
        assert_eq!(result.method, KillMethod::Failed);
        assert!(result.is_protected_refusal());
        assert!(fake.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_low_pid_is_protected_without_entry() {
        let fake = FakeControl::with(50, Behavior::ExitOnGraceful);
        let engine = engine(&fake, Duration::from_secs(3));

        let result = engine.terminate(&CancellationToken::new(), 50, None).await;

        assert_eq!(result.error, Some(TerminateError::ProtectedProcess { pid: 50 }));
        assert!(fake.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_protection_disabled_allows_low_pid() {
        let fake = FakeControl::with(50, Behavior::ExitOnGraceful);
        let engine = TerminationEngine::with_control(
            TerminationSettings {
                system_protection: false,
                ..TerminationSettings::default()
            },
            Arc::new(SharedFake(fake.clone())),
        );

        let result = engine.terminate(&CancellationToken::new(), 50, None).await;
        assert!(result.success);
        assert_eq!(result.method, KillMethod::Graceful);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_poll_interval_still_terminates() {
        let fake = FakeControl::with(4242, Behavior::ExitAfter(Duration::from_millis(150)));
        let engine = TerminationEngine::with_control(
            TerminationSettings {
                poll_interval: Duration::ZERO,
                grace_period: Duration::from_millis(200),
                ..TerminationSettings::default()
            },
            Arc::new(SharedFake(fake.clone())),
        );

        let result = engine
            .terminate(&CancellationToken::new(), 4242, None)
            .await;

        assert!(result.success, "{}", result.message);
        assert_eq!(result.method, KillMethod::Graceful);
        assert!(result.duration >= Duration::from_millis(150));
        assert!(result.duration < Duration::from_millis(200));
        assert_eq!(fake.non_probe_signals(), vec![SignalKind::Graceful]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_poll_interval_escalates() {
        let fake = FakeControl::with(4242, Behavior::IgnoreGraceful);
        let engine = TerminationEngine::with_control(
            TerminationSettings {
                poll_interval: Duration::ZERO,
                grace_period: Duration::from_millis(200),
                ..TerminationSettings::default()
            },
            Arc::new(SharedFake(fake.clone())),
        );

        let result = engine
            .terminate(&CancellationToken::new(), 4242, None)
            .await;

        assert!(result.success, "{}", result.message);
        assert_eq!(result.method, KillMethod::Forced);
        assert_eq!(
            fake.non_probe_signals(),
            vec![SignalKind::Graceful, SignalKind::Forced]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_pids_fail_fast() {
        let fake = Arc::new(FakeControl::default());
        let engine = engine(&fake, Duration::from_secs(3));

        for pid in [0, u32::MAX, i32::MAX as u32 + 1] {
            let result = engine.terminate(&CancellationToken::new(), pid, None).await;
            assert_eq!(result.method, KillMethod::Failed);
            assert_eq!(result.error, Some(TerminateError::InvalidPid(pid)));
        }
        assert!(fake.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_graceful_exit_with_default_grace() {
        let fake = FakeControl::with(4242, Behavior::ExitOnGraceful);
        let engine = engine(&fake, Duration::from_secs(3));

        let result = engine
            .terminate(&CancellationToken::new(), 4242, None)
            .await;

        assert!(result.success);
        assert_eq!(result.method, KillMethod::Graceful);
        assert!(result.duration < Duration::from_millis(500));
        assert_eq!(fake.non_probe_signals(), vec![SignalKind::Graceful]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exit_during_grace_period() {
        let fake = FakeControl::with(4242, Behavior::ExitAfter(Duration::from_millis(750)));
        let engine = engine(&fake, Duration::from_secs(3));

        let result = engine
            .terminate(&CancellationToken::new(), 4242, None)
            .await;

        assert!(result.success);
        assert_eq!(result.method, KillMethod::Graceful);
        assert!(result.duration >= Duration::from_millis(750));
        assert!(result.duration < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ignored_graceful_signal_escalates() {
        let fake = FakeControl::with(4242, Behavior::IgnoreGraceful);
        let engine = engine(&fake, Duration::from_millis(200));

        let result = engine
            .terminate(&CancellationToken::new(), 4242, None)
            .await;

        assert!(result.success);
        assert_eq!(result.method, KillMethod::Forced);
        assert!(result.duration >= Duration::from_millis(200));
        assert!(result.duration <= Duration::from_millis(260));
        assert_eq!(
            fake.non_probe_signals(),
            vec![SignalKind::Graceful, SignalKind::Forced]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_unkillable_process_reports_forced_failure() {
        let fake = FakeControl::with(4242, Behavior::Unkillable);
        let engine = engine(&fake, Duration::from_millis(200));

        let result = engine
            .terminate(&CancellationToken::new(), 4242, None)
            .await;

        assert!(!result.success);
        assert_eq!(result.method, KillMethod::Forced);
        assert!(result.error.is_none());
        // The full grace period and settle time are still accounted for.
        assert!(result.duration >= Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_returns_within_one_interval() {
        let fake = FakeControl::with(4242, Behavior::IgnoreGraceful);
        let engine = engine(&fake, Duration::from_secs(3));
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(250)).await;
            trigger.cancel();
        });

        let result = engine.terminate(&cancel, 4242, None).await;

        assert!(!result.success);
        assert_eq!(result.method, KillMethod::Failed);
        assert_eq!(result.message, "operation cancelled");
        assert!(result.is_cancelled());
        assert!(result.duration < Duration::from_millis(350));
        assert_eq!(fake.non_probe_signals(), vec![SignalKind::Graceful]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_cancelled_sends_nothing() {
        let fake = FakeControl::with(4242, Behavior::ExitOnGraceful);
        let engine = engine(&fake, Duration::from_secs(3));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = engine.terminate(&cancel, 4242, None).await;

        assert!(result.is_cancelled());
        assert!(fake.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_signal_rejection_propagates_error() {
        let fake = FakeControl::with(4242, Behavior::DenyGraceful);
        let engine = engine(&fake, Duration::from_secs(3));

        let result = engine
            .terminate(&CancellationToken::new(), 4242, None)
            .await;

        assert!(!result.success);
        assert_eq!(result.method, KillMethod::Failed);
        assert_eq!(
            result.error,
            Some(TerminateError::SignalSendFailure {
                pid: 4242,
                signal: SignalKind::Graceful,
                source: SignalError::PermissionDenied,
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_vanishing_before_signal_is_success() {
        let fake = FakeControl::with(4242, Behavior::VanishOnGraceful);
        let engine = engine(&fake, Duration::from_secs(3));

        let result = engine
            .terminate(&CancellationToken::new(), 4242, None)
            .await;

        assert!(result.success);
        assert_eq!(result.method, KillMethod::Graceful);
        assert!(result.error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_same_pid_is_benign() {
        let fake = FakeControl::with(4242, Behavior::ExitAfter(Duration::from_millis(150)));
        let engine = engine(&fake, Duration::from_secs(3));
        let cancel = CancellationToken::new();

        let (first, second) = tokio::join!(
            engine.terminate(&cancel, 4242, None),
            engine.terminate(&cancel, 4242, None),
        );

        assert!(first.success);
        assert!(second.success);
        assert_eq!(first.method, KillMethod::Graceful);
        assert_eq!(second.method, KillMethod::Graceful);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_primitive_platform_is_annotated() {
        let fake = Arc::new(FakeControl {
            single_primitive: true,
            ..FakeControl::default()
        });
        fake.spawn(4242, Behavior::ExitOnGraceful);
        let engine = engine(&fake, Duration::from_secs(3));

        let result = engine
            .terminate(&CancellationToken::new(), 4242, None)
            .await;

        assert!(result.success);
        assert!(result.message.contains("indistinguishable"));
    }

    #[cfg(unix)]
    mod real_processes {
        use std::process::Command;

        use super::*;

        fn unprotected() -> TerminationEngine {
            TerminationEngine::new(TerminationSettings {
                system_protection: false,
                ..TerminationSettings::default()
            })
        }

        /// Spawn a child and reap it on a separate thread so it does not
        /// linger as a zombie after it dies.
        fn spawn_reaped(program: &str, args: &[&str]) -> u32 {
            let mut child = Command::new(program).args(args).spawn().unwrap();
            let pid = child.id();
            std::thread::spawn(move || {
                let _ = child.wait();
            });
            pid
        }

        #[tokio::test]
        async fn test_real_process_exits_gracefully() {
            let pid = spawn_reaped("sleep", &["30"]);
            let engine = unprotected();
            assert!(engine.is_running(pid));

            let result = engine.terminate(&CancellationToken::new(), pid, None).await;

            assert!(result.success, "{}", result.message);
            assert_eq!(result.method, KillMethod::Graceful);
            assert!(result.duration < Duration::from_millis(500));
            assert!(!engine.is_running(pid));
        }

        #[tokio::test]
        async fn test_real_process_ignoring_sigterm_is_forced() {
            let pid = spawn_reaped("sh", &["-c", "trap '' TERM; exec sleep 30"]);
            // Give the shell time to install the trap before signalling.
            sleep(Duration::from_millis(300)).await;
            let engine = unprotected();

            let result = engine
                .terminate_with_grace(&CancellationToken::new(), pid, None, Duration::from_millis(200))
                .await;

            assert!(result.success, "{}", result.message);
            assert_eq!(result.method, KillMethod::Forced);
            assert!(result.duration >= Duration::from_millis(200));
        }

        #[tokio::test]
        async fn test_real_process_with_zero_poll_interval() {
            let pid = spawn_reaped("sleep", &["30"]);
            let engine = TerminationEngine::new(TerminationSettings {
                system_protection: false,
                poll_interval: Duration::ZERO,
                grace_period: Duration::from_millis(200),
                ..TerminationSettings::default()
            });

            let result = engine.terminate(&CancellationToken::new(), pid, None).await;

            assert!(result.success, "{}", result.message);
            assert!(!engine.is_running(pid));
        }

        #[tokio::test]
        async fn test_real_missing_process_is_not_running() {
            let engine = unprotected();
            let result = engine
                .terminate(&CancellationToken::new(), 999_999_999, None)
                .await;

            assert_eq!(result.method, KillMethod::Failed);
            assert_eq!(
                result.error,
                Some(TerminateError::NotRunning { pid: 999_999_999 })
            );
        }
    }
}
