//! Kill command - terminate the process holding a port.

use std::time::Duration;

use anyhow::{bail, Result};
use portchaser_core::{ConfigStore, KillMethod, KillResult, PortDiscovery, TerminationEngine};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// JSON view of a termination result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct KillReport<'a> {
    port: u16,
    pid: u32,
    success: bool,
    method: KillMethod,
    message: &'a str,
    duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a> KillReport<'a> {
    fn new(port: u16, pid: u32, result: &'a KillResult) -> Self {
        Self {
            port,
            pid,
            success: result.success,
            method: result.method,
            message: &result.message,
            duration_ms: result.duration.as_millis() as u64,
            error: result.error.as_ref().map(ToString::to_string),
        }
    }
}

pub async fn run(port: u16, grace_ms: Option<u64>, no_protection: bool, json: bool) -> Result<()> {
    let settings = ConfigStore::new()?.load().await?;

    let discovery = PortDiscovery::new(settings.discovery());
    let entry = discovery.scan_port(port).await?;
    discovery.shutdown().await;

    let Some(entry) = entry else {
        bail!("No process listening on port {}", port);
    };
    if !entry.has_owner() {
        bail!(
            "Port {} accepts connections but its owning process is unknown",
            port
        );
    }

    let mut termination = settings.termination();
    if no_protection {
        termination.system_protection = false;
    }
    let grace_period = grace_ms
        .map(Duration::from_millis)
        .unwrap_or(termination.grace_period);
    let engine = TerminationEngine::new(termination);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupt received, cancelling termination");
            on_interrupt.cancel();
        }
    });

    let result = engine
        .terminate_with_grace(&cancel, entry.pid, Some(&entry), grace_period)
        .await;

    if json {
        let report = KillReport::new(port, entry.pid, &result);
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if result.success {
        println!(
            "Killed {} (PID {}) on port {} [{}] in {}ms",
            entry.process_name,
            entry.pid,
            port,
            result.method,
            result.duration.as_millis()
        );
    }

    if !result.success {
        bail!("{}", result.message);
    }
    Ok(())
}
