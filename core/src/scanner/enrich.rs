//! Background enrichment of quick-scan results.

use std::collections::HashMap;
use std::sync::Arc;

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind};
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::domain::{ContainerInfo, PortEntry};
use crate::error::ScanError;

use super::cache::ScanCache;
use super::docker::DockerCli;

/// Command line fragments that indicate a container runtime.
const CONTAINER_KEYWORDS: &[&str] = &[
    "docker",
    "containerd",
    "kubectl",
    "k8s",
    "podman",
    "conmon",
    "/docker/",
    "/containerd/",
];

/// Whether a command line belongs to a container runtime.
pub fn is_container_command(command: &str) -> bool {
    let lower = command.to_lowercase();
    CONTAINER_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

/// Per-process detail lookup.
pub trait ProcessTable: Send + Sync {
    /// Full command line of `pid`.
    fn command_line(&self, pid: u32) -> Result<String, ScanError>;
}

/// [`ProcessTable`] backed by sysinfo. Each lookup refreshes one process.
#[derive(Debug, Default, Clone, Copy)]
pub struct SysinfoProcessTable;

impl ProcessTable for SysinfoProcessTable {
    fn command_line(&self, pid: u32) -> Result<String, ScanError> {
        let target = Pid::from_u32(pid);
        let mut system = System::new();
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[target]),
            true,
            ProcessRefreshKind::nothing()
                .with_cmd(UpdateKind::Always)
                .with_exe(UpdateKind::Always),
        );

        let process = system.process(target).ok_or_else(|| ScanError::ProcessLookup {
            pid,
            reason: "process not found".to_string(),
        })?;

        let command = process
            .cmd()
            .iter()
            .map(|arg| arg.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ");
        if !command.is_empty() {
            return Ok(command);
        }

        process
            .exe()
            .map(|exe| exe.display().to_string())
            .ok_or_else(|| ScanError::ProcessLookup {
                pid,
                reason: "command line not readable".to_string(),
            })
    }
}

/// Outcome of one enrichment batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EnrichmentReport {
    /// Entries written to the cache.
    pub enriched: usize,
    /// Entries whose process lookup failed.
    pub failed_lookups: usize,
    /// Whether the batch stopped early.
    pub cancelled: bool,
}

/// Resolves full command lines and container identity for a batch of
/// entries and publishes the results to the [`ScanCache`].
#[derive(Clone)]
pub struct EnrichmentWorker {
    table: Arc<dyn ProcessTable>,
    docker: Option<DockerCli>,
    cache: Arc<ScanCache>,
}

impl EnrichmentWorker {
    pub fn new(table: Arc<dyn ProcessTable>, docker: Option<DockerCli>, cache: Arc<ScanCache>) -> Self {
        Self { table, docker, cache }
    }

    /// Enrich `batch` entry by entry.
    ///
    /// A failed lookup leaves that entry bare without affecting the rest.
    /// Cancellation is checked between entries.
    pub async fn run(&self, batch: Vec<PortEntry>, cancel: CancellationToken) -> EnrichmentReport {
        let mut report = EnrichmentReport::default();
        let mut containers: Option<HashMap<u16, ContainerInfo>> = None;

        for entry in batch {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            let mut enriched = entry;
            if enriched.has_owner() {
                match self.lookup(enriched.pid).await {
                    Ok(command) => {
                        enriched.is_docker = is_container_command(&command);
                        enriched.command = command;
                    }
                    Err(e) => {
                        debug!(port = enriched.port, pid = enriched.pid, error = %e, "Process lookup failed");
                        report.failed_lookups += 1;
                    }
                }
            }

            if enriched.is_docker {
                if containers.is_none() {
                    containers = Some(self.published_ports().await);
                }
                if let Some(info) = containers.as_ref().and_then(|c| c.get(&enriched.port)) {
                    enriched = enriched.with_container(info.clone());
                }
            }

            self.cache.insert(enriched);
            report.enriched += 1;
        }

        report
    }

    async fn lookup(&self, pid: u32) -> Result<String, ScanError> {
        let table = Arc::clone(&self.table);
        task::spawn_blocking(move || table.command_line(pid))
            .await
            .map_err(|e| ScanError::ProcessLookup {
                pid,
                reason: e.to_string(),
            })?
    }

    async fn published_ports(&self) -> HashMap<u16, ContainerInfo> {
        let Some(docker) = &self.docker else {
            return HashMap::new();
        };
        match docker.published_ports().await {
            Ok(ports) => ports,
            Err(e) => {
                warn!(error = %e, "Container lookup failed, keeping heuristic flag");
                HashMap::new()
            }
        }
    }
}

impl std::fmt::Debug for EnrichmentWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnrichmentWorker")
            .field("docker", &self.docker)
            .field("cached", &self.cache.len())
            .finish()
    }
}
