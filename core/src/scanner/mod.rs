//! Port discovery.
//!
//! A scan returns a quick snapshot right away and hands the same batch to a
//! background worker that resolves full command lines and container
//! identity. Enriched entries land in a cache and show up from the next scan
//! on, as long as the same process still owns the port.

mod cache;
mod docker;
mod enrich;
mod fallback;
mod filter;
mod native;
mod quick;
mod utils;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::domain::PortEntry;
use crate::error::ScanError;

pub use cache::ScanCache;
pub use docker::{parse_docker_ps, DockerCli};
pub use enrich::{
    is_container_command, EnrichmentReport, EnrichmentWorker, ProcessTable, SysinfoProcessTable,
};
pub use fallback::{probe_ports, COMMON_PORTS};
pub use filter::is_noise;
pub use native::{parse_lsof_output, parse_ss_output, NativeCommand, OutputFormat};
pub use quick::QuickScanner;

/// Port discovery settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverySettings {
    /// Minimum time between scans for a driving loop.
    pub rescan_interval: Duration,
    /// Connect timeout for each fallback probe.
    pub probe_timeout: Duration,
    /// Deadline for the whole fallback sweep.
    pub fallback_deadline: Duration,
    /// Lifetime of cached enrichment. `None` keeps entries until the port
    /// changes owner.
    pub cache_ttl: Option<Duration>,
    /// Resolve container identity with the docker CLI.
    pub docker_lookup: bool,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            rescan_interval: Duration::from_secs(3),
            probe_timeout: Duration::from_millis(20),
            fallback_deadline: Duration::from_millis(500),
            cache_ttl: Some(Duration::from_secs(300)),
            docker_lookup: true,
        }
    }
}

/// Scans listening ports and enriches them in the background.
///
/// Dropping the discovery cancels outstanding enrichment.
#[derive(Debug)]
pub struct PortDiscovery {
    quick: QuickScanner,
    cache: Arc<ScanCache>,
    worker: EnrichmentWorker,
    rescan_interval: Duration,
    last_scan: RwLock<Option<Instant>>,
    enrichments: Mutex<Vec<JoinHandle<()>>>,
    shutdown: CancellationToken,
}

impl PortDiscovery {
    pub fn new(settings: DiscoverySettings) -> Self {
        let quick = QuickScanner::new(settings.probe_timeout, settings.fallback_deadline);
        Self::with_parts(quick, Arc::new(SysinfoProcessTable), settings)
    }

    /// Build from explicit parts (used in tests and by embedders that
    /// restrict the listing utilities).
    pub fn with_parts(
        quick: QuickScanner,
        table: Arc<dyn ProcessTable>,
        settings: DiscoverySettings,
    ) -> Self {
        let cache = Arc::new(ScanCache::new(settings.cache_ttl));
        let docker = settings.docker_lookup.then(DockerCli::new);
        Self {
            quick,
            worker: EnrichmentWorker::new(table, docker, Arc::clone(&cache)),
            cache,
            rescan_interval: settings.rescan_interval,
            last_scan: RwLock::new(None),
            enrichments: Mutex::new(Vec::new()),
            shutdown: CancellationToken::new(),
        }
    }

    /// Scan listening ports.
    ///
    /// Returns the quick snapshot with cached enrichment substituted, sorted
    /// by port. Enrichment of this batch runs in the background and never
    /// affects the value returned here.
    pub async fn scan(&self) -> Result<Vec<PortEntry>, ScanError> {
        self.cache.evict_expired();

        let bare = self.quick.scan().await?;
        *self.last_scan.write() = Some(Instant::now());

        let mut entries = self.cache.merge(bare.clone());
        entries.sort_by_key(|e| e.port);

        self.spawn_enrichment(bare);
        Ok(entries)
    }

    /// Scan and return the entry for one port, if it is listening.
    pub async fn scan_port(&self, port: u16) -> Result<Option<PortEntry>, ScanError> {
        let entries = self.scan().await?;
        Ok(entries.into_iter().find(|e| e.port == port))
    }

    /// Whether at least the rescan interval has passed since the last scan.
    pub fn should_rescan(&self) -> bool {
        match *self.last_scan.read() {
            Some(at) => at.elapsed() >= self.rescan_interval,
            None => true,
        }
    }

    /// When the last scan completed.
    pub fn last_scan(&self) -> Option<Instant> {
        *self.last_scan.read()
    }

    pub fn cache(&self) -> &ScanCache {
        &self.cache
    }

    /// Wait until all enrichment spawned so far has finished.
    pub async fn wait_idle(&self) {
        let handles = std::mem::take(&mut *self.enrichments.lock());
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "Enrichment task failed");
            }
        }
    }

    /// Cancel outstanding enrichment and wait for it to stop. Later scans
    /// still work but no longer enrich.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        self.wait_idle().await;
    }

    fn spawn_enrichment(&self, batch: Vec<PortEntry>) {
        if self.shutdown.is_cancelled() || batch.is_empty() {
            return;
        }

        let worker = self.worker.clone();
        let cancel = self.shutdown.child_token();
        let handle = tokio::spawn(async move {
            let report = worker.run(batch, cancel).await;
            debug!(
                enriched = report.enriched,
                failed = report.failed_lookups,
                cancelled = report.cancelled,
                "Enrichment finished"
            );
        });

        let mut handles = self.enrichments.lock();
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
    }
}

impl Drop for PortDiscovery {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
