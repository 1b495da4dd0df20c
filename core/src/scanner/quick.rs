//! Fast, attribution-light port scan.

use std::time::Duration;

use tracing::debug;

use crate::domain::PortEntry;
use crate::error::ScanError;

use super::fallback::{probe_ports, COMMON_PORTS};
use super::filter::is_noise;
use super::native::NativeCommand;

/// Produces a bare snapshot of listening ports.
///
/// Tries each listing utility in order and keeps the first that runs. When
/// none does, probes a catalog of well-known ports instead.
#[derive(Debug, Clone)]
pub struct QuickScanner {
    commands: Vec<NativeCommand>,
    catalog: Vec<u16>,
    probe_timeout: Duration,
    fallback_deadline: Duration,
}

impl QuickScanner {
    pub fn new(probe_timeout: Duration, fallback_deadline: Duration) -> Self {
        Self {
            commands: NativeCommand::platform_defaults(),
            catalog: COMMON_PORTS.to_vec(),
            probe_timeout,
            fallback_deadline,
        }
    }

    /// Replace the listing utilities. An empty list always probes.
    pub fn with_commands(mut self, commands: Vec<NativeCommand>) -> Self {
        self.commands = commands;
        self
    }

    /// Replace the probe catalog.
    pub fn with_catalog(mut self, catalog: Vec<u16>) -> Self {
        self.catalog = catalog;
        self
    }

    pub async fn scan(&self) -> Result<Vec<PortEntry>, ScanError> {
        for command in &self.commands {
            match command.run().await {
                Ok(entries) => {
                    let before = entries.len();
                    let kept: Vec<PortEntry> =
                        entries.into_iter().filter(|e| !is_noise(e)).collect();
                    debug!(
                        program = %command.program,
                        kept = kept.len(),
                        dropped = before - kept.len(),
                        "Quick scan finished"
                    );
                    return Ok(kept);
                }
                Err(e) => {
                    debug!(program = %command.program, error = %e, "Listing utility unusable");
                }
            }
        }

        debug!(ports = self.catalog.len(), "Falling back to probe sweep");
        Ok(probe_ports(&self.catalog, self.probe_timeout, self.fallback_deadline).await)
    }
}
