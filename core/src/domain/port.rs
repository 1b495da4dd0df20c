//! Port and process domain models.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Ports most developers expect to see at the top of a listing.
const COMMON_PORTS: [u16; 6] = [80, 443, 3000, 5000, 8000, 8080];

/// Kill count at which a port is suggested as a frequent target.
const RECOMMENDED_KILL_COUNT: u32 = 3;

// ============================================================================
// ContainerInfo
// ============================================================================

/// Identity of the container that owns a port.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ContainerInfo {
    /// Short container ID.
    pub id: String,
    /// Container name.
    pub name: String,
    /// Image the container was created from.
    pub image: String,
}

// ============================================================================
// PortEntry
// ============================================================================

/// One discovered port/process pairing.
///
/// Entries are snapshots: each scan produces fresh values, and only their
/// enriched copies survive between scans (in the scan cache).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortEntry {
    /// The port number, unique within one scan.
    pub port: u16,
    /// Short process name (e.g. "node").
    pub process_name: String,
    /// Owning process ID. 0 means the owner is unknown.
    pub pid: u32,
    /// Username of the process owner.
    pub user: String,
    /// Command line; the bare process name until enrichment replaces it.
    pub command: String,
    /// Whether a container runtime appears to own the process.
    pub is_docker: bool,
    /// Container identity, only present when `is_docker` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<ContainerInfo>,
    /// Policy flag for termination protection. Not an ownership guarantee.
    pub is_system: bool,
    /// Number of recent kills recorded by the caller's history.
    #[serde(default)]
    pub kill_count: u32,
    /// When this port was last killed, if ever.
    #[serde(default)]
    pub last_killed: Option<SystemTime>,
}

impl PortEntry {
    /// Create an entry from a native listing line.
    pub fn listening(
        port: u16,
        pid: u32,
        process_name: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        let process_name = process_name.into();
        Self {
            port,
            command: process_name.clone(),
            process_name,
            pid,
            user: user.into(),
            is_docker: false,
            container: None,
            is_system: port < 1024,
            kill_count: 0,
            last_killed: None,
        }
    }

    /// Create an entry for a port that accepted a TCP probe but has no
    /// known owner.
    pub fn unattributed(port: u16) -> Self {
        Self {
            port,
            process_name: "unknown".to_string(),
            pid: 0,
            user: "unknown".to_string(),
            command: "unknown".to_string(),
            is_docker: false,
            container: None,
            is_system: port < 1024,
            kill_count: 0,
            last_killed: None,
        }
    }

    /// Return a copy attributed to the given container.
    pub fn with_container(mut self, info: ContainerInfo) -> Self {
        self.is_docker = true;
        self.container = Some(info);
        self
    }

    /// Whether the owning process is known.
    pub fn has_owner(&self) -> bool {
        self.pid != 0
    }

    /// Whether this is one of the well-known web/app ports.
    pub fn is_common_port(&self) -> bool {
        COMMON_PORTS.contains(&self.port)
    }

    /// Whether the port has been killed often enough to be suggested.
    pub fn is_recommended(&self) -> bool {
        self.kill_count >= RECOMMENDED_KILL_COUNT
    }

    /// Whether the port is in the privileged range (0-1023).
    pub fn is_privileged_port(&self) -> bool {
        self.port < 1024
    }

    /// Whether termination protection applies to this entry.
    pub fn is_protected(&self, low_pid_threshold: u32) -> bool {
        self.is_system || self.pid < low_pid_threshold
    }

    /// Formatted port for display (e.g. ":3000").
    pub fn display_port(&self) -> String {
        format!(":{}", self.port)
    }

    /// Check if this entry matches a search query.
    pub fn matches_search(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let query_lower = query.to_lowercase();
        self.process_name.to_lowercase().contains(&query_lower)
            || self.port.to_string().contains(&query_lower)
            || self.pid.to_string().contains(&query_lower)
            || self.user.to_lowercase().contains(&query_lower)
            || self.command.to_lowercase().contains(&query_lower)
    }
}

impl std::fmt::Display for PortEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            ":{} (PID: {}, Process: {})",
            self.port, self.pid, self.process_name
        )
    }
}

/// Sort common ports first, then everything else, each group by port number.
pub fn sort_by_common_port(entries: &mut [PortEntry]) {
    entries.sort_by_key(|e| (!e.is_common_port(), e.port));
}

// ============================================================================
// Tests
// ============================================================================
