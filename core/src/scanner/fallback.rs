//! TCP connect probing over a catalog of well-known ports.
//!
//! Used when no listing utility is usable. A probe can only tell that
//! something accepts connections, so every entry has an unknown owner.

use std::collections::BTreeSet;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::debug;

use crate::domain::PortEntry;

/// Ports probed by default.
pub const COMMON_PORTS: &[u16] = &[
    // Web servers
    80, 443, 8080, 8443, 8000, 8888, 3000, 3001, 3002, 3003, 4000, 4001, 5000, 5001, 5173,
    5174, 9000, 9001, 9090, 9091,
    // Databases
    3306, 5432, 27017, 27018, 6379, 6380, 9200, 9300, 5984, 7000, 7001, 8086, 8087,
    // Development tools
    4200, 4201, 8081, 8082, 8083, 8084, 8085, 9229, 9230, 35729, 6006, 6007, 1234, 1337,
    // Message queues
    5672, 15672, 9092, 2181, 4222, 8222, 1883, 8883,
    // Monitoring and metrics
    9100, 9093, 3100, 9411, 16686, 14268,
    // Container runtimes and orchestration
    2375, 2376, 2377, 6443, 10250, 10255, 8001, 8002,
    // Assorted services
    1433, 1521, 11211, 50000, 4567, 8025, 1025, 19000, 24678,
];

/// Probe `ports` on loopback and return an entry for every one that accepts.
///
/// Each connect is limited by `per_port`, and the whole sweep by `deadline`.
/// Probes still running at the deadline are abandoned. The result is sorted
/// by port.
pub async fn probe_ports(ports: &[u16], per_port: Duration, deadline: Duration) -> Vec<PortEntry> {
    let unique: BTreeSet<u16> = ports.iter().copied().collect();

    let mut probes = JoinSet::new();
    for port in unique {
        probes.spawn(async move { is_accepting(port, per_port).await.then_some(port) });
    }

    let mut open = Vec::new();
    let collect = async {
        while let Some(joined) = probes.join_next().await {
            if let Ok(Some(port)) = joined {
                open.push(port);
            }
        }
    };
    if timeout(deadline, collect).await.is_err() {
        debug!(deadline_ms = deadline.as_millis() as u64, "Probe sweep hit its deadline");
    }
    probes.abort_all();

    open.sort_unstable();
    debug!(open = open.len(), "Probe sweep finished");
    open.into_iter().map(PortEntry::unattributed).collect()
}

async fn is_accepting(port: u16, per_port: Duration) -> bool {
    let addrs = [
        SocketAddr::from((Ipv4Addr::LOCALHOST, port)),
        SocketAddr::from((Ipv6Addr::LOCALHOST, port)),
    ];
    matches!(timeout(per_port, TcpStream::connect(&addrs[..])).await, Ok(Ok(_)))
}
