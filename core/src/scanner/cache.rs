//! Enriched entries kept between scans.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::domain::PortEntry;

#[derive(Debug, Clone)]
struct CachedEntry {
    entry: PortEntry,
    stored_at: Instant,
}

/// Port-keyed store of enriched entries.
///
/// Readers never block each other; the enrichment worker takes the write
/// lock only for the insertion itself. An entry is substituted into a fresh
/// scan only while the same process still owns the port.
#[derive(Debug, Default)]
pub struct ScanCache {
    entries: RwLock<HashMap<u16, CachedEntry>>,
    ttl: Option<Duration>,
}

impl ScanCache {
    /// Create a cache. `None` keeps entries until they go stale.
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn insert(&self, entry: PortEntry) {
        let cached = CachedEntry {
            entry,
            stored_at: Instant::now(),
        };
        self.entries.write().insert(cached.entry.port, cached);
    }

    /// Look up a live entry.
    pub fn get(&self, port: u16) -> Option<PortEntry> {
        let entries = self.entries.read();
        entries
            .get(&port)
            .filter(|cached| !self.is_expired(cached))
            .map(|cached| cached.entry.clone())
    }

    /// Replace fresh entries with their cached enrichment where the owner
    /// is unchanged. Cached entries whose port changed owner are evicted.
    pub fn merge(&self, fresh: Vec<PortEntry>) -> Vec<PortEntry> {
        let mut stale: Vec<(u16, u32)> = Vec::new();

        let merged = {
            let entries = self.entries.read();
            fresh
                .into_iter()
                .map(|entry| match entries.get(&entry.port) {
                    Some(cached) if self.is_expired(cached) => entry,
                    Some(cached) if cached.entry.pid == entry.pid => cached.entry.clone(),
                    Some(_) => {
                        stale.push((entry.port, entry.pid));
                        entry
                    }
                    None => entry,
                })
                .collect()
        };

        if !stale.is_empty() {
            self.evict_replaced(&stale);
        }

        merged
    }

    /// Remove entries for `(port, owner pid)` pairs whose cached pid still
    /// differs from the owner. Returns how many were removed.
    fn evict_replaced(&self, stale: &[(u16, u32)]) -> usize {
        let mut entries = self.entries.write();
        let mut evicted = 0;
        for (port, owner) in stale {
            // An insert for the new owner may have landed since the read.
            if entries.get(port).is_some_and(|cached| cached.entry.pid != *owner) {
                entries.remove(port);
                evicted += 1;
            }
        }
        debug!(evicted, "Evicted cache entries with a new owner");
        evicted
    }

    /// Drop entries older than the TTL. Returns how many were removed.
    pub fn evict_expired(&self) -> usize {
        if self.ttl.is_none() {
            return 0;
        }

        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, cached| !self.is_expired(cached));
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, "Evicted expired cache entries");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    fn is_expired(&self, cached: &CachedEntry) -> bool {
        self.ttl
            .is_some_and(|ttl| cached.stored_at.elapsed() >= ttl)
    }
}
