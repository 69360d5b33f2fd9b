//! Wall-clock snapshot cache.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::model::Snapshot;

/// How long a snapshot stays fresh by default.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Single-slot cache holding the latest snapshot for up to `ttl`. One writer
/// refreshes it wholesale when `get` comes back empty; there is no partial
/// invalidation.
#[derive(Debug)]
pub struct SnapshotCache {
    ttl: Duration,
    entry: Option<Entry>,
}

#[derive(Debug)]
struct Entry {
    snapshot: Arc<Snapshot>,
    stored_at: Instant,
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    /// The cached snapshot, if one is present and younger than the TTL.
    pub fn get(&self) -> Option<Arc<Snapshot>> {
        self.entry
            .as_ref()
            .filter(|e| e.stored_at.elapsed() < self.ttl)
            .map(|e| Arc::clone(&e.snapshot))
    }

    /// Store a fresh snapshot, replacing whatever was cached.
    pub fn put(&mut self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        self.entry = Some(Entry {
            snapshot: Arc::clone(&snapshot),
            stored_at: Instant::now(),
        });
        snapshot
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
