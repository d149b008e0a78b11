//! In-memory snapshot cache keyed by channel, with a TTL.
//!
//! Writes are last-write-wins; concurrent fetches of the same channel may
//! both store, which is harmless since either snapshot is valid.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::models::ChannelSnapshot;

struct CacheEntry {
    snapshot: Arc<ChannelSnapshot>,
    stored_at: Instant,
}

pub struct SnapshotCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        SnapshotCache {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Snapshot for `channel` if present and younger than the TTL.
    pub fn fresh(&self, channel: &str) -> Option<Arc<ChannelSnapshot>> {
        let entries = self.entries.read();
        let entry = entries.get(channel)?;
        if entry.stored_at.elapsed() < self.ttl {
            Some(Arc::clone(&entry.snapshot))
        } else {
            None
        }
    }

    /// Snapshot for `channel` regardless of age. Used as a fallback when
    /// a refresh fails.
    pub fn any(&self, channel: &str) -> Option<Arc<ChannelSnapshot>> {
        let entries = self.entries.read();
        entries.get(channel).map(|e| Arc::clone(&e.snapshot))
    }

    /// Store a snapshot and hand back the shared handle.
    pub fn store(&self, channel: &str, snapshot: ChannelSnapshot) -> Arc<ChannelSnapshot> {
        let shared = Arc::new(snapshot);
        let mut entries = self.entries.write();
        entries.insert(
            channel.to_string(),
            CacheEntry {
                snapshot: Arc::clone(&shared),
                stored_at: Instant::now(),
            },
        );
        shared
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
