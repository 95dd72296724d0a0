//! In-memory cache for the runtime listing.

use piston_types::Runtime;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

#[derive(Debug)]
struct Snapshot {
    runtimes: Arc<Vec<Runtime>>,
    stored_at: Instant,
}

/// Holds the most recent successful runtime listing.
///
/// Expiry is checked when the snapshot is read: once `ttl` has elapsed since
/// it was stored, it is treated as absent. Nothing runs in the background.
/// The lock is only held for the duration of a read or a swap, never across a
/// fetch, so concurrent misses each fetch and the last store wins.
#[derive(Debug)]
pub struct RuntimeCache {
    snapshot: RwLock<Option<Snapshot>>,
    ttl: Duration,
}

impl RuntimeCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            snapshot: RwLock::new(None),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached listing, if one was stored less than `ttl` ago.
    pub async fn get(&self) -> Option<Arc<Vec<Runtime>>> {
        let snapshot = self.snapshot.read().await;
        snapshot
            .as_ref()
            .filter(|snapshot| snapshot.stored_at.elapsed() < self.ttl)
            .map(|snapshot| snapshot.runtimes.clone())
    }

    /// Replace the snapshot with a freshly fetched listing.
    pub async fn store(&self, runtimes: Arc<Vec<Runtime>>) {
        let mut snapshot = self.snapshot.write().await;
        *snapshot = Some(Snapshot {
            runtimes,
            stored_at: Instant::now(),
        });
    }

    pub async fn clear(&self) {
        self.snapshot.write().await.take();
    }
}
