use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::time::Instant;

/// A generated resume held in memory.
#[derive(Debug, Clone)]
pub struct CachedArtifact {
    pub bytes: Bytes,
    /// Monotonic timestamp used for TTL checks.
    pub stored_at: Instant,
    /// Wall-clock generation time, reported as `Last-Modified`.
    pub generated_at: DateTime<Utc>,
}

/// Single-slot, time-bounded cache for the generated resume.
///
/// There is no invalidation hook: content edits show up once the TTL lapses.
/// Concurrent misses may both regenerate; the last store wins.
pub struct ArtifactCache {
    ttl: Duration,
    slot: RwLock<Option<CachedArtifact>>,
}

impl ArtifactCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: RwLock::new(None),
        }
    }

    /// Returns the cached artifact if it is younger than the TTL.
    pub async fn fresh(&self) -> Option<CachedArtifact> {
        let slot = self.slot.read().await;
        slot.as_ref()
            .filter(|artifact| artifact.stored_at.elapsed() < self.ttl)
            .cloned()
    }

    pub async fn store(&self, bytes: Bytes) -> CachedArtifact {
        let artifact = CachedArtifact {
            bytes,
            stored_at: Instant::now(),
            generated_at: Utc::now(),
        };
        *self.slot.write().await = Some(artifact.clone());
        artifact
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_empty_cache_misses() {
        let cache = ArtifactCache::new(Duration::from_secs(60));
        assert!(cache.fresh().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hit_within_ttl() {
        let cache = ArtifactCache::new(Duration::from_secs(900));
        cache.store(Bytes::from_static(b"%PDF-1")).await;
        tokio::time::advance(Duration::from_secs(899)).await;
        let hit = cache.fresh().await.expect("should still be fresh");
        assert_eq!(hit.bytes, Bytes::from_static(b"%PDF-1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expires_at_ttl() {
        let cache = ArtifactCache::new(Duration::from_secs(900));
        cache.store(Bytes::from_static(b"%PDF-1")).await;
        tokio::time::advance(Duration::from_secs(900)).await;
        assert!(cache.fresh().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_replaces_previous_entry() {
        let cache = ArtifactCache::new(Duration::from_secs(900));
        cache.store(Bytes::from_static(b"old")).await;
        tokio::time::advance(Duration::from_secs(1000)).await;
        cache.store(Bytes::from_static(b"new")).await;
        assert_eq!(cache.fresh().await.unwrap().bytes, Bytes::from_static(b"new"));
    }
}
