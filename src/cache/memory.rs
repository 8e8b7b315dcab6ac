// ABOUTME: In-memory response cache with LRU eviction and TTL support
// ABOUTME: Includes an optional background task sweeping expired entries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{CacheConfig, ResponseCache};
use crate::constants::cache::{DEFAULT_MAX_ENTRIES, MAX_TTL_SECS};
use crate::errors::AppResult;
use crate::models::{ObservationKey, ProviderResult};
use async_trait::async_trait;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, warn};

/// Cached provider result with expiration
#[derive(Debug, Clone)]
struct CacheEntry {
    data: Vec<u8>,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(data: Vec<u8>, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: expiry_after(ttl),
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    fn remaining_ttl(&self) -> Option<Duration> {
        self.expires_at.checked_duration_since(Instant::now())
    }
}

/// Expiry instant for `ttl`, capped at the longest accepted TTL
fn expiry_after(ttl: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(ttl.min(Duration::from_secs(MAX_TTL_SECS)))
        .unwrap_or(now)
}

type Store = Arc<RwLock<LruCache<String, CacheEntry>>>;

/// In-memory cache with LRU eviction and background cleanup
///
/// Expiry and eviction are independent: an entry leaves either when its TTL
/// passes (lazily on read, or by the sweep task) or when it is the least
/// recently used entry and the cache is full.
#[derive(Clone)]
pub struct InMemoryCache {
    store: Store,
    default_ttl: Duration,
    shutdown_tx: Option<Arc<mpsc::Sender<()>>>,
}

impl InMemoryCache {
    const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(DEFAULT_MAX_ENTRIES) {
        Some(n) => n,
        None => NonZeroUsize::MIN,
    };

    /// Create a cache, spawning the sweep task when enabled and a runtime is available
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(Self::DEFAULT_CAPACITY);
        let store: Store = Arc::new(RwLock::new(LruCache::new(capacity)));

        let shutdown_tx = if config.enable_background_cleanup {
            Self::spawn_cleanup(&store, config.cleanup_interval)
        } else {
            None
        };

        Self {
            store,
            default_ttl: config.ttl,
            shutdown_tx,
        }
    }

    fn spawn_cleanup(store: &Store, cleanup_interval: Duration) -> Option<Arc<mpsc::Sender<()>>> {
        let Ok(runtime) = Handle::try_current() else {
            warn!("No Tokio runtime available, response cache sweep disabled");
            return None;
        };

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let store = Arc::clone(store);
        runtime.spawn(async move {
            // interval() rejects a zero period
            let period = cleanup_interval
                .clamp(Duration::from_millis(1), Duration::from_secs(MAX_TTL_SECS));
            let mut interval = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        Self::cleanup_expired(&store).await;
                    }
                    _ = shutdown_rx.recv() => {
                        debug!("Response cache sweep received shutdown signal");
                        break;
                    }
                }
            }
        });

        Some(Arc::new(shutdown_tx))
    }

    /// TTL configured for this cache
    #[must_use]
    pub const fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Number of stored entries, including expired ones not yet swept
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    /// Whether the cache holds no entries
    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    async fn cleanup_expired(store: &Store) {
        let mut guard = store.write().await;

        let expired: Vec<String> = guard
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            guard.pop(key);
        }
        drop(guard);

        if !expired.is_empty() {
            debug!(removed = expired.len(), "Swept expired response cache entries");
        }
    }
}

#[async_trait]
impl ResponseCache for InMemoryCache {
    async fn get(&self, key: &ObservationKey) -> AppResult<Option<ProviderResult>> {
        // LruCache::get updates recency, so even reads take the write lock
        let mut store = self.store.write().await;

        let Some(entry) = store.get(key.as_str()) else {
            return Ok(None);
        };
        if entry.is_expired() {
            store.pop(key.as_str());
            return Ok(None);
        }

        let result = serde_json::from_slice(&entry.data)?;
        drop(store);
        Ok(Some(result))
    }

    async fn put(
        &self,
        key: &ObservationKey,
        result: &ProviderResult,
        ttl: Duration,
    ) -> AppResult<()> {
        let entry = CacheEntry::new(serde_json::to_vec(result)?, ttl);
        self.store.write().await.push(key.as_str().to_owned(), entry);
        Ok(())
    }

    async fn invalidate(&self, key: &ObservationKey) -> AppResult<()> {
        self.store.write().await.pop(key.as_str());
        Ok(())
    }

    async fn ttl(&self, key: &ObservationKey) -> AppResult<Option<Duration>> {
        let store = self.store.read().await;
        // peek leaves LRU order untouched
        Ok(store
            .peek(key.as_str())
            .filter(|entry| !entry.is_expired())
            .and_then(CacheEntry::remaining_ttl))
    }

    async fn health_check(&self) -> AppResult<()> {
        Ok(())
    }

    async fn clear_all(&self) -> AppResult<()> {
        self.store.write().await.clear();
        Ok(())
    }
}

impl Drop for InMemoryCache {
    fn drop(&mut self) {
        // Clones share the sender; only the last one stops the sweep
        if let Some(tx) = self.shutdown_tx.take() {
            if let Ok(tx) = Arc::try_unwrap(tx) {
                if let Err(e) = tx.try_send(()) {
                    debug!(error = ?e, "Response cache shutdown signal not delivered");
                }
            }
        }
    }
}
