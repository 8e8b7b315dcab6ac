// ABOUTME: Response cache abstraction placed in front of the provider adapters
// ABOUTME: Keys derive from observation content only, so entries are shared across users
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// In-memory cache implementation
pub mod memory;

use crate::constants::cache::{
    DEFAULT_CLEANUP_INTERVAL_SECS, DEFAULT_MAX_ENTRIES, DEFAULT_TTL_SECS,
};
use crate::errors::AppResult;
use crate::models::{ObservationKey, ProviderResult};
use std::env;
use std::time::Duration;

pub use memory::InMemoryCache;

/// Cache of raw (un-personalized) provider results
///
/// The orchestrator treats every error from this trait as a miss, so a
/// failing backend slows resolution down but never breaks it.
///
/// # Examples
///
/// ```rust,no_run
/// use nutrition_pipeline::cache::{CacheConfig, InMemoryCache, ResponseCache};
/// use nutrition_pipeline::models::Observation;
/// # async fn example(result: nutrition_pipeline::models::ProviderResult)
/// #     -> Result<(), nutrition_pipeline::errors::AppError> {
/// let cache = InMemoryCache::new(CacheConfig {
///     enable_background_cleanup: false,
///     ..Default::default()
/// });
///
/// let key = Observation::barcode("8901234567890").cache_key();
/// cache.put(&key, &result, cache.default_ttl()).await?;
/// assert!(cache.get(&key).await?.is_some());
/// # Ok(())
/// # }
/// ```
#[async_trait::async_trait]
pub trait ResponseCache: Send + Sync {
    /// Retrieve an unexpired entry
    ///
    /// # Errors
    ///
    /// Returns an error if the stored entry cannot be decoded
    async fn get(&self, key: &ObservationKey) -> AppResult<Option<ProviderResult>>;

    /// Store a result with the given time-to-live
    ///
    /// Concurrent puts for the same key are a harmless overwrite.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or storage fails
    async fn put(&self, key: &ObservationKey, result: &ProviderResult, ttl: Duration)
        -> AppResult<()>;

    /// Remove a single entry
    ///
    /// # Errors
    ///
    /// Returns an error if invalidation fails
    async fn invalidate(&self, key: &ObservationKey) -> AppResult<()>;

    /// Remaining time-to-live of an entry
    ///
    /// # Errors
    ///
    /// Returns an error if the TTL check fails
    async fn ttl(&self, key: &ObservationKey) -> AppResult<Option<Duration>>;

    /// Verify the cache backend is usable
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unhealthy
    async fn health_check(&self) -> AppResult<()>;

    /// Remove every entry
    ///
    /// # Errors
    ///
    /// Returns an error if the clear operation fails
    async fn clear_all(&self) -> AppResult<()>;
}

/// Response cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached observations before LRU eviction
    pub max_entries: usize,
    /// Time-to-live applied by the orchestrator when it stores a result
    pub ttl: Duration,
    /// Interval between expired-entry sweeps
    pub cleanup_interval: Duration,
    /// Run the background sweep task (needs a Tokio runtime at construction)
    pub enable_background_cleanup: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            cleanup_interval: Duration::from_secs(DEFAULT_CLEANUP_INTERVAL_SECS),
            enable_background_cleanup: true,
        }
    }
}

impl CacheConfig {
    /// Load cache configuration from environment
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            max_entries: env::var("CACHE_MAX_ENTRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_ENTRIES),
            ttl: Duration::from_secs(
                env::var("CACHE_TTL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_TTL_SECS),
            ),
            cleanup_interval: Duration::from_secs(
                env::var("CACHE_CLEANUP_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_CLEANUP_INTERVAL_SECS),
            ),
            enable_background_cleanup: env::var("CACHE_BACKGROUND_CLEANUP")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
        }
    }
}
