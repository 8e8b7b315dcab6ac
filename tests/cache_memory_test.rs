// ABOUTME: Unit tests for the in-memory response cache
// ABOUTME: Tests TTL expiry, LRU eviction, invalidation, and background cleanup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod helpers;

use anyhow::Result;
use helpers::result;
use nutrition_pipeline::cache::{CacheConfig, InMemoryCache, ResponseCache};
use nutrition_pipeline::models::{Observation, ObservationKey};
use std::time::Duration;

fn key(code: &str) -> ObservationKey {
    Observation::barcode(code).cache_key()
}

/// Helper: in-memory cache without the sweep task
fn create_test_cache(max_entries: usize) -> InMemoryCache {
    InMemoryCache::new(CacheConfig {
        max_entries,
        enable_background_cleanup: false,
        ..CacheConfig::default()
    })
}

#[tokio::test]
async fn test_cache_put_and_get() -> Result<()> {
    let cache = create_test_cache(10);
    let stored = result("off", "good day cookies", 75.0, 0.9);

    cache.put(&key("8901063017832"), &stored, Duration::from_secs(60)).await?;

    assert_eq!(cache.get(&key("8901063017832")).await?, Some(stored));
    assert_eq!(cache.get(&key("8901063017849")).await?, None);
    Ok(())
}

#[tokio::test]
async fn test_cache_expiration() -> Result<()> {
    let cache = create_test_cache(10);
    let entry = key("8901063017832");

    cache
        .put(&entry, &result("off", "expires", 10.0, 0.9), Duration::from_millis(100))
        .await?;
    assert!(cache.get(&entry).await?.is_some());

    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(cache.get(&entry).await?, None);
    assert_eq!(cache.ttl(&entry).await?, None);
    // Expired entries are dropped when read
    assert!(cache.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn test_cache_ttl() -> Result<()> {
    let cache = create_test_cache(10);
    let entry = key("8901063017832");

    cache
        .put(&entry, &result("off", "ttl", 10.0, 0.9), Duration::from_secs(10))
        .await?;

    let ttl = cache.ttl(&entry).await?.expect("entry has a ttl");
    assert!(ttl <= Duration::from_secs(10));
    assert!(ttl >= Duration::from_secs(9));
    assert_eq!(cache.ttl(&key("0000")).await?, None);
    Ok(())
}

#[tokio::test]
async fn test_cache_huge_ttl_is_capped() -> Result<()> {
    let cache = create_test_cache(10);
    let entry = key("8901063017832");
    let stored = result("off", "forever", 10.0, 0.9);

    cache.put(&entry, &stored, Duration::MAX).await?;

    assert_eq!(cache.get(&entry).await?, Some(stored));
    let remaining = cache.ttl(&entry).await?.expect("entry has a ttl");
    assert!(remaining <= Duration::from_secs(365 * 24 * 60 * 60));
    assert!(remaining > Duration::from_secs(364 * 24 * 60 * 60));
    Ok(())
}

#[tokio::test]
async fn test_cache_invalidate() -> Result<()> {
    let cache = create_test_cache(10);
    let entry = key("8901063017832");

    cache
        .put(&entry, &result("off", "delete me", 10.0, 0.9), Duration::from_secs(60))
        .await?;
    cache.invalidate(&entry).await?;

    assert_eq!(cache.get(&entry).await?, None);
    Ok(())
}

#[tokio::test]
async fn test_cache_lru_eviction() -> Result<()> {
    let cache = create_test_cache(2);
    let ttl = Duration::from_secs(60);

    cache.put(&key("1"), &result("off", "one", 10.0, 0.9), ttl).await?;
    cache.put(&key("2"), &result("off", "two", 10.0, 0.9), ttl).await?;
    // Touch "1" so "2" becomes least recently used
    assert!(cache.get(&key("1")).await?.is_some());
    cache.put(&key("3"), &result("off", "three", 10.0, 0.9), ttl).await?;

    assert_eq!(cache.len().await, 2);
    assert!(cache.get(&key("1")).await?.is_some());
    assert_eq!(cache.get(&key("2")).await?, None);
    assert!(cache.get(&key("3")).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn test_cache_overwrite_is_harmless() -> Result<()> {
    let cache = create_test_cache(10);
    let entry = key("8901063017832");
    let stored = result("off", "same", 20.0, 0.9);

    cache.put(&entry, &stored, Duration::from_secs(60)).await?;
    cache.put(&entry, &stored, Duration::from_secs(60)).await?;

    assert_eq!(cache.len().await, 1);
    assert_eq!(cache.get(&entry).await?, Some(stored));
    Ok(())
}

#[tokio::test]
async fn test_cache_clear_all() -> Result<()> {
    let cache = create_test_cache(10);
    for code in ["1", "2", "3"] {
        cache
            .put(&key(code), &result("off", code, 10.0, 0.9), Duration::from_secs(60))
            .await?;
    }

    cache.clear_all().await?;

    assert!(cache.is_empty().await);
    cache.health_check().await?;
    Ok(())
}

#[tokio::test]
async fn test_photo_and_barcode_keys_do_not_collide() -> Result<()> {
    let cache = create_test_cache(10);
    let photo = Observation::photo(b"8901063017832".to_vec()).cache_key();
    let barcode = key("8901063017832");

    cache
        .put(&barcode, &result("off", "packet", 10.0, 0.9), Duration::from_secs(60))
        .await?;

    assert_eq!(cache.get(&photo).await?, None);
    Ok(())
}

#[tokio::test]
async fn test_background_cleanup_sweeps_expired_entries() -> Result<()> {
    let cache = InMemoryCache::new(CacheConfig {
        max_entries: 10,
        cleanup_interval: Duration::from_millis(50),
        enable_background_cleanup: true,
        ..CacheConfig::default()
    });

    cache
        .put(&key("1"), &result("off", "short", 10.0, 0.9), Duration::from_millis(20))
        .await?;
    cache
        .put(&key("2"), &result("off", "long", 10.0, 0.9), Duration::from_secs(60))
        .await?;

    tokio::time::sleep(Duration::from_millis(200)).await;

    // Sweep removed the expired entry without a read
    assert_eq!(cache.len().await, 1);
    Ok(())
}

#[test]
fn test_cache_builds_without_runtime() {
    let cache = InMemoryCache::new(CacheConfig::default());
    assert_eq!(cache.default_ttl(), Duration::from_secs(30 * 60));
}
