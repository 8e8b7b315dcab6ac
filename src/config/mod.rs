// ABOUTME: Environment-based configuration for the nutrition resolution pipeline
// ABOUTME: Composes cache, timing, resilience, HTTP client, and provider API settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration is read from environment variables only. Every setting has a
//! default from [`crate::constants`]; unparsable numeric values fall back to
//! the default, while structurally invalid values (a malformed GS1 prefix
//! list, a zero timeout) are reported as `ConfigInvalid`.

/// Provider API endpoints and credentials
pub mod api_providers;
/// Request timing and resilience settings
pub mod resolution;

pub use api_providers::ProviderApiConfig;
pub use resolution::{HttpClientConfig, ResilienceConfig, ResolutionConfig};

use crate::cache::CacheConfig;
use crate::constants::cache::MAX_TTL_SECS;
use crate::errors::{AppError, AppResult};
use std::env;
use std::time::Duration;
use tracing::info;

/// Complete pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Response cache settings
    pub cache: CacheConfig,
    /// Per-provider timeout and default request budget
    pub resolution: ResolutionConfig,
    /// Circuit breaker settings
    pub resilience: ResilienceConfig,
    /// Shared HTTP client timeouts
    pub http_client: HttpClientConfig,
    /// Provider endpoints and credentials
    pub providers: ProviderApiConfig,
}

impl PipelineConfig {
    /// Load the full configuration from environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if a value is structurally invalid
    pub fn from_env() -> AppResult<Self> {
        let config = Self {
            cache: CacheConfig::from_env(),
            resolution: ResolutionConfig::from_env(),
            resilience: ResilienceConfig::from_env(),
            http_client: HttpClientConfig::from_env(),
            providers: ProviderApiConfig::from_env()?,
        };
        config.validate()?;

        info!(
            cache_max_entries = config.cache.max_entries,
            cache_ttl_secs = config.cache.ttl.as_secs(),
            provider_timeout_ms = config.resolution.provider_timeout_ms,
            photo_providers = config.providers.photo_provider_count(),
            barcode_providers = config.providers.barcode_provider_count(),
            "Loaded pipeline configuration"
        );
        Ok(config)
    }

    /// Check cross-field constraints
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` describing the first violated constraint
    pub fn validate(&self) -> AppResult<()> {
        if self.resolution.provider_timeout_ms == 0 {
            return Err(AppError::config("PROVIDER_TIMEOUT_MS must be greater than zero"));
        }
        if self.resolution.request_budget_ms == 0 {
            return Err(AppError::config("REQUEST_BUDGET_MS must be greater than zero"));
        }
        if self.cache.max_entries == 0 {
            return Err(AppError::config("CACHE_MAX_ENTRIES must be greater than zero"));
        }
        if self.cache.ttl > Duration::from_secs(MAX_TTL_SECS) {
            return Err(AppError::config(format!(
                "CACHE_TTL_SECS must not exceed {MAX_TTL_SECS}"
            )));
        }
        if self.cache.cleanup_interval.is_zero()
            || self.cache.cleanup_interval > Duration::from_secs(MAX_TTL_SECS)
        {
            return Err(AppError::config(format!(
                "CACHE_CLEANUP_INTERVAL_SECS must be between 1 and {MAX_TTL_SECS}"
            )));
        }
        if self.resilience.enabled && self.resilience.failure_threshold == 0 {
            return Err(AppError::config(
                "CIRCUIT_BREAKER_FAILURE_THRESHOLD must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Environment variable or a default
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parsed environment variable or a default
fn env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Boolean flag that is on unless set to `false` or `0`
fn env_flag(key: &str, default: bool) -> bool {
    env::var(key).map_or(default, |v| v != "false" && v != "0")
}

/// Non-empty environment variable
fn env_non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
