// ABOUTME: Request timing, circuit breaker, and shared HTTP client configuration
// ABOUTME: Loaded from environment with defaults from the constants module
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{env_flag, env_parse_or};
use crate::constants::http::{CLIENT_CONNECT_TIMEOUT_SECS, CLIENT_TIMEOUT_SECS};
use crate::constants::resilience::{
    CIRCUIT_FAILURE_THRESHOLD, CIRCUIT_RECOVERY_SECS, CIRCUIT_SUCCESS_THRESHOLD,
};
use crate::constants::resolution::{DEFAULT_PROVIDER_TIMEOUT_MS, DEFAULT_REQUEST_BUDGET_MS};
use crate::providers::CircuitBreakerConfig;
use std::time::Duration;

/// Per-request timing
#[derive(Debug, Clone)]
pub struct ResolutionConfig {
    /// Upper bound for one provider call in milliseconds
    pub provider_timeout_ms: u64,
    /// Budget used when the caller does not pass a deadline
    pub request_budget_ms: u64,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            provider_timeout_ms: DEFAULT_PROVIDER_TIMEOUT_MS,
            request_budget_ms: DEFAULT_REQUEST_BUDGET_MS,
        }
    }
}

impl ResolutionConfig {
    /// Load timing configuration from environment
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            provider_timeout_ms: env_parse_or("PROVIDER_TIMEOUT_MS", DEFAULT_PROVIDER_TIMEOUT_MS),
            request_budget_ms: env_parse_or("REQUEST_BUDGET_MS", DEFAULT_REQUEST_BUDGET_MS),
        }
    }

    /// Provider timeout as a duration
    #[must_use]
    pub const fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }

    /// Request budget as a duration
    #[must_use]
    pub const fn request_budget(&self) -> Duration {
        Duration::from_millis(self.request_budget_ms)
    }
}

/// Circuit breaker settings applied to every chain stage
#[derive(Debug, Clone)]
pub struct ResilienceConfig {
    /// Whether stages may be skipped by an open circuit
    pub enabled: bool,
    /// Consecutive unhealthy outcomes before opening
    pub failure_threshold: u32,
    /// Seconds an open circuit skips its provider
    pub recovery_timeout_secs: u64,
    /// Healthy half-open outcomes needed to close
    pub success_threshold: u32,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            failure_threshold: CIRCUIT_FAILURE_THRESHOLD,
            recovery_timeout_secs: CIRCUIT_RECOVERY_SECS,
            success_threshold: CIRCUIT_SUCCESS_THRESHOLD,
        }
    }
}

impl ResilienceConfig {
    /// Load circuit breaker configuration from environment
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            enabled: env_flag("CIRCUIT_BREAKER_ENABLED", true),
            failure_threshold: env_parse_or(
                "CIRCUIT_BREAKER_FAILURE_THRESHOLD",
                CIRCUIT_FAILURE_THRESHOLD,
            ),
            recovery_timeout_secs: env_parse_or(
                "CIRCUIT_BREAKER_RECOVERY_SECS",
                CIRCUIT_RECOVERY_SECS,
            ),
            success_threshold: env_parse_or(
                "CIRCUIT_BREAKER_SUCCESS_THRESHOLD",
                CIRCUIT_SUCCESS_THRESHOLD,
            ),
        }
    }

    /// Breaker configuration for each stage
    #[must_use]
    pub const fn circuit_breaker(&self) -> CircuitBreakerConfig {
        if self.enabled {
            CircuitBreakerConfig::new(
                self.failure_threshold,
                Duration::from_secs(self.recovery_timeout_secs),
                self.success_threshold,
            )
        } else {
            CircuitBreakerConfig::disabled()
        }
    }
}

/// Shared HTTP client timeouts
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: CLIENT_TIMEOUT_SECS,
            connect_timeout_secs: CLIENT_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl HttpClientConfig {
    /// Load HTTP client configuration from environment
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            timeout_secs: env_parse_or("HTTP_CLIENT_TIMEOUT_SECS", CLIENT_TIMEOUT_SECS),
            connect_timeout_secs: env_parse_or(
                "HTTP_CLIENT_CONNECT_TIMEOUT_SECS",
                CLIENT_CONNECT_TIMEOUT_SECS,
            ),
        }
    }
}
