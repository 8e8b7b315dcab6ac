// ABOUTME: Circuit breaker guarding each provider stage of a resolution chain
// ABOUTME: Skips providers that keep timing out or rate limiting until a recovery window passes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::atomic::{AtomicU32, AtomicU64, AtomicU8, Ordering};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::constants::resilience::{
    CIRCUIT_FAILURE_THRESHOLD, CIRCUIT_RECOVERY_SECS, CIRCUIT_SUCCESS_THRESHOLD,
};
use crate::errors::AdapterResult;

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation - calls pass through
    Closed,
    /// Provider is failing - calls are skipped
    Open,
    /// Recovery window elapsed - calls pass through until the next outcome decides
    HalfOpen,
}

impl CircuitState {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Closed,
            1 => Self::Open,
            _ => Self::HalfOpen,
        }
    }

    const fn to_u8(self) -> u8 {
        match self {
            Self::Closed => 0,
            Self::Open => 1,
            Self::HalfOpen => 2,
        }
    }
}

/// Configuration for circuit breaker behavior
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive unhealthy outcomes before the circuit opens
    pub failure_threshold: u32,
    /// How long an open circuit skips the provider
    pub recovery_timeout: Duration,
    /// Healthy outcomes in half-open state needed to close again
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: CIRCUIT_FAILURE_THRESHOLD,
            recovery_timeout: Duration::from_secs(CIRCUIT_RECOVERY_SECS),
            success_threshold: CIRCUIT_SUCCESS_THRESHOLD,
        }
    }
}

impl CircuitBreakerConfig {
    /// Create a new circuit breaker configuration
    #[must_use]
    pub const fn new(
        failure_threshold: u32,
        recovery_timeout: Duration,
        success_threshold: u32,
    ) -> Self {
        Self {
            failure_threshold,
            recovery_timeout,
            success_threshold,
        }
    }

    /// Configuration that never opens, for chains where skipping is undesirable
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            failure_threshold: u32::MAX,
            recovery_timeout: Duration::ZERO,
            success_threshold: 1,
        }
    }
}

/// Thread-safe circuit breaker for one provider
///
/// Shared by every concurrent resolution that uses the provider. Only
/// unhealthy failures (`RateLimited`, `Timeout`, `MalformedResponse`) count;
/// a `NotFound` is a healthy answer.
pub struct CircuitBreaker {
    provider_name: String,
    state: AtomicU8,
    failure_count: AtomicU32,
    success_count: AtomicU32,
    /// Millis since `start_instant` when the circuit last opened
    opened_at_ms: AtomicU64,
    config: CircuitBreakerConfig,
    start_instant: Instant,
}

impl CircuitBreaker {
    /// Create a circuit breaker with default configuration
    #[must_use]
    pub fn new(provider_name: &str) -> Self {
        Self::with_config(provider_name, CircuitBreakerConfig::default())
    }

    /// Create a circuit breaker with custom configuration
    #[must_use]
    pub fn with_config(provider_name: &str, config: CircuitBreakerConfig) -> Self {
        Self {
            provider_name: provider_name.to_owned(),
            state: AtomicU8::new(CircuitState::Closed.to_u8()),
            failure_count: AtomicU32::new(0),
            success_count: AtomicU32::new(0),
            opened_at_ms: AtomicU64::new(0),
            config,
            start_instant: Instant::now(),
        }
    }

    /// Current circuit state
    #[must_use]
    pub fn state(&self) -> CircuitState {
        CircuitState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Consecutive unhealthy outcomes in closed state
    #[must_use]
    pub fn failure_count(&self) -> u32 {
        self.failure_count.load(Ordering::SeqCst)
    }

    /// Whether the provider may be called now
    ///
    /// An open circuit whose recovery window has elapsed moves to half-open
    /// and lets the call through.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        match self.state() {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => self.try_half_open(),
        }
    }

    fn try_half_open(&self) -> bool {
        if self.millis_since_open() < self.recovery_ms() {
            return false;
        }
        let transitioned = self
            .state
            .compare_exchange(
                CircuitState::Open.to_u8(),
                CircuitState::HalfOpen.to_u8(),
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok();
        if transitioned {
            info!(
                provider = %self.provider_name,
                "Circuit breaker half-open, probing provider"
            );
        }
        // Another caller may have won the transition; half-open still allows calls
        true
    }

    /// Seconds until an open circuit lets calls through again
    #[must_use]
    pub fn secs_until_recovery(&self) -> u64 {
        if self.state() != CircuitState::Open {
            return 0;
        }
        self.recovery_ms()
            .saturating_sub(self.millis_since_open())
            .div_ceil(1000)
    }

    /// Record the outcome of a provider call
    pub fn record<T>(&self, outcome: &AdapterResult<T>) {
        match outcome {
            Err(error) if error.is_retryable() => self.record_failure(),
            _ => self.record_success(),
        }
    }

    /// Record a healthy outcome
    pub fn record_success(&self) {
        match self.state() {
            CircuitState::Closed => self.failure_count.store(0, Ordering::SeqCst),
            CircuitState::HalfOpen => {
                let successes = self.success_count.fetch_add(1, Ordering::SeqCst) + 1;
                if successes >= self.config.success_threshold {
                    self.close();
                    info!(
                        provider = %self.provider_name,
                        "Circuit breaker closed, provider recovered"
                    );
                }
            }
            CircuitState::Open => {}
        }
    }

    /// Record an unhealthy outcome
    pub fn record_failure(&self) {
        match self.state() {
            CircuitState::Closed => {
                let failures = self.failure_count.fetch_add(1, Ordering::SeqCst) + 1;
                if failures >= self.config.failure_threshold {
                    self.open();
                    warn!(
                        provider = %self.provider_name,
                        failures,
                        recovery_timeout_secs = self.config.recovery_timeout.as_secs(),
                        "Circuit breaker opened, provider failing"
                    );
                }
            }
            CircuitState::HalfOpen => {
                self.open();
                warn!(
                    provider = %self.provider_name,
                    "Circuit breaker re-opened, recovery probe failed"
                );
            }
            CircuitState::Open => {
                self.opened_at_ms
                    .store(self.elapsed_millis(), Ordering::SeqCst);
            }
        }
    }

    /// Force the circuit closed
    pub fn reset(&self) {
        self.close();
    }

    fn open(&self) {
        self.opened_at_ms
            .store(self.elapsed_millis(), Ordering::SeqCst);
        self.success_count.store(0, Ordering::SeqCst);
        self.state
            .store(CircuitState::Open.to_u8(), Ordering::SeqCst);
    }

    fn close(&self) {
        self.failure_count.store(0, Ordering::SeqCst);
        self.success_count.store(0, Ordering::SeqCst);
        self.state
            .store(CircuitState::Closed.to_u8(), Ordering::SeqCst);
    }

    fn millis_since_open(&self) -> u64 {
        self.elapsed_millis()
            .saturating_sub(self.opened_at_ms.load(Ordering::SeqCst))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn recovery_ms(&self) -> u64 {
        self.config.recovery_timeout.as_millis() as u64
    }

    #[allow(clippy::cast_possible_truncation)]
    fn elapsed_millis(&self) -> u64 {
        self.start_instant.elapsed().as_millis() as u64
    }
}
