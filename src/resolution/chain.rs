// ABOUTME: Ordered provider stages for one observation kind, each guarded by a circuit breaker
// ABOUTME: Precedence is fixed at construction and read-only while resolving
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::FailureKind;
use crate::models::{Observation, ObservationKind};
use crate::providers::{CircuitBreaker, CircuitBreakerConfig, CircuitState, NutritionProvider};
use std::sync::Arc;

/// When a stage is eligible to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Run whenever the chain reaches this stage
    Always,
    /// Run only if the previous called stage timed out, returned a malformed
    /// response, or was skipped with an open circuit
    OnTransportFailure,
}

impl FallbackPolicy {
    /// Whether a failure of the previous stage arms an `OnTransportFailure` stage
    #[must_use]
    pub const fn arms_fallback(kind: FailureKind) -> bool {
        matches!(kind, FailureKind::Timeout | FailureKind::MalformedResponse)
    }
}

/// One provider position in a resolution chain
pub struct ChainStage {
    provider: Arc<dyn NutritionProvider>,
    policy: FallbackPolicy,
    breaker: CircuitBreaker,
}

impl ChainStage {
    /// Create a stage with its own circuit breaker
    #[must_use]
    pub fn new(
        provider: Arc<dyn NutritionProvider>,
        policy: FallbackPolicy,
        breaker_config: CircuitBreakerConfig,
    ) -> Self {
        let breaker = CircuitBreaker::with_config(provider.name(), breaker_config);
        Self {
            provider,
            policy,
            breaker,
        }
    }

    /// Provider name
    #[must_use]
    pub fn name(&self) -> &str {
        self.provider.name()
    }

    /// Adapter behind this stage
    #[must_use]
    pub fn provider(&self) -> &Arc<dyn NutritionProvider> {
        &self.provider
    }

    /// Eligibility policy
    #[must_use]
    pub const fn policy(&self) -> FallbackPolicy {
        self.policy
    }

    /// Circuit breaker shared by every request using this stage
    #[must_use]
    pub const fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Whether the adapter is authoritative for this observation
    #[must_use]
    pub fn supports(&self, observation: &Observation) -> bool {
        self.provider.supports_region(observation)
    }
}

/// Fixed-precedence chain of stages for one observation kind
pub struct ResolutionChain {
    kind: ObservationKind,
    stages: Vec<ChainStage>,
}

impl ResolutionChain {
    /// Create a chain; stages run in the given order
    #[must_use]
    pub const fn new(kind: ObservationKind, stages: Vec<ChainStage>) -> Self {
        Self { kind, stages }
    }

    /// Observation kind this chain resolves
    #[must_use]
    pub const fn kind(&self) -> ObservationKind {
        self.kind
    }

    /// Stage at a precedence position
    #[must_use]
    pub fn stage(&self, index: usize) -> Option<&ChainStage> {
        self.stages.get(index)
    }

    /// Number of stages
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the chain has no stages
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Provider names in precedence order
    #[must_use]
    pub fn provider_names(&self) -> Vec<&str> {
        self.stages.iter().map(ChainStage::name).collect()
    }

    /// Circuit state of a provider in this chain
    #[must_use]
    pub fn circuit_state(&self, provider: &str) -> Option<CircuitState> {
        self.stages
            .iter()
            .find(|stage| stage.name() == provider)
            .map(|stage| stage.breaker.state())
    }
}
