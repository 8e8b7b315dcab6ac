// ABOUTME: Adapter trait every nutrition provider implements
// ABOUTME: Normalizes provider responses into ProviderResult or a typed ProviderError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::AdapterResult;
use crate::models::{Observation, ObservationKind, ProviderResult};
use async_trait::async_trait;

/// A single external nutrition data source
///
/// Implementations do network I/O only: no caching, no persistence. Every
/// expected failure is returned as a [`crate::errors::ProviderError`] so the
/// orchestrator can advance to the next provider.
///
/// Futures returned by [`NutritionProvider::resolve`] must be cancel-safe: the
/// orchestrator drops them when a deadline elapses, which aborts the request.
#[async_trait]
pub trait NutritionProvider: Send + Sync {
    /// Stable provider name used in results, logs, and attempt traces
    fn name(&self) -> &str;

    /// Observation kind this provider understands
    fn observation_kind(&self) -> ObservationKind;

    /// Whether the provider is authoritative for this observation's region
    ///
    /// Barcode providers backed by regional datasets override this; the
    /// default accepts everything.
    fn supports_region(&self, _observation: &Observation) -> bool {
        true
    }

    /// Look up nutrition for an observation
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `RateLimited`, `Timeout` or `MalformedResponse`
    /// for the corresponding provider failure.
    async fn resolve(&self, observation: &Observation) -> AdapterResult<ProviderResult>;
}
