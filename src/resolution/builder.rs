// ABOUTME: Builder assembling resolution chains, cache, and personalization store into a resolver
// ABOUTME: Validates that each provider is placed in the chain of its observation kind
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::chain::{ChainStage, FallbackPolicy, ResolutionChain};
use super::resolver::{NutritionResolver, ResolverSettings};
use crate::cache::{CacheConfig, InMemoryCache, ResponseCache};
use crate::constants::resolution::{DEFAULT_PROVIDER_TIMEOUT_MS, DEFAULT_REQUEST_BUDGET_MS};
use crate::errors::{AppError, AppResult};
use crate::models::ObservationKind;
use crate::personalization::{InMemoryPortionStore, PortionStore};
use crate::providers::{CircuitBreakerConfig, NutritionProvider};
use std::sync::Arc;
use std::time::Duration;

/// Stage awaiting a circuit breaker configuration
struct PendingStage {
    provider: Arc<dyn NutritionProvider>,
    policy: FallbackPolicy,
}

/// Builder for [`NutritionResolver`]
///
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use nutrition_pipeline::providers::{OpenFoodFactsConfig, OpenFoodFactsProvider};
/// # use nutrition_pipeline::NutritionResolver;
/// # fn example() -> Result<(), nutrition_pipeline::errors::AppError> {
/// let resolver = NutritionResolver::builder()
///     .barcode_stage(Arc::new(OpenFoodFactsProvider::new(OpenFoodFactsConfig::default())))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ResolverBuilder {
    photo: Vec<PendingStage>,
    barcode: Vec<PendingStage>,
    cache: Option<Arc<dyn ResponseCache>>,
    store: Option<Arc<dyn PortionStore>>,
    breaker: CircuitBreakerConfig,
    settings: ResolverSettings,
}

impl Default for ResolverBuilder {
    fn default() -> Self {
        let cache = CacheConfig::default();
        Self {
            photo: Vec::new(),
            barcode: Vec::new(),
            cache: None,
            store: None,
            breaker: CircuitBreakerConfig::default(),
            settings: ResolverSettings {
                provider_timeout: Duration::from_millis(DEFAULT_PROVIDER_TIMEOUT_MS),
                cache_ttl: cache.ttl,
                request_budget: Duration::from_millis(DEFAULT_REQUEST_BUDGET_MS),
            },
        }
    }
}

impl NutritionResolver {
    /// Start building a resolver
    #[must_use]
    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::default()
    }
}

impl ResolverBuilder {
    /// Append a photo stage that runs whenever reached
    #[must_use]
    pub fn photo_stage(mut self, provider: Arc<dyn NutritionProvider>) -> Self {
        self.photo.push(PendingStage {
            provider,
            policy: FallbackPolicy::Always,
        });
        self
    }

    /// Append a photo stage that runs only after a timeout or malformed response
    #[must_use]
    pub fn photo_fallback(mut self, provider: Arc<dyn NutritionProvider>) -> Self {
        self.photo.push(PendingStage {
            provider,
            policy: FallbackPolicy::OnTransportFailure,
        });
        self
    }

    /// Append a barcode stage
    #[must_use]
    pub fn barcode_stage(mut self, provider: Arc<dyn NutritionProvider>) -> Self {
        self.barcode.push(PendingStage {
            provider,
            policy: FallbackPolicy::Always,
        });
        self
    }

    /// Use a specific response cache
    #[must_use]
    pub fn cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Use a specific personalization store
    #[must_use]
    pub fn personalization(mut self, store: Arc<dyn PortionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Circuit breaker settings applied to every stage
    #[must_use]
    pub fn circuit_breaker(mut self, config: CircuitBreakerConfig) -> Self {
        self.breaker = config;
        self
    }

    /// Upper bound for a single provider call
    #[must_use]
    pub fn provider_timeout(mut self, timeout: Duration) -> Self {
        self.settings.provider_timeout = timeout;
        self
    }

    /// TTL for results written to the response cache
    #[must_use]
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.settings.cache_ttl = ttl;
        self
    }

    /// Budget used by `resolve_default`
    #[must_use]
    pub fn request_budget(mut self, budget: Duration) -> Self {
        self.settings.request_budget = budget;
        self
    }

    /// Build the resolver
    ///
    /// Without an explicit cache or store, in-memory ones are used; the
    /// default cache has no background sweep so it can be built outside a runtime.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if a provider is placed in the chain of the
    /// other observation kind
    pub fn build(self) -> AppResult<NutritionResolver> {
        let photo = Self::chain(ObservationKind::Photo, self.photo, &self.breaker)?;
        let barcode = Self::chain(ObservationKind::Barcode, self.barcode, &self.breaker)?;

        let cache = self.cache.unwrap_or_else(|| {
            Arc::new(InMemoryCache::new(CacheConfig {
                ttl: self.settings.cache_ttl,
                enable_background_cleanup: false,
                ..CacheConfig::default()
            }))
        });
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryPortionStore::new()));

        Ok(NutritionResolver::from_parts(
            photo,
            barcode,
            cache,
            store,
            self.settings,
        ))
    }

    fn chain(
        kind: ObservationKind,
        pending: Vec<PendingStage>,
        breaker: &CircuitBreakerConfig,
    ) -> AppResult<ResolutionChain> {
        let mut stages = Vec::with_capacity(pending.len());
        for (position, stage) in pending.into_iter().enumerate() {
            let provider_kind = stage.provider.observation_kind();
            if provider_kind != kind {
                return Err(AppError::config(format!(
                    "provider '{}' resolves {provider_kind} observations but was added to the {kind} chain",
                    stage.provider.name()
                )));
            }
            // A chain cannot open with a failure-only stage
            let policy = if position == 0 {
                FallbackPolicy::Always
            } else {
                stage.policy
            };
            stages.push(ChainStage::new(stage.provider, policy, breaker.clone()));
        }
        Ok(ResolutionChain::new(kind, stages))
    }
}
