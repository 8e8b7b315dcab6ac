// ABOUTME: Regional packaged-goods dataset adapter, authoritative for configured GS1 prefixes
// ABOUTME: Reports per-serving values with confidence based on the record's verification flag
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::adapter::NutritionProvider;
use crate::constants::{gs1, providers, rate_limits};
use crate::errors::{AdapterResult, ProviderError};
use crate::http_client::{fetch_json, path_code, shared_client};
use crate::models::{Macros, Observation, ObservationKind, ProviderResult};
use crate::rate_limiter::RateLimiter;
use crate::region::RegionFilter;
use crate::wire::{lenient_f64, non_empty};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

/// Confidence for records reviewed by the dataset maintainers
const VERIFIED_CONFIDENCE: f64 = 0.9;
/// Confidence for crowd-submitted records
const UNVERIFIED_CONFIDENCE: f64 = 0.6;

/// Regional dataset configuration
#[derive(Debug, Clone)]
pub struct RegionalDatasetConfig {
    /// API base URL
    pub base_url: String,
    /// API key sent as `x-api-key` (optional for public mirrors)
    pub api_key: Option<String>,
    /// GS1 prefixes this dataset is authoritative for
    pub region: RegionFilter,
    /// Client-side limit on calls per minute (0 disables)
    pub rate_limit_per_minute: u32,
}

impl Default for RegionalDatasetConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8090/v1".to_owned(),
            api_key: None,
            region: RegionFilter::from_ranges(vec![gs1::INDIA_PREFIX..=gs1::INDIA_PREFIX]),
            rate_limit_per_minute: rate_limits::REGIONAL_DATASET_PER_MINUTE,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RegionalProduct {
    name: Option<String>,
    brand: Option<String>,
    category: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    serving_size_g: Option<f64>,
    #[serde(default)]
    verified: bool,
    nutrition: Option<PerServing>,
}

#[derive(Debug, Deserialize)]
struct PerServing {
    #[serde(default, deserialize_with = "lenient_f64")]
    energy_kcal: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    protein_g: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    carbohydrate_g: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    fat_g: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    fiber_g: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    sugar_g: Option<f64>,
}

/// Regional packaged-goods dataset adapter
pub struct RegionalDatasetProvider {
    config: RegionalDatasetConfig,
    client: Client,
    limiter: RateLimiter,
}

impl RegionalDatasetProvider {
    /// Create an adapter using the shared HTTP client
    #[must_use]
    pub fn new(config: RegionalDatasetConfig) -> Self {
        Self::with_client(config, shared_client().clone())
    }

    /// Create an adapter with a specific HTTP client
    #[must_use]
    pub fn with_client(config: RegionalDatasetConfig, client: Client) -> Self {
        let limiter = RateLimiter::per_minute(config.rate_limit_per_minute);
        Self {
            config,
            client,
            limiter,
        }
    }

    fn convert(code: &str, product: RegionalProduct) -> AdapterResult<ProviderResult> {
        let name = providers::REGIONAL_DATASET;
        let nutrition = product
            .nutrition
            .ok_or_else(|| ProviderError::malformed(name, "record has no nutrition block"))?;
        let calories = nutrition
            .energy_kcal
            .ok_or_else(|| ProviderError::malformed(name, "record has no energy_kcal"))?;

        Ok(ProviderResult {
            dish_name: non_empty(product.name)
                .or_else(|| non_empty(product.brand))
                .unwrap_or_else(|| code.to_owned()),
            category: non_empty(product.category),
            portion_grams: product.serving_size_g,
            macros: Macros {
                calories,
                protein_g: nutrition.protein_g,
                carbs_g: nutrition.carbohydrate_g,
                fat_g: nutrition.fat_g,
                fiber_g: nutrition.fiber_g,
                sugar_g: nutrition.sugar_g,
            },
            ingredients: Vec::new(),
            confidence: if product.verified {
                VERIFIED_CONFIDENCE
            } else {
                UNVERIFIED_CONFIDENCE
            },
            provider: name.to_owned(),
        })
    }
}

#[async_trait]
impl NutritionProvider for RegionalDatasetProvider {
    fn name(&self) -> &str {
        providers::REGIONAL_DATASET
    }

    fn observation_kind(&self) -> ObservationKind {
        ObservationKind::Barcode
    }

    fn supports_region(&self, observation: &Observation) -> bool {
        self.config.region.matches(observation)
    }

    #[instrument(skip(self, observation), fields(provider = providers::REGIONAL_DATASET, code = %observation.reference()))]
    async fn resolve(&self, observation: &Observation) -> AdapterResult<ProviderResult> {
        let name = providers::REGIONAL_DATASET;
        let Observation::Barcode { code } = observation else {
            return Err(ProviderError::not_found(name, observation.reference()));
        };

        let code = path_code(name, code)?;
        self.limiter.acquire(name).await?;

        let url = format!(
            "{}/products/{code}",
            self.config.base_url.trim_end_matches('/')
        );
        let mut request = self.client.get(url);
        if let Some(key) = &self.config.api_key {
            request = request.header("x-api-key", key);
        }

        let product: RegionalProduct = fetch_json(name, code, request).await?;
        Self::convert(code, product)
    }
}
