// ABOUTME: Open Food Facts adapter for packaged-goods barcode lookups
// ABOUTME: Rescales per-100g nutriments to the declared serving and scores by data completeness
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Open Food Facts product lookups
//!
//! `GET {base_url}/api/v2/product/{code}.json`. Unknown products come back as
//! HTTP 200 with `status: 0`, which maps to `NotFound` like a 404 does.

use crate::adapter::NutritionProvider;
use crate::constants::{providers, rate_limits};
use crate::errors::{AdapterResult, ProviderError};
use crate::http_client::{fetch_json, path_code, shared_client};
use crate::models::{Macros, Observation, ObservationKind, ProviderResult};
use crate::rate_limiter::RateLimiter;
use crate::wire::{lenient_f64, non_empty};
use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

/// Portion used when a product declares no serving size
const DEFAULT_SERVING_GRAMS: f64 = 100.0;

/// kJ in one kcal
const KJ_PER_KCAL: f64 = 4.184;

/// Confidence floor for products that exist but have sparse data
const BASE_CONFIDENCE: f64 = 0.3;

/// Open Food Facts configuration
#[derive(Debug, Clone)]
pub struct OpenFoodFactsConfig {
    /// API base URL
    pub base_url: String,
    /// `User-Agent` sent with every request, as Open Food Facts asks of API clients
    pub user_agent: String,
    /// Client-side limit on calls per minute (0 disables)
    pub rate_limit_per_minute: u32,
}

impl Default for OpenFoodFactsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://world.openfoodfacts.org".to_owned(),
            user_agent: concat!("nutrition-pipeline/", env!("CARGO_PKG_VERSION")).to_owned(),
            rate_limit_per_minute: rate_limits::OPEN_FOOD_FACTS_PER_MINUTE,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProductResponse {
    #[serde(default)]
    status: i64,
    product: Option<Product>,
}

#[derive(Debug, Deserialize)]
struct Product {
    product_name: Option<String>,
    brands: Option<String>,
    categories: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    serving_quantity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    completeness: Option<f64>,
    #[serde(default)]
    nutriments: Nutriments,
}

#[derive(Debug, Default, Deserialize)]
struct Nutriments {
    #[serde(rename = "energy-kcal_100g", default, deserialize_with = "lenient_f64")]
    energy_kcal: Option<f64>,
    #[serde(rename = "energy_100g", default, deserialize_with = "lenient_f64")]
    energy_kj: Option<f64>,
    #[serde(rename = "proteins_100g", default, deserialize_with = "lenient_f64")]
    proteins: Option<f64>,
    #[serde(rename = "carbohydrates_100g", default, deserialize_with = "lenient_f64")]
    carbohydrates: Option<f64>,
    #[serde(rename = "fat_100g", default, deserialize_with = "lenient_f64")]
    fat: Option<f64>,
    #[serde(rename = "fiber_100g", default, deserialize_with = "lenient_f64")]
    fiber: Option<f64>,
    #[serde(rename = "sugars_100g", default, deserialize_with = "lenient_f64")]
    sugars: Option<f64>,
}

impl Nutriments {
    /// Energy per 100 g, converting from kJ when only that is reported
    fn kcal(&self) -> Option<f64> {
        self.energy_kcal
            .or_else(|| self.energy_kj.map(|kj| kj / KJ_PER_KCAL))
    }

    fn per_100g(&self) -> Option<Macros> {
        Some(Macros {
            calories: self.kcal()?,
            protein_g: self.proteins,
            carbs_g: self.carbohydrates,
            fat_g: self.fat,
            fiber_g: self.fiber,
            sugar_g: self.sugars,
        })
    }
}

/// Open Food Facts adapter
pub struct OpenFoodFactsProvider {
    config: OpenFoodFactsConfig,
    client: Client,
    limiter: RateLimiter,
}

impl OpenFoodFactsProvider {
    /// Create an adapter using the shared HTTP client
    #[must_use]
    pub fn new(config: OpenFoodFactsConfig) -> Self {
        Self::with_client(config, shared_client().clone())
    }

    /// Create an adapter with a specific HTTP client
    #[must_use]
    pub fn with_client(config: OpenFoodFactsConfig, client: Client) -> Self {
        let limiter = RateLimiter::per_minute(config.rate_limit_per_minute);
        Self {
            config,
            client,
            limiter,
        }
    }

    fn convert(code: &str, product: Product) -> AdapterResult<ProviderResult> {
        let name = providers::OPEN_FOOD_FACTS;
        let per_100g = product
            .nutriments
            .per_100g()
            .ok_or_else(|| ProviderError::malformed(name, "product has no energy value"))?;

        let dish_name = non_empty(product.product_name)
            .or_else(|| non_empty(product.brands))
            .unwrap_or_else(|| code.to_owned());
        let serving = product
            .serving_quantity
            .filter(|g| g.is_finite() && *g > 0.0)
            .unwrap_or(DEFAULT_SERVING_GRAMS);

        // completeness is 0..1; an entry with no completeness still exists
        let confidence = product
            .completeness
            .map_or(BASE_CONFIDENCE, |c| BASE_CONFIDENCE + (1.0 - BASE_CONFIDENCE) * c)
            .clamp(0.0, 1.0);

        Ok(ProviderResult {
            dish_name,
            category: product.categories.and_then(|c| {
                c.split(',')
                    .next()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned)
            }),
            portion_grams: Some(serving),
            macros: per_100g.scaled(serving / 100.0),
            ingredients: Vec::new(),
            confidence,
            provider: name.to_owned(),
        })
    }
}

#[async_trait]
impl NutritionProvider for OpenFoodFactsProvider {
    fn name(&self) -> &str {
        providers::OPEN_FOOD_FACTS
    }

    fn observation_kind(&self) -> ObservationKind {
        ObservationKind::Barcode
    }

    #[instrument(skip(self, observation), fields(provider = providers::OPEN_FOOD_FACTS, code = %observation.reference()))]
    async fn resolve(&self, observation: &Observation) -> AdapterResult<ProviderResult> {
        let name = providers::OPEN_FOOD_FACTS;
        let Observation::Barcode { code } = observation else {
            return Err(ProviderError::not_found(name, observation.reference()));
        };

        let code = path_code(name, code)?;
        self.limiter.acquire(name).await?;

        let url = format!(
            "{}/api/v2/product/{code}.json",
            self.config.base_url.trim_end_matches('/')
        );
        let request = self
            .client
            .get(url)
            .header(USER_AGENT, &self.config.user_agent);

        let response: ProductResponse = fetch_json(name, code, request).await?;
        match response.product {
            Some(product) if response.status == 1 => Self::convert(code, product),
            _ => Err(ProviderError::not_found(name, code)),
        }
    }
}
