// ABOUTME: Nutritionix branded-item adapter resolving UPC barcodes to per-serving nutrition
// ABOUTME: Authenticates with x-app-id / x-app-key headers and reads the first matched food
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::adapter::NutritionProvider;
use crate::constants::{providers, rate_limits};
use crate::errors::{AdapterResult, ProviderError};
use crate::http_client::{fetch_json, shared_client};
use crate::models::{Macros, Observation, ObservationKind, ProviderResult};
use crate::rate_limiter::RateLimiter;
use crate::wire::{lenient_f64, non_empty};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

/// Confidence of a branded UPC match with a gram weight
const MATCH_CONFIDENCE: f64 = 0.8;
/// Confidence when the serving has no gram weight
const UNWEIGHED_CONFIDENCE: f64 = 0.5;

/// Nutritionix configuration
#[derive(Debug, Clone)]
pub struct NutritionixConfig {
    /// API base URL
    pub base_url: String,
    /// Application id (`x-app-id`)
    pub app_id: String,
    /// Application key (`x-app-key`)
    pub app_key: String,
    /// Client-side limit on calls per minute (0 disables)
    pub rate_limit_per_minute: u32,
}

impl Default for NutritionixConfig {
    fn default() -> Self {
        Self {
            base_url: "https://trackapi.nutritionix.com".to_owned(),
            app_id: String::new(),
            app_key: String::new(),
            rate_limit_per_minute: rate_limits::NUTRITIONIX_PER_MINUTE,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ItemResponse {
    #[serde(default)]
    foods: Vec<BrandedFood>,
}

#[derive(Debug, Deserialize)]
struct BrandedFood {
    food_name: Option<String>,
    brand_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    serving_weight_grams: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    nf_calories: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    nf_protein: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    nf_total_carbohydrate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    nf_total_fat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    nf_dietary_fiber: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    nf_sugars: Option<f64>,
}

/// Nutritionix UPC lookup adapter
pub struct NutritionixProvider {
    config: NutritionixConfig,
    client: Client,
    limiter: RateLimiter,
}

impl NutritionixProvider {
    /// Create an adapter using the shared HTTP client
    #[must_use]
    pub fn new(config: NutritionixConfig) -> Self {
        Self::with_client(config, shared_client().clone())
    }

    /// Create an adapter with a specific HTTP client
    #[must_use]
    pub fn with_client(config: NutritionixConfig, client: Client) -> Self {
        let limiter = RateLimiter::per_minute(config.rate_limit_per_minute);
        Self {
            config,
            client,
            limiter,
        }
    }

    fn convert(code: &str, food: BrandedFood) -> AdapterResult<ProviderResult> {
        let name = providers::NUTRITIONIX;
        let calories = food
            .nf_calories
            .ok_or_else(|| ProviderError::malformed(name, "food has no nf_calories"))?;

        let item = non_empty(food.food_name).unwrap_or_else(|| code.to_owned());
        let brand = non_empty(food.brand_name);
        let dish_name = match &brand {
            Some(brand) if !item.starts_with(brand.as_str()) => format!("{brand} {item}"),
            _ => item,
        };
        let confidence = if food.serving_weight_grams.is_some() {
            MATCH_CONFIDENCE
        } else {
            UNWEIGHED_CONFIDENCE
        };

        Ok(ProviderResult {
            dish_name,
            category: brand,
            portion_grams: food.serving_weight_grams,
            macros: Macros {
                calories,
                protein_g: food.nf_protein,
                carbs_g: food.nf_total_carbohydrate,
                fat_g: food.nf_total_fat,
                fiber_g: food.nf_dietary_fiber,
                sugar_g: food.nf_sugars,
            },
            ingredients: Vec::new(),
            confidence,
            provider: name.to_owned(),
        })
    }
}

#[async_trait]
impl NutritionProvider for NutritionixProvider {
    fn name(&self) -> &str {
        providers::NUTRITIONIX
    }

    fn observation_kind(&self) -> ObservationKind {
        ObservationKind::Barcode
    }

    #[instrument(skip(self, observation), fields(provider = providers::NUTRITIONIX, code = %observation.reference()))]
    async fn resolve(&self, observation: &Observation) -> AdapterResult<ProviderResult> {
        let name = providers::NUTRITIONIX;
        let Observation::Barcode { code } = observation else {
            return Err(ProviderError::not_found(name, observation.reference()));
        };

        self.limiter.acquire(name).await?;

        let url = format!(
            "{}/v2/search/item",
            self.config.base_url.trim_end_matches('/')
        );
        let request = self
            .client
            .get(url)
            .query(&[("upc", code.as_str())])
            .header("x-app-id", &self.config.app_id)
            .header("x-app-key", &self.config.app_key);

        let response: ItemResponse = fetch_json(name, code, request).await?;
        let food = response
            .foods
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::not_found(name, code.as_str()))?;

        Self::convert(code, food)
    }
}
