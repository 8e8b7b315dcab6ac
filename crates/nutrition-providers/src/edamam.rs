// ABOUTME: Edamam food database adapter resolving UPC barcodes through the parser endpoint
// ABOUTME: Converts per-100g nutrient codes to the product's "Serving" measure when one is listed
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

/// Label of the measure Edamam uses for one declared serving
const SERVING_MEASURE: &str = "Serving";

/// Confidence when a serving weight is known
const SERVING_CONFIDENCE: f64 = 0.7;
/// Confidence when only per-100 g values are known
const PER_100G_CONFIDENCE: f64 = 0.55;

/// Edamam configuration
#[derive(Debug, Clone)]
pub struct EdamamConfig {
    /// API base URL
    pub base_url: String,
    /// Application id (`app_id` query parameter)
    pub app_id: String,
    /// Application key (`app_key` query parameter)
    pub app_key: String,
    /// Client-side limit on calls per minute (0 disables)
    pub rate_limit_per_minute: u32,
}

impl Default for EdamamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.edamam.com".to_owned(),
            app_id: String::new(),
            app_key: String::new(),
            rate_limit_per_minute: rate_limits::EDAMAM_PER_MINUTE,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ParserResponse {
    #[serde(default)]
    hints: Vec<Hint>,
}

#[derive(Debug, Deserialize)]
struct Hint {
    food: EdamamFood,
    #[serde(default)]
    measures: Vec<Measure>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EdamamFood {
    label: Option<String>,
    brand: Option<String>,
    category: Option<String>,
    #[serde(default)]
    nutrients: Nutrients,
}

/// Edamam nutrient codes, all per 100 g
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct Nutrients {
    #[serde(default, deserialize_with = "lenient_f64")]
    enerc_kcal: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    procnt: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    chocdf: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    fat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    fibtg: Option<f64>,
    #[serde(rename = "SUGAR", default, deserialize_with = "lenient_f64")]
    sugar: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Measure {
    label: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    weight: Option<f64>,
}

/// Edamam food database adapter
pub struct EdamamProvider {
    config: EdamamConfig,
    client: Client,
    limiter: RateLimiter,
}

impl EdamamProvider {
    /// Create an adapter using the shared HTTP client
    #[must_use]
    pub fn new(config: EdamamConfig) -> Self {
        Self::with_client(config, shared_client().clone())
    }

    /// Create an adapter with a specific HTTP client
    #[must_use]
    pub fn with_client(config: EdamamConfig, client: Client) -> Self {
        let limiter = RateLimiter::per_minute(config.rate_limit_per_minute);
        Self {
            config,
            client,
            limiter,
        }
    }

    fn convert(code: &str, hint: Hint) -> AdapterResult<ProviderResult> {
        let name = providers::EDAMAM;
        let food = hint.food;
        let nutrients = &food.nutrients;
        let calories = nutrients
            .enerc_kcal
            .ok_or_else(|| ProviderError::malformed(name, "food has no ENERC_KCAL"))?;

        let serving = hint
            .measures
            .iter()
            .find(|m| m.label.as_deref() == Some(SERVING_MEASURE))
            .and_then(|m| m.weight)
            .filter(|g| g.is_finite() && *g > 0.0);

        let per_100g = Macros {
            calories,
            protein_g: nutrients.procnt,
            carbs_g: nutrients.chocdf,
            fat_g: nutrients.fat,
            fiber_g: nutrients.fibtg,
            sugar_g: nutrients.sugar,
        };
        let (portion, macros, confidence) = serving.map_or(
            (100.0, per_100g, PER_100G_CONFIDENCE),
            |grams| (grams, per_100g.scaled(grams / 100.0), SERVING_CONFIDENCE),
        );

        Ok(ProviderResult {
            dish_name: non_empty(food.label)
                .or_else(|| non_empty(food.brand))
                .unwrap_or_else(|| code.to_owned()),
            category: non_empty(food.category),
            portion_grams: Some(portion),
            macros,
            ingredients: Vec::new(),
            confidence,
            provider: name.to_owned(),
        })
    }
}

#[async_trait]
impl NutritionProvider for EdamamProvider {
    fn name(&self) -> &str {
        providers::EDAMAM
    }

    fn observation_kind(&self) -> ObservationKind {
        ObservationKind::Barcode
    }

    #[instrument(skip(self, observation), fields(provider = providers::EDAMAM, code = %observation.reference()))]
    async fn resolve(&self, observation: &Observation) -> AdapterResult<ProviderResult> {
        let name = providers::EDAMAM;
        let Observation::Barcode { code } = observation else {
            return Err(ProviderError::not_found(name, observation.reference()));
        };

        self.limiter.acquire(name).await?;

        let url = format!(
            "{}/api/food-database/v2/parser",
            self.config.base_url.trim_end_matches('/')
        );
        let request = self.client.get(url).query(&[
            ("upc", code.as_str()),
            ("app_id", self.config.app_id.as_str()),
            ("app_key", self.config.app_key.as_str()),
        ]);

        let response: ParserResponse = fetch_json(name, code, request).await?;
        let hint = response
            .hints
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::not_found(name, code.as_str()))?;

        Self::convert(code, hint)
    }
}
