// ABOUTME: USDA FoodData Central adapter, the last-resort recipe and dish database for barcodes
// ABOUTME: Searches by code, prefers an exact gtinUpc match, and reads nutrients by USDA id
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! USDA `FoodData` Central adapter
//!
//! `GET {base_url}/foods/search?query={code}&api_key=...`. The search is
//! free-text, so results are filtered to the food whose `gtinUpc` matches the
//! scanned code; without a match the first hit is used at reduced confidence.
//!
//! # API Reference
//! USDA `FoodData` Central API: <https://fdc.nal.usda.gov/api-guide.html>

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
use tracing::{debug, instrument};

/// USDA nutrient ids
mod nutrient_id {
    pub const ENERGY_KCAL: u32 = 1008;
    /// Atwater general factors, reported instead of 1008 on newer Foundation foods
    pub const ENERGY_ATWATER: u32 = 2047;
    pub const PROTEIN: u32 = 1003;
    pub const CARBOHYDRATE: u32 = 1005;
    pub const FAT: u32 = 1004;
    pub const FIBER: u32 = 1079;
    pub const SUGARS: u32 = 2000;
}

/// Penalty applied when no search hit carries the scanned `gtinUpc`
const NO_GTIN_MATCH_PENALTY: f64 = 0.2;

/// USDA `FoodData` Central configuration
#[derive(Debug, Clone)]
pub struct FoodDataCentralConfig {
    /// USDA API key (free from <https://fdc.nal.usda.gov/api-key-signup.html>)
    pub api_key: String,
    /// Base URL for USDA API (default: <https://api.nal.usda.gov/fdc/v1>)
    pub base_url: String,
    /// Client-side limit on calls per minute (0 disables)
    pub rate_limit_per_minute: u32,
}

impl Default for FoodDataCentralConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.nal.usda.gov/fdc/v1".to_owned(),
            rate_limit_per_minute: rate_limits::FOOD_DATA_CENTRAL_PER_MINUTE,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    foods: Vec<SearchFood>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchFood {
    description: Option<String>,
    data_type: Option<String>,
    gtin_upc: Option<String>,
    food_category: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    serving_size: Option<f64>,
    serving_size_unit: Option<String>,
    #[serde(default)]
    food_nutrients: Vec<SearchNutrient>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchNutrient {
    nutrient_id: u32,
    #[serde(default, deserialize_with = "lenient_f64")]
    value: Option<f64>,
}

impl SearchFood {
    fn nutrient(&self, id: u32) -> Option<f64> {
        self.food_nutrients
            .iter()
            .find(|n| n.nutrient_id == id)
            .and_then(|n| n.value)
    }

    fn matches_gtin(&self, code: &str) -> bool {
        self.gtin_upc
            .as_deref()
            .is_some_and(|gtin| gtin.trim_start_matches('0') == code.trim_start_matches('0'))
    }

    /// Serving weight in grams when the serving is declared in grams
    fn serving_grams(&self) -> Option<f64> {
        let unit = self.serving_size_unit.as_deref()?;
        let grams = unit.eq_ignore_ascii_case("g") || unit.eq_ignore_ascii_case("grm");
        self.serving_size
            .filter(|g| grams && g.is_finite() && *g > 0.0)
    }
}

/// Base confidence by USDA data type
fn data_type_confidence(data_type: Option<&str>) -> f64 {
    match data_type {
        Some("Foundation" | "SR Legacy") => 0.8,
        Some("Survey (FNDDS)") => 0.7,
        Some("Branded") => 0.6,
        _ => 0.5,
    }
}

/// USDA `FoodData` Central adapter
pub struct FoodDataCentralProvider {
    config: FoodDataCentralConfig,
    client: Client,
    limiter: RateLimiter,
}

impl FoodDataCentralProvider {
    /// Create an adapter using the shared HTTP client
    #[must_use]
    pub fn new(config: FoodDataCentralConfig) -> Self {
        Self::with_client(config, shared_client().clone())
    }

    /// Create an adapter with a specific HTTP client
    #[must_use]
    pub fn with_client(config: FoodDataCentralConfig, client: Client) -> Self {
        let limiter = RateLimiter::per_minute(config.rate_limit_per_minute);
        Self {
            config,
            client,
            limiter,
        }
    }

    fn convert(code: &str, food: &SearchFood, gtin_match: bool) -> AdapterResult<ProviderResult> {
        let name = providers::FOOD_DATA_CENTRAL;
        let calories = food
            .nutrient(nutrient_id::ENERGY_KCAL)
            .or_else(|| food.nutrient(nutrient_id::ENERGY_ATWATER))
            .ok_or_else(|| ProviderError::malformed(name, "food has no energy nutrient"))?;

        let per_100g = Macros {
            calories,
            protein_g: food.nutrient(nutrient_id::PROTEIN),
            carbs_g: food.nutrient(nutrient_id::CARBOHYDRATE),
            fat_g: food.nutrient(nutrient_id::FAT),
            fiber_g: food.nutrient(nutrient_id::FIBER),
            sugar_g: food.nutrient(nutrient_id::SUGARS),
        };
        let portion = food.serving_grams().unwrap_or(100.0);

        let mut confidence = data_type_confidence(food.data_type.as_deref());
        if !gtin_match {
            confidence -= NO_GTIN_MATCH_PENALTY;
        }

        Ok(ProviderResult {
            dish_name: non_empty(food.description.clone()).unwrap_or_else(|| code.to_owned()),
            category: non_empty(food.food_category.clone()),
            portion_grams: Some(portion),
            macros: per_100g.scaled(portion / 100.0),
            ingredients: Vec::new(),
            confidence: confidence.clamp(0.0, 1.0),
            provider: name.to_owned(),
        })
    }
}

#[async_trait]
impl NutritionProvider for FoodDataCentralProvider {
    fn name(&self) -> &str {
        providers::FOOD_DATA_CENTRAL
    }

    fn observation_kind(&self) -> ObservationKind {
        ObservationKind::Barcode
    }

    #[instrument(skip(self, observation), fields(provider = providers::FOOD_DATA_CENTRAL, code = %observation.reference()))]
    async fn resolve(&self, observation: &Observation) -> AdapterResult<ProviderResult> {
        let name = providers::FOOD_DATA_CENTRAL;
        let Observation::Barcode { code } = observation else {
            return Err(ProviderError::not_found(name, observation.reference()));
        };

        self.limiter.acquire(name).await?;

        let url = format!("{}/foods/search", self.config.base_url.trim_end_matches('/'));
        let request = self.client.get(url).query(&[
            ("query", code.as_str()),
            ("pageSize", "10"),
            ("api_key", self.config.api_key.as_str()),
        ]);

        let response: SearchResponse = fetch_json(name, code, request).await?;

        let exact = response.foods.iter().find(|f| f.matches_gtin(code));
        let (food, gtin_match) = match exact {
            Some(food) => (food, true),
            None => {
                let first = response
                    .foods
                    .first()
                    .ok_or_else(|| ProviderError::not_found(name, code.as_str()))?;
                debug!(code = %code, "No gtinUpc match, using first search hit");
                (first, false)
            }
        };

        Self::convert(code, food, gtin_match)
    }
}
