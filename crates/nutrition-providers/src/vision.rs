// ABOUTME: Image-recognition model adapter turning a food photo into a nutrition estimate
// ABOUTME: One type serves both the primary and the backup model via separate configs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Vision model adapter
//!
//! Posts the base64-encoded photo to a recognition endpoint and takes the
//! top-ranked prediction:
//!
//! ```json
//! {"predictions": [{"dish_name": "Paneer Butter Masala", "cuisine": "indian",
//!   "portion_grams": 300, "calories": 450, "protein_g": 18, "carbs_g": 20,
//!   "fat_g": 32, "ingredients": ["paneer", "butter"], "confidence": 0.85}]}
//! ```

use crate::adapter::NutritionProvider;
use crate::constants::{providers, rate_limits};
use crate::errors::{AdapterResult, ProviderError};
use crate::http_client::{fetch_json, shared_client};
use crate::models::{Macros, Observation, ObservationKind, ProviderResult};
use crate::rate_limiter::RateLimiter;
use crate::wire::non_empty;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Vision model endpoint configuration
#[derive(Debug, Clone)]
pub struct VisionApiConfig {
    /// Provider name reported in results (`vision-primary` / `vision-backup`)
    pub name: String,
    /// Full URL of the recognition endpoint
    pub endpoint: String,
    /// Bearer token
    pub api_key: String,
    /// Model identifier sent with each request
    pub model: String,
    /// Client-side limit on calls per minute (0 disables)
    pub rate_limit_per_minute: u32,
}

impl VisionApiConfig {
    /// Defaults for the primary model
    #[must_use]
    pub fn primary() -> Self {
        Self {
            name: providers::VISION_PRIMARY.to_owned(),
            endpoint: "http://localhost:8088/v1/food/recognize".to_owned(),
            api_key: String::new(),
            model: "food-vision-large".to_owned(),
            rate_limit_per_minute: rate_limits::VISION_PER_MINUTE,
        }
    }

    /// Defaults for the backup model
    #[must_use]
    pub fn backup() -> Self {
        Self {
            name: providers::VISION_BACKUP.to_owned(),
            endpoint: "http://localhost:8089/v1/food/recognize".to_owned(),
            api_key: String::new(),
            model: "food-vision-small".to_owned(),
            rate_limit_per_minute: rate_limits::VISION_PER_MINUTE,
        }
    }
}

#[derive(Debug, Serialize)]
struct RecognizeRequest<'a> {
    model: &'a str,
    image_base64: String,
}

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    dish_name: Option<String>,
    cuisine: Option<String>,
    portion_grams: Option<f64>,
    calories: Option<f64>,
    protein_g: Option<f64>,
    carbs_g: Option<f64>,
    fat_g: Option<f64>,
    fiber_g: Option<f64>,
    sugar_g: Option<f64>,
    #[serde(default)]
    ingredients: Vec<String>,
    confidence: Option<f64>,
}

/// Image-recognition model adapter
pub struct VisionProvider {
    config: VisionApiConfig,
    client: Client,
    limiter: RateLimiter,
}

impl VisionProvider {
    /// Create an adapter using the shared HTTP client
    #[must_use]
    pub fn new(config: VisionApiConfig) -> Self {
        Self::with_client(config, shared_client().clone())
    }

    /// Create an adapter with a specific HTTP client
    #[must_use]
    pub fn with_client(config: VisionApiConfig, client: Client) -> Self {
        let limiter = RateLimiter::per_minute(config.rate_limit_per_minute);
        Self {
            config,
            client,
            limiter,
        }
    }

    fn convert(&self, prediction: Prediction) -> AdapterResult<ProviderResult> {
        let name = &self.config.name;
        let dish_name = non_empty(prediction.dish_name)
            .ok_or_else(|| ProviderError::malformed(name, "prediction has no dish_name"))?;
        let calories = prediction
            .calories
            .ok_or_else(|| ProviderError::malformed(name, "prediction has no calories"))?;

        Ok(ProviderResult {
            dish_name,
            category: non_empty(prediction.cuisine),
            portion_grams: prediction.portion_grams,
            macros: Macros {
                calories,
                protein_g: prediction.protein_g,
                carbs_g: prediction.carbs_g,
                fat_g: prediction.fat_g,
                fiber_g: prediction.fiber_g,
                sugar_g: prediction.sugar_g,
            },
            ingredients: prediction.ingredients,
            confidence: prediction.confidence.unwrap_or(0.0).clamp(0.0, 1.0),
            provider: name.clone(),
        })
    }
}

#[async_trait]
impl NutritionProvider for VisionProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn observation_kind(&self) -> ObservationKind {
        ObservationKind::Photo
    }

    #[instrument(skip(self, observation), fields(provider = %self.config.name, model = %self.config.model))]
    async fn resolve(&self, observation: &Observation) -> AdapterResult<ProviderResult> {
        let Observation::Photo {
            image,
            content_hash,
        } = observation
        else {
            return Err(ProviderError::not_found(
                &self.config.name,
                observation.reference(),
            ));
        };

        self.limiter.acquire(&self.config.name).await?;

        let body = RecognizeRequest {
            model: &self.config.model,
            image_base64: STANDARD.encode(image),
        };
        let request = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&body);

        let response: RecognizeResponse =
            fetch_json(&self.config.name, content_hash, request).await?;

        let top = response
            .predictions
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::not_found(&self.config.name, content_hash.as_str()))?;

        self.convert(top)
    }
}
