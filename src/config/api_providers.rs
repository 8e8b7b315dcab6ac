// ABOUTME: Provider API configuration for vision models, packaged-goods databases, and UPC lookups
// ABOUTME: Adapters whose credentials are missing from the environment are left out of the chains
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{env_flag, env_non_empty, env_parse_or, env_var_or};
use crate::constants::{gs1, rate_limits};
use crate::errors::{AppError, AppResult};
use crate::providers::{
    EdamamConfig, FoodDataCentralConfig, NutritionixConfig, OpenFoodFactsConfig, RegionFilter,
    RegionalDatasetConfig, VisionApiConfig,
};
use tracing::warn;

/// Configuration for every provider adapter; `None` means the adapter is not configured
#[derive(Debug, Clone)]
pub struct ProviderApiConfig {
    /// Primary image-recognition model
    pub vision_primary: Option<VisionApiConfig>,
    /// Backup image-recognition model
    pub vision_backup: Option<VisionApiConfig>,
    /// Open Food Facts
    pub open_food_facts: Option<OpenFoodFactsConfig>,
    /// Regional packaged-goods dataset
    pub regional_dataset: Option<RegionalDatasetConfig>,
    /// Nutritionix
    pub nutritionix: Option<NutritionixConfig>,
    /// Edamam
    pub edamam: Option<EdamamConfig>,
    /// USDA `FoodData` Central
    pub food_data_central: Option<FoodDataCentralConfig>,
}

impl Default for ProviderApiConfig {
    /// Only the credential-free Open Food Facts adapter
    fn default() -> Self {
        Self {
            vision_primary: None,
            vision_backup: None,
            open_food_facts: Some(OpenFoodFactsConfig::default()),
            regional_dataset: None,
            nutritionix: None,
            edamam: None,
            food_data_central: None,
        }
    }
}

impl ProviderApiConfig {
    /// Load provider configuration from environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if `REGIONAL_DATASET_GS1_PREFIXES` cannot be parsed
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            vision_primary: vision_from_env("VISION_PRIMARY", VisionApiConfig::primary()),
            vision_backup: vision_from_env("VISION_BACKUP", VisionApiConfig::backup()),
            open_food_facts: open_food_facts_from_env(),
            regional_dataset: regional_dataset_from_env()?,
            nutritionix: nutritionix_from_env(),
            edamam: edamam_from_env(),
            food_data_central: food_data_central_from_env(),
        })
    }

    /// Number of configured photo adapters
    #[must_use]
    pub fn photo_provider_count(&self) -> usize {
        usize::from(self.vision_primary.is_some()) + usize::from(self.vision_backup.is_some())
    }

    /// Number of configured barcode adapters
    #[must_use]
    pub fn barcode_provider_count(&self) -> usize {
        [
            self.open_food_facts.is_some(),
            self.regional_dataset.is_some(),
            self.nutritionix.is_some(),
            self.edamam.is_some(),
            self.food_data_central.is_some(),
        ]
        .into_iter()
        .filter(|configured| *configured)
        .count()
    }
}

fn vision_from_env(prefix: &str, defaults: VisionApiConfig) -> Option<VisionApiConfig> {
    let Some(api_key) = env_non_empty(&format!("{prefix}_API_KEY")) else {
        warn!(
            provider = %defaults.name,
            "{prefix}_API_KEY not set, vision model disabled"
        );
        return None;
    };

    Some(VisionApiConfig {
        endpoint: env_var_or(&format!("{prefix}_ENDPOINT"), &defaults.endpoint),
        model: env_var_or(&format!("{prefix}_MODEL"), &defaults.model),
        rate_limit_per_minute: env_parse_or(
            &format!("{prefix}_RATE_LIMIT_PER_MINUTE"),
            defaults.rate_limit_per_minute,
        ),
        api_key,
        name: defaults.name,
    })
}

fn open_food_facts_from_env() -> Option<OpenFoodFactsConfig> {
    if !env_flag("OPEN_FOOD_FACTS_ENABLED", true) {
        return None;
    }
    let defaults = OpenFoodFactsConfig::default();
    Some(OpenFoodFactsConfig {
        base_url: env_var_or("OPEN_FOOD_FACTS_BASE_URL", &defaults.base_url),
        user_agent: env_var_or("OPEN_FOOD_FACTS_USER_AGENT", &defaults.user_agent),
        rate_limit_per_minute: env_parse_or(
            "OPEN_FOOD_FACTS_RATE_LIMIT_PER_MINUTE",
            rate_limits::OPEN_FOOD_FACTS_PER_MINUTE,
        ),
    })
}

fn regional_dataset_from_env() -> AppResult<Option<RegionalDatasetConfig>> {
    let Some(base_url) = env_non_empty("REGIONAL_DATASET_BASE_URL") else {
        warn!("REGIONAL_DATASET_BASE_URL not set, regional dataset disabled");
        return Ok(None);
    };

    let prefixes = env_var_or("REGIONAL_DATASET_GS1_PREFIXES", &gs1::INDIA_PREFIX.to_string());
    let region: RegionFilter = prefixes.parse().map_err(|e: AppError| {
        AppError::config(format!("REGIONAL_DATASET_GS1_PREFIXES is invalid: {e}"))
    })?;

    Ok(Some(RegionalDatasetConfig {
        base_url,
        api_key: env_non_empty("REGIONAL_DATASET_API_KEY"),
        region,
        rate_limit_per_minute: env_parse_or(
            "REGIONAL_DATASET_RATE_LIMIT_PER_MINUTE",
            rate_limits::REGIONAL_DATASET_PER_MINUTE,
        ),
    }))
}

fn nutritionix_from_env() -> Option<NutritionixConfig> {
    let (Some(app_id), Some(app_key)) = (
        env_non_empty("NUTRITIONIX_APP_ID"),
        env_non_empty("NUTRITIONIX_APP_KEY"),
    ) else {
        warn!("NUTRITIONIX_APP_ID or NUTRITIONIX_APP_KEY not set, Nutritionix disabled");
        return None;
    };
    let defaults = NutritionixConfig::default();
    Some(NutritionixConfig {
        base_url: env_var_or("NUTRITIONIX_BASE_URL", &defaults.base_url),
        app_id,
        app_key,
        rate_limit_per_minute: env_parse_or(
            "NUTRITIONIX_RATE_LIMIT_PER_MINUTE",
            rate_limits::NUTRITIONIX_PER_MINUTE,
        ),
    })
}

fn edamam_from_env() -> Option<EdamamConfig> {
    let (Some(app_id), Some(app_key)) = (
        env_non_empty("EDAMAM_APP_ID"),
        env_non_empty("EDAMAM_APP_KEY"),
    ) else {
        warn!("EDAMAM_APP_ID or EDAMAM_APP_KEY not set, Edamam disabled");
        return None;
    };
    let defaults = EdamamConfig::default();
    Some(EdamamConfig {
        base_url: env_var_or("EDAMAM_BASE_URL", &defaults.base_url),
        app_id,
        app_key,
        rate_limit_per_minute: env_parse_or(
            "EDAMAM_RATE_LIMIT_PER_MINUTE",
            rate_limits::EDAMAM_PER_MINUTE,
        ),
    })
}

fn food_data_central_from_env() -> Option<FoodDataCentralConfig> {
    let Some(api_key) = env_non_empty("USDA_API_KEY") else {
        warn!("USDA_API_KEY not set, FoodData Central disabled");
        return None;
    };
    let defaults = FoodDataCentralConfig::default();
    Some(FoodDataCentralConfig {
        api_key,
        base_url: env_var_or("USDA_BASE_URL", &defaults.base_url),
        rate_limit_per_minute: env_parse_or(
            "USDA_RATE_LIMIT_PER_MINUTE",
            rate_limits::FOOD_DATA_CENTRAL_PER_MINUTE,
        ),
    })
}
