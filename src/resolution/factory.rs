// ABOUTME: Assembles a resolver from environment configuration
// ABOUTME: Photo chain is primary then backup vision; barcode chain follows source trust order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::resolver::NutritionResolver;
use crate::cache::InMemoryCache;
use crate::config::PipelineConfig;
use crate::errors::AppResult;
use crate::models::ObservationKind;
use crate::personalization::InMemoryPortionStore;
use crate::providers::{
    initialize_shared_client, EdamamProvider, FoodDataCentralProvider, NutritionixProvider,
    OpenFoodFactsProvider, RegionalDatasetProvider, VisionProvider,
};
use std::sync::Arc;
use tracing::{info, warn};

impl NutritionResolver {
    /// Build a resolver with every configured adapter, an in-memory cache,
    /// and an in-memory personalization store
    ///
    /// Barcode precedence: Open Food Facts, regional dataset, Nutritionix,
    /// Edamam, `FoodData` Central. Unconfigured adapters are left out.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if the assembled chains are inconsistent
    pub fn from_config(config: &PipelineConfig) -> AppResult<Self> {
        initialize_shared_client(
            config.http_client.timeout_secs,
            config.http_client.connect_timeout_secs,
        );

        let providers = &config.providers;
        let mut builder = Self::builder()
            .circuit_breaker(config.resilience.circuit_breaker())
            .provider_timeout(config.resolution.provider_timeout())
            .request_budget(config.resolution.request_budget())
            .cache_ttl(config.cache.ttl)
            .cache(Arc::new(InMemoryCache::new(config.cache.clone())))
            .personalization(Arc::new(InMemoryPortionStore::new()));

        match (&providers.vision_primary, &providers.vision_backup) {
            (Some(primary), backup) => {
                builder = builder.photo_stage(Arc::new(VisionProvider::new(primary.clone())));
                if let Some(backup) = backup {
                    builder = builder.photo_fallback(Arc::new(VisionProvider::new(backup.clone())));
                }
            }
            (None, Some(backup)) => {
                warn!("Primary vision model not configured, backup model serves photo requests");
                builder = builder.photo_stage(Arc::new(VisionProvider::new(backup.clone())));
            }
            (None, None) => warn!("No vision model configured, photo observations will be unresolved"),
        }

        if let Some(off) = &providers.open_food_facts {
            builder = builder.barcode_stage(Arc::new(OpenFoodFactsProvider::new(off.clone())));
        }
        if let Some(regional) = &providers.regional_dataset {
            builder =
                builder.barcode_stage(Arc::new(RegionalDatasetProvider::new(regional.clone())));
        }
        if let Some(nutritionix) = &providers.nutritionix {
            builder = builder.barcode_stage(Arc::new(NutritionixProvider::new(nutritionix.clone())));
        }
        if let Some(edamam) = &providers.edamam {
            builder = builder.barcode_stage(Arc::new(EdamamProvider::new(edamam.clone())));
        }
        if let Some(fdc) = &providers.food_data_central {
            builder = builder.barcode_stage(Arc::new(FoodDataCentralProvider::new(fdc.clone())));
        }

        let resolver = builder.build()?;
        info!(
            photo_chain = ?resolver.chain(ObservationKind::Photo).provider_names(),
            barcode_chain = ?resolver.chain(ObservationKind::Barcode).provider_names(),
            "Nutrition resolver ready"
        );
        Ok(resolver)
    }
}
