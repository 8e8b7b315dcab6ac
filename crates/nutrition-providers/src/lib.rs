// ABOUTME: Nutrition provider adapters for vision models, packaged-goods databases, and UPC lookups
// ABOUTME: Core adapter trait, shared HTTP client, circuit breaker, and client-side rate limiting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Nutrition data provider adapters and their shared infrastructure.
//!
//! Every adapter translates its provider's wire format into
//! [`nutrition_core::models::ProviderResult`] at the boundary and reports
//! expected failures as [`nutrition_core::errors::ProviderError`], so the
//! orchestrator never branches on provider identity.

// Re-export nutrition-core modules so adapters can keep `use crate::errors::*` etc.
pub use nutrition_core::constants;
pub use nutrition_core::errors;
pub use nutrition_core::models;

// Core provider infrastructure
/// Adapter trait implemented by every provider
pub mod adapter;
/// Circuit breaker pattern for provider resilience
pub mod circuit_breaker;
/// Shared HTTP client and status classification
pub mod http_client;
/// Sliding-window client-side rate limiter
pub mod rate_limiter;
/// GS1 prefix filters for region-authoritative providers
pub mod region;
/// Lenient deserializers for loosely typed provider payloads
mod wire;

// Provider implementations
/// Edamam food database UPC lookup
pub mod edamam;
/// USDA `FoodData` Central recipe and dish database
pub mod food_data_central;
/// Nutritionix branded item UPC lookup
pub mod nutritionix;
/// Open Food Facts packaged-goods database
pub mod open_food_facts;
/// Regional packaged-goods dataset
pub mod regional_dataset;
/// Image-recognition model adapter
pub mod vision;

pub use adapter::NutritionProvider;
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use edamam::{EdamamConfig, EdamamProvider};
pub use food_data_central::{FoodDataCentralConfig, FoodDataCentralProvider};
pub use http_client::{initialize_shared_client, shared_client};
pub use nutritionix::{NutritionixConfig, NutritionixProvider};
pub use open_food_facts::{OpenFoodFactsConfig, OpenFoodFactsProvider};
pub use rate_limiter::RateLimiter;
pub use region::RegionFilter;
pub use regional_dataset::{RegionalDatasetConfig, RegionalDatasetProvider};
pub use vision::{VisionApiConfig, VisionProvider};
