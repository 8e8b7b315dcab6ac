// ABOUTME: Application constants for confidence scoring, caching, and provider identifiers
// ABOUTME: Centralizes defaults so configuration and tests share one source of truth
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Confidence tier thresholds and plausibility limits
pub mod confidence {
    /// Minimum provider confidence for the `high` tier
    pub const HIGH_THRESHOLD: f64 = 0.7;
    /// Minimum provider confidence for the `moderate` tier
    pub const MODERATE_THRESHOLD: f64 = 0.4;
    /// Energy density above this many kcal per gram is physically implausible
    /// (pure fat is about 9 kcal/g)
    pub const MAX_PLAUSIBLE_KCAL_PER_GRAM: f64 = 9.5;
}

/// Response cache defaults
pub mod cache {
    /// Default time-to-live for cached provider results (30 minutes)
    pub const DEFAULT_TTL_SECS: u64 = 30 * 60;
    /// Default maximum number of cached observations
    pub const DEFAULT_MAX_ENTRIES: usize = 1000;
    /// Default interval between expired-entry sweeps (5 minutes)
    pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 300;
    /// Longest accepted cache TTL or sweep interval (one year)
    pub const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;
}

/// Per-request resolution defaults
pub mod resolution {
    /// Default per-provider call timeout in milliseconds
    pub const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 4_000;
    /// Default overall request budget in milliseconds when the caller uses `resolve_within`
    pub const DEFAULT_REQUEST_BUDGET_MS: u64 = 10_000;
    /// Horizon used in place of a deadline that would overflow the clock (30 years)
    pub const FAR_FUTURE_SECS: u64 = 30 * 365 * 24 * 60 * 60;
}

/// Stable provider identifiers used in results, logs, and attempt traces
pub mod providers {
    /// Primary image-recognition model
    pub const VISION_PRIMARY: &str = "vision-primary";
    /// Backup image-recognition model
    pub const VISION_BACKUP: &str = "vision-backup";
    /// Open Food Facts packaged-goods database
    pub const OPEN_FOOD_FACTS: &str = "open-food-facts";
    /// Regional packaged-goods dataset
    pub const REGIONAL_DATASET: &str = "regional-dataset";
    /// Nutritionix UPC lookup
    pub const NUTRITIONIX: &str = "nutritionix";
    /// Edamam food database UPC lookup
    pub const EDAMAM: &str = "edamam";
    /// USDA `FoodData` Central recipe and dish database
    pub const FOOD_DATA_CENTRAL: &str = "food-data-central";
}

/// GS1 barcode numbering constants
pub mod gs1 {
    /// GS1 India prefix, the default region of the regional dataset
    pub const INDIA_PREFIX: u16 = 890;
    /// Length of a GS1 company prefix used for region detection
    pub const PREFIX_LEN: usize = 3;
}

/// Provider rate limit defaults (requests per minute)
pub mod rate_limits {
    /// Vision model calls per minute
    pub const VISION_PER_MINUTE: u32 = 60;
    /// Open Food Facts product reads per minute (published fair-use limit is 100)
    pub const OPEN_FOOD_FACTS_PER_MINUTE: u32 = 100;
    /// Regional dataset calls per minute
    pub const REGIONAL_DATASET_PER_MINUTE: u32 = 60;
    /// Nutritionix calls per minute
    pub const NUTRITIONIX_PER_MINUTE: u32 = 30;
    /// Edamam food database calls per minute (free tier)
    pub const EDAMAM_PER_MINUTE: u32 = 10;
    /// USDA `FoodData` Central calls per minute
    pub const FOOD_DATA_CENTRAL_PER_MINUTE: u32 = 30;
}

/// Circuit breaker defaults per provider stage
pub mod resilience {
    /// Consecutive unhealthy outcomes before a stage is skipped
    pub const CIRCUIT_FAILURE_THRESHOLD: u32 = 5;
    /// Seconds an open circuit skips its provider
    pub const CIRCUIT_RECOVERY_SECS: u64 = 30;
    /// Healthy half-open outcomes needed to close again
    pub const CIRCUIT_SUCCESS_THRESHOLD: u32 = 1;
}

/// Shared HTTP client defaults
pub mod http {
    /// Request timeout for calls made outside a resolution deadline
    pub const CLIENT_TIMEOUT_SECS: u64 = 15;
    /// TCP connect timeout
    pub const CLIENT_CONNECT_TIMEOUT_SECS: u64 = 5;
}

/// Service identity used in structured logs
pub mod service_names {
    /// Default `service.name` log field
    pub const NUTRITION_PIPELINE: &str = "nutrition-pipeline";
}
