// ABOUTME: Data models for observations, provider results, and personalization
// ABOUTME: Shared by provider adapters and the resolution orchestrator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Per-stage attempt trace
mod attempt;
/// Nutrition results and confidence tiers
mod nutrition;
/// Photo and barcode observations
mod observation;
/// Portion personalization entries
mod personalization;

pub use attempt::{AttemptOutcome, ProviderAttempt, SkipReason};
pub use nutrition::{
    AppliedPersonalization, ConfidenceTier, Macros, ProviderResult, ResolvedNutrition,
};
pub use observation::{Observation, ObservationKey, ObservationKind};
pub use personalization::{normalize_dish_name, PersonalizationEntry};
