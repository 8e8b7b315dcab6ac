// ABOUTME: Shared test helpers for resolver, cache, personalization, and history tests
// ABOUTME: Scripted providers, result fixtures, and failing cache/store doubles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(dead_code)]

pub mod failing;
pub mod scripted_provider;

use nutrition_pipeline::models::{Macros, ProviderResult};

/// Complete macros roughly proportional to the portion (1.5 kcal/g)
pub fn macros_for(portion_grams: f64) -> Macros {
    Macros {
        calories: portion_grams * 1.5,
        protein_g: Some(portion_grams * 0.08),
        carbs_g: Some(portion_grams * 0.2),
        fat_g: Some(portion_grams * 0.05),
        fiber_g: Some(portion_grams * 0.02),
        sugar_g: None,
    }
}

/// Provider result with a complete macro breakdown
pub fn result(provider: &str, dish: &str, portion_grams: f64, confidence: f64) -> ProviderResult {
    ProviderResult {
        dish_name: dish.to_owned(),
        category: None,
        portion_grams: Some(portion_grams),
        macros: macros_for(portion_grams),
        ingredients: Vec::new(),
        confidence,
        provider: provider.to_owned(),
    }
}
