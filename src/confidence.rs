// ABOUTME: Confidence evaluator deriving a tier from provider confidence and result completeness
// ABOUTME: Pure and deterministic; the tier is never taken from the caller
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Confidence scoring
//!
//! 1. Threshold the provider confidence (`high ≥ 0.7`, `moderate ≥ 0.4`).
//! 2. Demote one tier for an unusable macro breakdown: a required macro
//!    missing, zero while calories are not, or any negative/non-finite value.
//! 3. Demote one tier for an energy density above 9.5 kcal per gram.
//! 4. No usable portion weight means `low`.
//!
//! Removing a macro from a result can only add demotions, never remove one,
//! so an incomplete result never scores above its complete twin.

use crate::constants::confidence::MAX_PLAUSIBLE_KCAL_PER_GRAM;
use crate::models::{ConfidenceTier, Macros, ProviderResult};

/// Score a normalized provider result
#[must_use]
pub fn score(result: &ProviderResult) -> ConfidenceTier {
    let Some(portion) = result.usable_portion() else {
        return ConfidenceTier::Low;
    };

    let mut tier = ConfidenceTier::from_confidence(result.confidence);
    if !has_usable_breakdown(&result.macros) {
        tier = tier.demote();
    }
    if result.macros.calories / portion > MAX_PLAUSIBLE_KCAL_PER_GRAM {
        tier = tier.demote();
    }
    tier
}

/// Whether protein, carbohydrates and fat are all reported and every value is sane
#[must_use]
pub fn has_usable_breakdown(macros: &Macros) -> bool {
    let sane = macros
        .reported_values()
        .all(|value| value.is_finite() && value >= 0.0);

    let complete = macros.required().iter().all(|value| match value {
        None => false,
        Some(grams) => *grams != 0.0 || macros.calories == 0.0,
    });

    sane && complete
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(confidence: f64, portion: Option<f64>, macros: Macros) -> ProviderResult {
        ProviderResult {
            dish_name: "dal tadka".to_owned(),
            category: None,
            portion_grams: portion,
            macros,
            ingredients: Vec::new(),
            confidence,
            provider: "test".to_owned(),
        }
    }

    fn complete() -> Macros {
        Macros {
            calories: 250.0,
            protein_g: Some(12.0),
            carbs_g: Some(30.0),
            fat_g: Some(8.0),
            fiber_g: None,
            sugar_g: None,
        }
    }

    #[test]
    fn thresholds_are_inclusive_at_lower_bound() {
        assert_eq!(score(&result(0.7, Some(200.0), complete())), ConfidenceTier::High);
        assert_eq!(score(&result(0.4, Some(200.0), complete())), ConfidenceTier::Moderate);
        assert_eq!(score(&result(0.39, Some(200.0), complete())), ConfidenceTier::Low);
    }

    #[test]
    fn nan_confidence_counts_as_zero() {
        assert_eq!(score(&result(f64::NAN, Some(200.0), complete())), ConfidenceTier::Low);
    }

    #[test]
    fn zero_macro_with_calories_demotes() {
        let macros = Macros {
            protein_g: Some(0.0),
            ..complete()
        };
        assert_eq!(score(&result(0.9, Some(200.0), macros)), ConfidenceTier::Moderate);
    }

    #[test]
    fn all_zero_result_is_consistent() {
        let water = Macros {
            calories: 0.0,
            protein_g: Some(0.0),
            carbs_g: Some(0.0),
            fat_g: Some(0.0),
            fiber_g: None,
            sugar_g: None,
        };
        assert!(has_usable_breakdown(&water));
    }
}
