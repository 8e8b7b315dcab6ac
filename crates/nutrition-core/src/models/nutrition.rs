// ABOUTME: Provider results, macro breakdowns, confidence tiers, and resolved nutrition output
// ABOUTME: Scaling keeps calories and every macro proportional to the portion weight
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::attempt::ProviderAttempt;
use crate::constants::confidence::{HIGH_THRESHOLD, MODERATE_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter;

/// Macro breakdown for one portion
///
/// Protein, carbohydrates and fat are optional so that a provider that omits
/// them can be told apart from one that reports zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Macros {
    /// Energy in kcal
    pub calories: f64,
    /// Protein in grams
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein_g: Option<f64>,
    /// Carbohydrates in grams
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbs_g: Option<f64>,
    /// Fat in grams
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fat_g: Option<f64>,
    /// Dietary fiber in grams
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiber_g: Option<f64>,
    /// Sugars in grams
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sugar_g: Option<f64>,
}

impl Macros {
    /// Multiply calories and every present macro by the same factor
    #[must_use]
    pub fn scaled(&self, multiplier: f64) -> Self {
        Self {
            calories: self.calories * multiplier,
            protein_g: self.protein_g.map(|v| v * multiplier),
            carbs_g: self.carbs_g.map(|v| v * multiplier),
            fat_g: self.fat_g.map(|v| v * multiplier),
            fiber_g: self.fiber_g.map(|v| v * multiplier),
            sugar_g: self.sugar_g.map(|v| v * multiplier),
        }
    }

    /// Required macros (protein, carbohydrates, fat) in a fixed order
    #[must_use]
    pub const fn required(&self) -> [Option<f64>; 3] {
        [self.protein_g, self.carbs_g, self.fat_g]
    }

    /// Every reported value, including calories
    pub fn reported_values(&self) -> impl Iterator<Item = f64> + '_ {
        iter::once(self.calories).chain(
            [
                self.protein_g,
                self.carbs_g,
                self.fat_g,
                self.fiber_g,
                self.sugar_g,
            ]
            .into_iter()
            .flatten(),
        )
    }
}

/// Normalized result produced by a provider adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderResult {
    /// Dish or product name
    pub dish_name: String,
    /// Cuisine or product category tag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Estimated portion weight in grams
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portion_grams: Option<f64>,
    /// Nutrition for `portion_grams`
    pub macros: Macros,
    /// Ingredients (photo-derived results)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ingredients: Vec<String>,
    /// Provider self-reported confidence in [0, 1]
    pub confidence: f64,
    /// Provider that produced this result
    pub provider: String,
}

impl ProviderResult {
    /// Usable portion weight: present, finite, and positive
    #[must_use]
    pub fn usable_portion(&self) -> Option<f64> {
        self.portion_grams.filter(|g| g.is_finite() && *g > 0.0)
    }
}

/// Reliability classification of a resolved result
///
/// Ordered so that `Low < Moderate < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    /// Below 0.4 or demoted
    Low,
    /// In [0.4, 0.7)
    Moderate,
    /// At or above 0.7
    High,
}

impl ConfidenceTier {
    /// Threshold a raw confidence value (NaN counts as zero)
    #[must_use]
    pub fn from_confidence(confidence: f64) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };

        if confidence >= HIGH_THRESHOLD {
            Self::High
        } else if confidence >= MODERATE_THRESHOLD {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    /// One tier lower, saturating at `Low`
    #[must_use]
    pub const fn demote(self) -> Self {
        match self {
            Self::High => Self::Moderate,
            Self::Moderate | Self::Low => Self::Low,
        }
    }

    /// Whether the orchestrator may stop the chain on this tier
    #[must_use]
    pub const fn is_acceptable(self) -> bool {
        !matches!(self, Self::Low)
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => f.write_str("low"),
            Self::Moderate => f.write_str("moderate"),
            Self::High => f.write_str("high"),
        }
    }
}

/// Portion rescaling applied from the user's confirmation history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AppliedPersonalization {
    /// User's habitual portion for this dish (the output portion)
    pub usual_portion_grams: f64,
    /// `usual_portion_grams / provider portion`
    pub multiplier: f64,
    /// Number of confirmations behind the habitual portion
    pub scan_count: u32,
    /// Macros rescaled to `usual_portion_grams`
    pub macros: Macros,
}

/// Output of a resolution request
///
/// Holds the raw provider result unchanged; effective portion and macros come
/// from [`ResolvedNutrition::portion_grams`] and [`ResolvedNutrition::macros`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedNutrition {
    /// Accepted provider result, before personalization
    pub result: ProviderResult,
    /// Derived confidence tier
    pub tier: ConfidenceTier,
    /// Rescaling applied from the personalization store, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personalization: Option<AppliedPersonalization>,
    /// Whether the provider result was served from the response cache
    pub from_cache: bool,
    /// Ordered provider attempts made for this request
    #[serde(default)]
    pub attempts: Vec<ProviderAttempt>,
}

impl ResolvedNutrition {
    /// Effective portion weight after personalization
    #[must_use]
    pub fn portion_grams(&self) -> Option<f64> {
        self.personalization
            .map_or(self.result.portion_grams, |p| Some(p.usual_portion_grams))
    }

    /// Effective macros after personalization
    #[must_use]
    pub fn macros(&self) -> Macros {
        self.personalization
            .map_or(self.result.macros, |p| p.macros)
    }

    /// Whether personalization rescaled this result
    #[must_use]
    pub const fn is_personalized(&self) -> bool {
        self.personalization.is_some()
    }
}
