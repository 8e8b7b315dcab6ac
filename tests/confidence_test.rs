// ABOUTME: Property-style tests for the confidence evaluator
// ABOUTME: Tier thresholds, completeness demotion, and monotonicity in completeness
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod helpers;

use helpers::result;
use nutrition_pipeline::confidence::{has_usable_breakdown, score};
use nutrition_pipeline::models::{ConfidenceTier, Macros};

#[test]
fn test_tier_thresholds() {
    let cases = [
        (0.95, ConfidenceTier::High),
        (0.7, ConfidenceTier::High),
        (0.69, ConfidenceTier::Moderate),
        (0.4, ConfidenceTier::Moderate),
        (0.39, ConfidenceTier::Low),
        (0.0, ConfidenceTier::Low),
        (f64::NAN, ConfidenceTier::Low),
        (1.7, ConfidenceTier::High),
    ];

    for (confidence, expected) in cases {
        assert_eq!(
            score(&result("p", "dish", 100.0, confidence)),
            expected,
            "confidence {confidence}"
        );
    }
}

#[test]
fn test_missing_portion_is_low() {
    for portion in [None, Some(0.0), Some(-10.0), Some(f64::NAN)] {
        let mut unsized_result = result("p", "dish", 100.0, 0.99);
        unsized_result.portion_grams = portion;
        assert_eq!(score(&unsized_result), ConfidenceTier::Low);
    }
}

#[test]
fn test_incomplete_breakdown_demotes_one_tier() {
    let mut partial = result("p", "dish", 100.0, 0.9);
    partial.macros.fat_g = None;
    assert_eq!(score(&partial), ConfidenceTier::Moderate);

    let mut zeroed = result("p", "dish", 100.0, 0.5);
    zeroed.macros.protein_g = Some(0.0);
    assert_eq!(score(&zeroed), ConfidenceTier::Low);
}

#[test]
fn test_zero_calorie_items_keep_tier() {
    let mut water = result("p", "mineral water", 500.0, 0.9);
    water.macros = Macros {
        calories: 0.0,
        protein_g: Some(0.0),
        carbs_g: Some(0.0),
        fat_g: Some(0.0),
        fiber_g: None,
        sugar_g: None,
    };
    assert!(has_usable_breakdown(&water.macros));
    assert_eq!(score(&water), ConfidenceTier::High);
}

#[test]
fn test_implausible_energy_density_demotes() {
    let mut dense = result("p", "dish", 10.0, 0.9);
    dense.macros.calories = 200.0;
    assert_eq!(score(&dense), ConfidenceTier::Moderate);
}

#[test]
fn test_negative_values_count_as_incomplete() {
    let mut broken = result("p", "dish", 100.0, 0.9);
    broken.macros.sugar_g = Some(-1.0);
    assert!(!has_usable_breakdown(&broken.macros));
    assert_eq!(score(&broken), ConfidenceTier::Moderate);
}

#[test]
fn test_removing_a_macro_never_raises_tier() {
    let removals: [fn(&mut Macros); 5] = [
        |m| m.protein_g = None,
        |m| m.carbs_g = None,
        |m| m.fat_g = None,
        |m| m.fiber_g = None,
        |m| m.sugar_g = None,
    ];

    for confidence in [0.2, 0.45, 0.75, 0.99] {
        for portion in [5.0, 50.0, 300.0] {
            let mut complete = result("p", "dish", portion, confidence);
            complete.macros.sugar_g = Some(portion * 0.01);
            let baseline = score(&complete);

            for remove in removals {
                let mut reduced = complete.clone();
                remove(&mut reduced.macros);
                assert!(
                    score(&reduced) <= baseline,
                    "confidence {confidence}, portion {portion}"
                );
            }
        }
    }
}
