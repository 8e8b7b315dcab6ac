// ABOUTME: Tests for observation normalization, confidence tiers, and portion history entries
// ABOUTME: Pure model behavior with no I/O
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use chrono::{Duration, Utc};
use nutrition_core::errors::{FailureKind, ProviderError};
use nutrition_core::models::{
    normalize_dish_name, ConfidenceTier, Macros, Observation, ObservationKind,
    PersonalizationEntry,
};

#[test]
fn test_upc_and_ean_share_a_cache_key() {
    let upc = Observation::barcode("049000028911");
    let ean = Observation::barcode("0049000028911");
    let gtin14 = Observation::barcode("00049000028911");
    let spaced = Observation::barcode("0 49000-02891 1");

    assert_eq!(upc.cache_key(), ean.cache_key());
    assert_eq!(gtin14.cache_key(), ean.cache_key());
    assert_eq!(spaced.cache_key(), ean.cache_key());
    assert_eq!(ean.cache_key().as_str(), "barcode:0049000028911");
}

#[test]
fn test_short_codes_are_kept_verbatim() {
    let observation = Observation::barcode("0001");

    assert_eq!(observation.reference(), "0001");
    assert!(observation.is_resolvable());
    assert_eq!(observation.gs1_prefix(), None);
}

#[test]
fn test_empty_observations_are_not_resolvable() {
    assert!(!Observation::barcode(" - ").is_resolvable());
    assert!(!Observation::photo(Vec::<u8>::new()).is_resolvable());
}

#[test]
fn test_photo_key_is_content_hash() {
    let a = Observation::photo(b"same bytes".to_vec());
    let b = Observation::photo(b"same bytes".to_vec());
    let c = Observation::photo(b"other bytes".to_vec());

    assert_eq!(a.kind(), ObservationKind::Photo);
    assert_eq!(a.cache_key(), b.cache_key());
    assert_ne!(a.cache_key(), c.cache_key());
    assert!(a.cache_key().as_str().starts_with("photo:"));
    assert_eq!(a.reference().len(), 64);
}

#[test]
fn test_gs1_prefix() {
    assert_eq!(Observation::barcode("8901058000290").gs1_prefix(), Some("890"));
    assert_eq!(Observation::barcode("96385074").gs1_prefix(), Some("963"));
    assert_eq!(Observation::barcode("18901058000297").gs1_prefix(), Some("890"));
    assert_eq!(Observation::barcode("89O1058000290").gs1_prefix(), None);
    assert_eq!(Observation::photo(vec![1]).gs1_prefix(), None);
}

#[test]
fn test_tier_thresholds_and_ordering() {
    assert_eq!(ConfidenceTier::from_confidence(0.7), ConfidenceTier::High);
    assert_eq!(ConfidenceTier::from_confidence(0.69), ConfidenceTier::Moderate);
    assert_eq!(ConfidenceTier::from_confidence(0.4), ConfidenceTier::Moderate);
    assert_eq!(ConfidenceTier::from_confidence(0.39), ConfidenceTier::Low);
    assert_eq!(ConfidenceTier::from_confidence(f64::NAN), ConfidenceTier::Low);
    assert_eq!(ConfidenceTier::from_confidence(7.0), ConfidenceTier::High);

    assert!(ConfidenceTier::Low < ConfidenceTier::Moderate);
    assert!(ConfidenceTier::Moderate < ConfidenceTier::High);
    assert_eq!(ConfidenceTier::High.demote(), ConfidenceTier::Moderate);
    assert_eq!(ConfidenceTier::Low.demote(), ConfidenceTier::Low);
    assert!(!ConfidenceTier::Low.is_acceptable());
}

#[test]
fn test_macros_scale_together() {
    let macros = Macros {
        calories: 200.0,
        protein_g: Some(10.0),
        carbs_g: None,
        fat_g: Some(4.0),
        fiber_g: None,
        sugar_g: Some(1.0),
    };

    let doubled = macros.scaled(2.0);

    assert!((doubled.calories - 400.0).abs() < f64::EPSILON);
    assert_eq!(doubled.protein_g, Some(20.0));
    assert_eq!(doubled.carbs_g, None);
    assert_eq!(doubled.reported_values().count(), 4);
}

#[test]
fn test_dish_names_normalize_to_one_key() {
    assert_eq!(
        normalize_dish_name("  Paneer  Butter-Masala "),
        "paneer butter masala"
    );
    assert_eq!(normalize_dish_name("Dal Makhani"), normalize_dish_name("dal_makhani"));
    assert_eq!(normalize_dish_name("!!!"), "");
}

#[test]
fn test_latest_confirmation_replaces_portion() {
    let earlier = Utc::now() - Duration::days(3);
    let now = Utc::now();

    let entry = PersonalizationEntry::first(300.0, earlier).confirmed(220.0, now);

    assert!((entry.usual_portion_grams - 220.0).abs() < f64::EPSILON);
    assert_eq!(entry.scan_count, 2);
    assert_eq!(entry.last_seen, now);
}

#[test]
fn test_failure_classification() {
    let timeout = ProviderError::timeout("vision-primary", "no response");
    let missing = ProviderError::not_found("open-food-facts", "0001");
    let limited = ProviderError::rate_limited("nutritionix", Some(30));

    assert_eq!(timeout.kind(), FailureKind::Timeout);
    assert!(timeout.is_retryable());
    assert!(!missing.is_retryable());
    assert_eq!(missing.provider(), "open-food-facts");
    assert_eq!(limited.retry_after_secs(), Some(30));
    assert_eq!(FailureKind::MalformedResponse.to_string(), "malformed_response");
}
