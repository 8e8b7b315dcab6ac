// ABOUTME: Tests for GS1 prefix parsing and region matching
// ABOUTME: Covers single prefixes, ranges, GTIN-14 codes, photos, and invalid input
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use nutrition_core::errors::ErrorCode;
use nutrition_core::models::Observation;
use nutrition_providers::RegionFilter;

#[test]
fn test_single_prefix_matches_only_that_region() {
    let filter: RegionFilter = "890".parse().unwrap();

    assert!(filter.matches(&Observation::barcode("8901058000290")));
    assert!(!filter.matches(&Observation::barcode("5000112548167")));
    assert!(!filter.is_unrestricted());
}

#[test]
fn test_ranges_and_lists() {
    let filter: RegionFilter = " 300-379 , 890 ".parse().unwrap();

    assert!(filter.matches(&Observation::barcode("3017620422003")));
    assert!(filter.matches(&Observation::barcode("3790000000001")));
    assert!(filter.matches(&Observation::barcode("8904063200018")));
    assert!(!filter.matches(&Observation::barcode("3800000000001")));
}

#[test]
fn test_gtin14_prefix_skips_indicator_digit() {
    let filter: RegionFilter = "890".parse().unwrap();

    // Indicator digit 1 keeps all 14 digits
    assert!(filter.matches(&Observation::barcode("18901058000297")));
}

#[test]
fn test_photos_and_short_codes_need_unrestricted_filter() {
    let filter: RegionFilter = "890".parse().unwrap();
    let photo = Observation::photo(vec![1, 2, 3]);
    let short = Observation::barcode("0001");

    assert!(!filter.matches(&photo));
    assert!(!filter.matches(&short));
    assert!(RegionFilter::any().matches(&photo));
    assert!(RegionFilter::any().matches(&short));
}

#[test]
fn test_empty_list_is_unrestricted() {
    let filter: RegionFilter = "".parse().unwrap();
    assert!(filter.is_unrestricted());
    assert_eq!(filter, RegionFilter::any());
}

#[test]
fn test_from_ranges() {
    let filter = RegionFilter::from_ranges(vec![400..=440]);
    assert!(filter.matches(&Observation::barcode("4006381333931")));
    assert!(!filter.matches(&Observation::barcode("8901058000290")));
}

#[test]
fn test_invalid_prefixes_are_config_errors() {
    for input in ["89x", "89", "8901", "379-300", "890-"] {
        let err = input.parse::<RegionFilter>().expect_err(input);
        assert_eq!(err.code, ErrorCode::ConfigInvalid, "{input}");
    }
}
