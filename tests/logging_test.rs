// ABOUTME: Tests for logging configuration parsing and subscriber installation
// ABOUTME: Environment-mutating tests run serially
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use nutrition_pipeline::logging::{LogFormat, LoggingConfig};
use serial_test::serial;
use std::env;

fn clear_env() {
    for var in [
        "RUST_LOG",
        "LOG_FORMAT",
        "ENVIRONMENT",
        "LOG_INCLUDE_LOCATION",
        "LOG_INCLUDE_THREAD",
        "LOG_INCLUDE_SPANS",
        "SERVICE_NAME",
    ] {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_logging_defaults() {
    clear_env();

    let config = LoggingConfig::from_env();

    assert_eq!(config.level, "info");
    assert_eq!(config.format, LogFormat::Pretty);
    assert_eq!(config.service_name, "nutrition-pipeline");
    assert!(!config.include_location);
}

#[test]
#[serial]
fn test_production_enables_detail() {
    clear_env();
    env::set_var("ENVIRONMENT", "production");
    env::set_var("LOG_FORMAT", "json");
    env::set_var("RUST_LOG", "debug");

    let config = LoggingConfig::from_env();

    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.level, "debug");
    assert!(config.include_location);
    assert!(config.include_spans);

    clear_env();
}

#[test]
#[serial]
fn test_second_init_reports_error() {
    clear_env();
    let config = LoggingConfig {
        format: LogFormat::Compact,
        ..LoggingConfig::default()
    };

    // Only one global subscriber can be installed
    let _ = config.init();
    assert!(config.init().is_err());
}
