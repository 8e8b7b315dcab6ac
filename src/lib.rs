// ABOUTME: Main library entry point for the food identification and nutrition resolution pipeline
// ABOUTME: Resolves photos and barcodes to nutrition records through ordered, unreliable providers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Nutrition Pipeline
//!
//! Takes a photographic or barcode observation of food and produces a
//! nutrition record (calories, macros, portion weight) with a confidence
//! tier, by driving several heterogeneous, rate-limited external data sources
//! in a fixed precedence order and rescaling the result to the user's
//! habitual portion.
//!
//! ## Data flow
//!
//! observation → response cache (a hit short-circuits) → resolution chain of
//! provider adapters → confidence evaluator → portion personalization →
//! [`ResolvedNutrition`](models::ResolvedNutrition). Confirmations flow back
//! through a [`HistoryWriter`](history::HistoryWriter) into the
//! personalization store.
//!
//! ## Example
//!
//! ```rust,no_run
//! use nutrition_pipeline::config::PipelineConfig;
//! use nutrition_pipeline::models::Observation;
//! use nutrition_pipeline::NutritionResolver;
//! use std::time::Duration;
//! use uuid::Uuid;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::from_env()?;
//! let resolver = NutritionResolver::from_config(&config)?;
//!
//! let observation = Observation::barcode("8901234567890");
//! match resolver
//!     .resolve_within(&observation, Uuid::new_v4(), Duration::from_secs(5))
//!     .await
//! {
//!     Ok(resolved) => println!("{} kcal", resolved.macros().calories),
//!     Err(unresolved) => println!("manual entry needed: {unresolved}"),
//! }
//! # Ok(())
//! # }
//! ```

/// Bounded, TTL-based response cache keyed by observation content
pub mod cache;

/// Confidence tier scoring for normalized provider results
pub mod confidence;

/// Environment-based configuration
pub mod config;

/// History writer boundary and confirmation feedback into personalization
pub mod history;

/// Structured logging setup
pub mod logging;

/// Per-user habitual portion store and rescaling
pub mod personalization;

/// Resolution orchestrator, chains, and wiring from configuration
pub mod resolution;

// Re-export foundation crates so callers need a single dependency
pub use nutrition_core::{constants, errors, models};
pub use nutrition_providers as providers;

pub use resolution::{NutritionResolver, ResolverBuilder};
