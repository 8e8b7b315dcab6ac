// ABOUTME: Core types and constants for the nutrition resolution pipeline
// ABOUTME: Foundation crate with observation models, error taxonomy, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Nutrition Core
//!
//! Foundation crate providing the shared types of the food identification and
//! nutrition resolution pipeline. Provider adapters and the orchestrator both
//! depend on it, so it is kept free of network and runtime dependencies.
//!
//! ## Modules
//!
//! - **errors**: `AppError`/`ErrorCode` for infrastructure paths, `ProviderError` for
//!   adapter failures, and `Unresolved` for exhausted resolution chains
//! - **models**: observations, provider results, confidence tiers, personalization entries
//! - **constants**: thresholds, default TTLs, and provider identifiers

/// Unified error handling with provider failure taxonomy
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Observation, nutrition, and personalization models
pub mod models;
