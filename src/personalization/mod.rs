// ABOUTME: Portion personalization store keyed by user and normalized dish name
// ABOUTME: Rescales fresh estimates to the user's habitual, confirmed portion weight
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// In-memory `DashMap` store
pub mod memory;

use crate::errors::{AppError, AppResult};
use crate::models::{AppliedPersonalization, PersonalizationEntry, ProviderResult};
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub use memory::InMemoryPortionStore;

/// Per-user habitual portion store
///
/// Dish names are normalized by the implementation, so callers pass the name
/// as the provider reported it. Lookups never do network I/O.
#[async_trait::async_trait]
pub trait PortionStore: Send + Sync {
    /// Habitual portion for a dish, if the user has confirmed one
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable
    async fn get(&self, user_id: Uuid, dish_name: &str) -> AppResult<Option<PersonalizationEntry>>;

    /// Record a confirmed portion
    ///
    /// Creates the entry with `scan_count = 1`, or replaces the habitual
    /// portion with the latest value and increments `scan_count`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for non-finite or non-positive grams, or an
    /// error if the store is unavailable
    async fn record_confirmation(
        &self,
        user_id: Uuid,
        dish_name: &str,
        confirmed_portion_grams: f64,
    ) -> AppResult<PersonalizationEntry>;

    /// Forget a dish for a user
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable
    async fn remove(&self, user_id: Uuid, dish_name: &str)
        -> AppResult<Option<PersonalizationEntry>>;

    /// Drop entries last confirmed before `cutoff`, returning how many were removed
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable
    async fn prune_stale(&self, cutoff: DateTime<Utc>) -> AppResult<usize>;

    /// Number of stored entries
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable
    async fn len(&self) -> AppResult<usize>;

    /// Whether the store has no entries
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable
    async fn is_empty(&self) -> AppResult<bool> {
        Ok(self.len().await? == 0)
    }
}

/// Reject portion weights that cannot be used as a rescaling target
///
/// # Errors
///
/// Returns `InvalidInput` for non-finite or non-positive grams
pub fn validate_portion(grams: f64) -> AppResult<f64> {
    if grams.is_finite() && grams > 0.0 {
        Ok(grams)
    } else {
        Err(AppError::invalid_input(format!(
            "portion must be a positive number of grams, got {grams}"
        )))
    }
}

/// Rescale a result to the user's habitual portion
///
/// Identity (`None`) when there is no entry or the result has no usable
/// portion weight; a portion is never fabricated.
#[must_use]
pub fn personalize(
    result: &ProviderResult,
    entry: Option<&PersonalizationEntry>,
) -> Option<AppliedPersonalization> {
    let entry = entry?;
    let portion = result.usable_portion()?;
    let usual = validate_portion(entry.usual_portion_grams).ok()?;

    let multiplier = usual / portion;
    Some(AppliedPersonalization {
        usual_portion_grams: usual,
        multiplier,
        scan_count: entry.scan_count,
        macros: result.macros.scaled(multiplier),
    })
}
