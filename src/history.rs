// ABOUTME: History writer boundary for confirmed scans and its personalization feedback loop
// ABOUTME: Decorator records each confirmed portion in the portion store after a successful persist
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! The application owns history storage. The pipeline only defines the
//! boundary and closes the loop: a confirmed portion persisted through
//! [`PersonalizingHistoryWriter`] becomes the user's habitual portion for that
//! dish on the next scan.

use crate::errors::AppResult;
use crate::logging::PipelineLogger;
use crate::models::{ConfidenceTier, Macros, ResolvedNutrition};
use crate::personalization::{validate_portion, PortionStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

/// Persists user-confirmed resolutions
#[async_trait]
pub trait HistoryWriter: Send + Sync {
    /// Persist a resolution the user confirmed with a portion weight
    ///
    /// # Errors
    ///
    /// Returns an error if the history store rejects the write
    async fn persist(
        &self,
        user_id: Uuid,
        resolved: &ResolvedNutrition,
        confirmed_portion_grams: f64,
    ) -> AppResult<()>;
}

/// Forwards to an application writer, then records the confirmed portion
pub struct PersonalizingHistoryWriter<W, S: ?Sized> {
    writer: W,
    store: Arc<S>,
}

impl<W, S> PersonalizingHistoryWriter<W, S>
where
    W: HistoryWriter,
    S: PortionStore + ?Sized,
{
    /// Wrap `writer` so confirmations feed `store`
    pub const fn new(writer: W, store: Arc<S>) -> Self {
        Self { writer, store }
    }

    /// Wrapped application writer
    pub const fn inner(&self) -> &W {
        &self.writer
    }
}

#[async_trait]
impl<W, S> HistoryWriter for PersonalizingHistoryWriter<W, S>
where
    W: HistoryWriter,
    S: PortionStore + ?Sized,
{
    async fn persist(
        &self,
        user_id: Uuid,
        resolved: &ResolvedNutrition,
        confirmed_portion_grams: f64,
    ) -> AppResult<()> {
        let grams = validate_portion(confirmed_portion_grams)?;
        self.writer.persist(user_id, resolved, grams).await?;

        let dish = &resolved.result.dish_name;
        match self.store.record_confirmation(user_id, dish, grams).await {
            Ok(entry) => debug!(
                user_id = %user_id,
                dish = %dish,
                scan_count = entry.scan_count,
                "Habitual portion updated"
            ),
            Err(e) => warn!(
                user_id = %user_id,
                dish = %dish,
                error = %e,
                "History persisted but habitual portion not updated"
            ),
        }
        Ok(())
    }
}

/// One confirmed scan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRecord {
    /// Record id
    pub id: Uuid,
    /// User who confirmed the scan
    pub user_id: Uuid,
    /// Dish name as reported by the provider
    pub dish_name: String,
    /// Provider that produced the result
    pub provider: String,
    /// Portion the user confirmed
    pub confirmed_portion_grams: f64,
    /// Macros for the confirmed portion
    pub macros: Macros,
    /// Confidence tier at resolution time
    pub tier: ConfidenceTier,
    /// When the record was written
    pub recorded_at: DateTime<Utc>,
}

impl HistoryRecord {
    /// Build a record, scaling provider macros to the confirmed portion
    ///
    /// Without a usable provider portion the macros are kept as reported.
    #[must_use]
    pub fn new(user_id: Uuid, resolved: &ResolvedNutrition, confirmed_portion_grams: f64) -> Self {
        let result = &resolved.result;
        let macros = result.usable_portion().map_or(result.macros, |portion| {
            result.macros.scaled(confirmed_portion_grams / portion)
        });

        Self {
            id: Uuid::new_v4(),
            user_id,
            dish_name: result.dish_name.clone(),
            provider: result.provider.clone(),
            confirmed_portion_grams,
            macros,
            tier: resolved.tier,
            recorded_at: Utc::now(),
        }
    }
}

/// In-process history writer for tests and local runs
#[derive(Debug, Default)]
pub struct MemoryHistoryWriter {
    records: RwLock<Vec<HistoryRecord>>,
}

impl MemoryHistoryWriter {
    /// Create an empty writer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All records in write order
    pub async fn records(&self) -> Vec<HistoryRecord> {
        self.records.read().await.clone()
    }

    /// Records of one user in write order
    pub async fn records_for(&self, user_id: Uuid) -> Vec<HistoryRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|record| record.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl HistoryWriter for MemoryHistoryWriter {
    async fn persist(
        &self,
        user_id: Uuid,
        resolved: &ResolvedNutrition,
        confirmed_portion_grams: f64,
    ) -> AppResult<()> {
        let grams = validate_portion(confirmed_portion_grams)?;
        let record = HistoryRecord::new(user_id, resolved, grams);
        PipelineLogger::log_history_write(user_id, &record.dish_name, grams);
        self.records.write().await.push(record);
        Ok(())
    }
}
