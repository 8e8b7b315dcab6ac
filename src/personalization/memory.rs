// ABOUTME: In-memory portion personalization store backed by DashMap
// ABOUTME: Sharded locking gives per-key exclusive writes with concurrent reads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{validate_portion, PortionStore};
use crate::errors::AppResult;
use crate::models::{normalize_dish_name, PersonalizationEntry};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

type EntryKey = (Uuid, String);

/// Portion store held in process memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryPortionStore {
    entries: Arc<DashMap<EntryKey, PersonalizationEntry>>,
}

impl InMemoryPortionStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn key(user_id: Uuid, dish_name: &str) -> EntryKey {
        (user_id, normalize_dish_name(dish_name))
    }
}

#[async_trait]
impl PortionStore for InMemoryPortionStore {
    async fn get(&self, user_id: Uuid, dish_name: &str) -> AppResult<Option<PersonalizationEntry>> {
        Ok(self
            .entries
            .get(&Self::key(user_id, dish_name))
            .map(|entry| *entry))
    }

    async fn record_confirmation(
        &self,
        user_id: Uuid,
        dish_name: &str,
        confirmed_portion_grams: f64,
    ) -> AppResult<PersonalizationEntry> {
        let grams = validate_portion(confirmed_portion_grams)?;
        let now = Utc::now();

        // entry() holds the shard lock for the whole read-modify-write
        let updated = *self
            .entries
            .entry(Self::key(user_id, dish_name))
            .and_modify(|entry| *entry = entry.confirmed(grams, now))
            .or_insert_with(|| PersonalizationEntry::first(grams, now));

        debug!(
            user_id = %user_id,
            dish = %normalize_dish_name(dish_name),
            grams,
            scan_count = updated.scan_count,
            "Recorded portion confirmation"
        );
        Ok(updated)
    }

    async fn remove(
        &self,
        user_id: Uuid,
        dish_name: &str,
    ) -> AppResult<Option<PersonalizationEntry>> {
        Ok(self
            .entries
            .remove(&Self::key(user_id, dish_name))
            .map(|(_, entry)| entry))
    }

    async fn prune_stale(&self, cutoff: DateTime<Utc>) -> AppResult<usize> {
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let keep = entry.last_seen >= cutoff;
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }

    async fn len(&self) -> AppResult<usize> {
        Ok(self.entries.len())
    }
}
