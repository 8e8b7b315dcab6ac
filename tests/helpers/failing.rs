// ABOUTME: Response cache and portion store doubles that fail every operation
// ABOUTME: Used to check that infrastructure outages degrade to pass-through
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nutrition_pipeline::cache::ResponseCache;
use nutrition_pipeline::errors::{AppError, AppResult};
use nutrition_pipeline::models::{ObservationKey, PersonalizationEntry, ProviderResult};
use nutrition_pipeline::personalization::PortionStore;
use std::time::Duration;
use uuid::Uuid;

pub struct FailingCache;

#[async_trait]
impl ResponseCache for FailingCache {
    async fn get(&self, _key: &ObservationKey) -> AppResult<Option<ProviderResult>> {
        Err(AppError::unavailable("cache offline"))
    }

    async fn put(&self, _key: &ObservationKey, _result: &ProviderResult, _ttl: Duration) -> AppResult<()> {
        Err(AppError::unavailable("cache offline"))
    }

    async fn invalidate(&self, _key: &ObservationKey) -> AppResult<()> {
        Err(AppError::unavailable("cache offline"))
    }

    async fn ttl(&self, _key: &ObservationKey) -> AppResult<Option<Duration>> {
        Err(AppError::unavailable("cache offline"))
    }

    async fn health_check(&self) -> AppResult<()> {
        Err(AppError::unavailable("cache offline"))
    }

    async fn clear_all(&self) -> AppResult<()> {
        Err(AppError::unavailable("cache offline"))
    }
}

pub struct FailingStore;

#[async_trait]
impl PortionStore for FailingStore {
    async fn get(&self, _user_id: Uuid, _dish_name: &str) -> AppResult<Option<PersonalizationEntry>> {
        Err(AppError::storage("store offline"))
    }

    async fn record_confirmation(
        &self,
        _user_id: Uuid,
        _dish_name: &str,
        _confirmed_portion_grams: f64,
    ) -> AppResult<PersonalizationEntry> {
        Err(AppError::storage("store offline"))
    }

    async fn remove(&self, _user_id: Uuid, _dish_name: &str) -> AppResult<Option<PersonalizationEntry>> {
        Err(AppError::storage("store offline"))
    }

    async fn prune_stale(&self, _cutoff: DateTime<Utc>) -> AppResult<usize> {
        Err(AppError::storage("store offline"))
    }

    async fn len(&self) -> AppResult<usize> {
        Err(AppError::storage("store offline"))
    }
}
