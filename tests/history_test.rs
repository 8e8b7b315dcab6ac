// ABOUTME: Tests for the history writer boundary and its personalization feedback
// ABOUTME: Confirmed portions persist first, then become the user's habitual portion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod helpers;

use anyhow::Result;
use async_trait::async_trait;
use helpers::failing::FailingStore;
use helpers::result;
use helpers::scripted_provider::ScriptedProvider;
use nutrition_pipeline::errors::{AppError, AppResult, ErrorCode};
use nutrition_pipeline::history::{
    HistoryRecord, HistoryWriter, MemoryHistoryWriter, PersonalizingHistoryWriter,
};
use nutrition_pipeline::models::{ConfidenceTier, Observation, ResolvedNutrition};
use nutrition_pipeline::personalization::{InMemoryPortionStore, PortionStore};
use nutrition_pipeline::NutritionResolver;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

fn resolved(dish: &str, portion: f64) -> ResolvedNutrition {
    ResolvedNutrition {
        result: result("off", dish, portion, 0.9),
        tier: ConfidenceTier::High,
        personalization: None,
        from_cache: false,
        attempts: Vec::new(),
    }
}

struct RejectingWriter;

#[async_trait]
impl HistoryWriter for RejectingWriter {
    async fn persist(&self, _: Uuid, _: &ResolvedNutrition, _: f64) -> AppResult<()> {
        Err(AppError::storage("history database offline"))
    }
}

#[tokio::test]
async fn test_confirmation_updates_personalization() -> Result<()> {
    let store = Arc::new(InMemoryPortionStore::new());
    let writer = PersonalizingHistoryWriter::new(MemoryHistoryWriter::new(), store.clone());
    let user = Uuid::new_v4();

    writer.persist(user, &resolved("Aloo Gobi", 200.0), 240.0).await?;

    let entry = store.get(user, "aloo gobi").await?.expect("entry recorded");
    assert!((entry.usual_portion_grams - 240.0).abs() < f64::EPSILON);
    assert_eq!(writer.inner().records_for(user).await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_record_scales_macros_to_confirmed_portion() -> Result<()> {
    let writer = MemoryHistoryWriter::new();
    let user = Uuid::new_v4();
    let scan = resolved("bhindi masala", 100.0);

    writer.persist(user, &scan, 250.0).await?;

    let records = writer.records().await;
    let HistoryRecord {
        macros,
        confirmed_portion_grams,
        provider,
        ..
    } = &records[0];
    assert!((confirmed_portion_grams - 250.0).abs() < f64::EPSILON);
    assert!((macros.calories - scan.result.macros.calories * 2.5).abs() < 1e-9);
    assert_eq!(provider, "off");
    Ok(())
}

#[tokio::test]
async fn test_failed_persist_does_not_touch_personalization() -> Result<()> {
    let store = Arc::new(InMemoryPortionStore::new());
    let writer = PersonalizingHistoryWriter::new(RejectingWriter, store.clone());

    let err = writer
        .persist(Uuid::new_v4(), &resolved("pulao", 300.0), 250.0)
        .await
        .expect_err("writer rejects");

    assert_eq!(err.code, ErrorCode::StorageError);
    assert!(store.is_empty().await?);
    Ok(())
}

#[tokio::test]
async fn test_store_failure_after_persist_is_not_surfaced() -> Result<()> {
    let writer = PersonalizingHistoryWriter::new(MemoryHistoryWriter::new(), Arc::new(FailingStore));
    let user = Uuid::new_v4();

    writer.persist(user, &resolved("kadhi", 200.0), 180.0).await?;

    assert_eq!(writer.inner().records_for(user).await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_invalid_confirmation_is_rejected_before_persist() -> Result<()> {
    let writer = PersonalizingHistoryWriter::new(
        MemoryHistoryWriter::new(),
        Arc::new(InMemoryPortionStore::new()),
    );

    let err = writer
        .persist(Uuid::new_v4(), &resolved("halwa", 100.0), -5.0)
        .await
        .expect_err("negative portion");

    assert_eq!(err.code, ErrorCode::InvalidInput);
    assert!(writer.inner().records().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_next_scan_uses_confirmed_portion() -> Result<()> {
    let store = Arc::new(InMemoryPortionStore::new());
    let resolver = NutritionResolver::builder()
        .photo_stage(Arc::new(
            ScriptedProvider::photo("vision-primary")
                .returning(result("vision-primary", "paneer butter masala", 300.0, 0.85)),
        ))
        .personalization(store.clone())
        .build()?;
    let writer = PersonalizingHistoryWriter::new(MemoryHistoryWriter::new(), store);
    let user = Uuid::new_v4();
    let budget = Duration::from_secs(5);

    let first = resolver
        .resolve_within(&Observation::photo(vec![1, 2, 3]), user, budget)
        .await?;
    assert_eq!(first.portion_grams(), Some(300.0));
    writer.persist(user, &first, 220.0).await?;

    let second = resolver
        .resolve_within(&Observation::photo(vec![4, 5, 6]), user, budget)
        .await?;
    assert_eq!(second.portion_grams(), Some(220.0));
    Ok(())
}
