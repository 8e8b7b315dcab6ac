// ABOUTME: Scripted nutrition provider returning queued outcomes after an optional delay
// ABOUTME: Counts calls and detects futures dropped mid-flight by the resolver
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use nutrition_pipeline::errors::{AdapterResult, FailureKind, ProviderError};
use nutrition_pipeline::models::{Observation, ObservationKind, ProviderResult};
use nutrition_pipeline::providers::{NutritionProvider, RegionFilter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// One scripted call outcome
#[derive(Debug, Clone)]
pub enum Step {
    Succeed(ProviderResult),
    Fail(FailureKind),
}

/// Provider whose n-th call plays the n-th step; the last step repeats
pub struct ScriptedProvider {
    name: String,
    kind: ObservationKind,
    steps: Mutex<Vec<Step>>,
    delay: Duration,
    region: RegionFilter,
    calls: AtomicUsize,
    cancelled: AtomicUsize,
}

impl ScriptedProvider {
    pub fn barcode(name: &str) -> Self {
        Self::new(name, ObservationKind::Barcode)
    }

    pub fn photo(name: &str) -> Self {
        Self::new(name, ObservationKind::Photo)
    }

    fn new(name: &str, kind: ObservationKind) -> Self {
        Self {
            name: name.to_owned(),
            kind,
            steps: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
            region: RegionFilter::any(),
            calls: AtomicUsize::new(0),
            cancelled: AtomicUsize::new(0),
        }
    }

    pub fn returning(self, result: ProviderResult) -> Self {
        self.steps.lock().unwrap().push(Step::Succeed(result));
        self
    }

    pub fn failing(self, kind: FailureKind) -> Self {
        self.steps.lock().unwrap().push(Step::Fail(kind));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn in_region(mut self, region: RegionFilter) -> Self {
        self.region = region;
        self
    }

    /// Calls started so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Calls whose future was dropped before completing
    pub fn cancelled(&self) -> usize {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn step(&self, call: usize) -> Option<Step> {
        let steps = self.steps.lock().unwrap();
        steps.get(call).or_else(|| steps.last()).cloned()
    }
}

/// Marks a call cancelled unless it ran to completion
struct InFlight<'a> {
    cancelled: &'a AtomicUsize,
    finished: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.cancelled.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl NutritionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn observation_kind(&self) -> ObservationKind {
        self.kind
    }

    fn supports_region(&self, observation: &Observation) -> bool {
        self.region.matches(observation)
    }

    async fn resolve(&self, observation: &Observation) -> AdapterResult<ProviderResult> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let mut guard = InFlight {
            cancelled: &self.cancelled,
            finished: false,
        };

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        guard.finished = true;

        match self.step(call) {
            Some(Step::Succeed(result)) => Ok(result),
            Some(Step::Fail(FailureKind::NotFound)) | None => {
                Err(ProviderError::not_found(&self.name, observation.reference()))
            }
            Some(Step::Fail(FailureKind::RateLimited)) => {
                Err(ProviderError::rate_limited(&self.name, Some(30)))
            }
            Some(Step::Fail(FailureKind::Timeout)) => {
                Err(ProviderError::timeout(&self.name, "scripted timeout"))
            }
            Some(Step::Fail(FailureKind::MalformedResponse)) => {
                Err(ProviderError::malformed(&self.name, "scripted malformed body"))
            }
        }
    }
}
