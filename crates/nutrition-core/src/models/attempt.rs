// ABOUTME: Per-stage record of what the orchestrator did with each provider
// ABOUTME: Returned with both resolved and unresolved outcomes for diagnostics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::nutrition::ConfidenceTier;
use crate::errors::FailureKind;
use serde::{Deserialize, Serialize};

/// Why a chain stage was not called
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Provider is not authoritative for the barcode's GS1 region
    RegionUnsupported,
    /// Provider circuit breaker is open
    CircuitOpen,
    /// Stage is a failure-only fallback and the previous failure did not qualify
    FallbackNotTriggered,
}

/// What happened at one chain stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// Result accepted and chain stopped
    Accepted {
        /// Tier of the accepted result
        tier: ConfidenceTier,
    },
    /// Result scored `low`; kept as a candidate while the chain continued
    LowConfidence,
    /// Provider call failed
    Failed {
        /// Failure classification
        kind: FailureKind,
        /// Failure message for logs
        detail: String,
    },
    /// Stage was not called
    Skipped {
        /// Why the stage was skipped
        reason: SkipReason,
    },
    /// Call was cancelled because the request deadline elapsed
    Cancelled,
}

/// One entry of the attempt trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderAttempt {
    /// Provider name
    pub provider: String,
    /// Outcome at this stage
    #[serde(flatten)]
    pub outcome: AttemptOutcome,
    /// Wall-clock time spent at this stage in milliseconds
    pub elapsed_ms: u64,
}

impl ProviderAttempt {
    /// Record a stage outcome
    pub fn new(provider: impl Into<String>, outcome: AttemptOutcome, elapsed_ms: u64) -> Self {
        Self {
            provider: provider.into(),
            outcome,
            elapsed_ms,
        }
    }

    /// Record a skipped stage
    pub fn skipped(provider: impl Into<String>, reason: SkipReason) -> Self {
        Self::new(provider, AttemptOutcome::Skipped { reason }, 0)
    }
}
