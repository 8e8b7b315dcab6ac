// ABOUTME: Pipeline-level "no match" outcome returned when resolution yields no usable result
// ABOUTME: Carries the reason and the attempt trace so callers can prompt for manual entry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::models::ProviderAttempt;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Why a resolution ended without a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// Every eligible provider failed
    ChainExhausted,
    /// The request deadline elapsed before a result was accepted
    DeadlineExceeded,
    /// The observation cannot be looked up (empty barcode, empty image)
    InvalidObservation,
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChainExhausted => f.write_str("no provider had a usable result"),
            Self::DeadlineExceeded => f.write_str("request deadline elapsed"),
            Self::InvalidObservation => f.write_str("observation is not resolvable"),
        }
    }
}

/// No nutrition data could be resolved for an observation
///
/// This is an expected outcome, not a crash: the caller typically falls back
/// to manual entry. The pipeline never fabricates a placeholder record.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("unresolved: {reason} after {} provider attempt(s)", attempts.len())]
pub struct Unresolved {
    /// Why resolution stopped
    pub reason: UnresolvedReason,
    /// Ordered record of what each provider stage did
    pub attempts: Vec<ProviderAttempt>,
}

impl Unresolved {
    /// Create an unresolved outcome
    #[must_use]
    pub const fn new(reason: UnresolvedReason, attempts: Vec<ProviderAttempt>) -> Self {
        Self { reason, attempts }
    }

    /// Unresolved because the observation is not resolvable
    #[must_use]
    pub const fn invalid_observation() -> Self {
        Self::new(UnresolvedReason::InvalidObservation, Vec::new())
    }
}
