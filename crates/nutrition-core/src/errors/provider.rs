// ABOUTME: Structured failure types returned by nutrition provider adapters
// ABOUTME: Four recoverable kinds the orchestrator handles by advancing the chain
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Coarse failure classification used for fallback and circuit breaker decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Provider has no record for the observation
    NotFound,
    /// Provider (or the local limiter in front of it) refused the call
    RateLimited,
    /// No usable response arrived in time
    Timeout,
    /// Provider answered with data the adapter cannot use
    MalformedResponse,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotFound => "not_found",
            Self::RateLimited => "rate_limited",
            Self::Timeout => "timeout",
            Self::MalformedResponse => "malformed_response",
        };
        f.write_str(label)
    }
}

/// Failure reported by a provider adapter
///
/// Adapters return these for every expected failure mode instead of panicking,
/// so the orchestrator can decide whether to advance to the next provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider has no record for this observation
    #[error("{provider} has no record for {reference}")]
    NotFound {
        /// Provider name
        provider: String,
        /// Barcode or image hash that was looked up
        reference: String,
    },

    /// Rate limit hit, either upstream (HTTP 429) or in the local limiter
    #[error("{provider} rate limit exceeded{}", retry_hint(.retry_after_secs))]
    RateLimited {
        /// Provider name
        provider: String,
        /// Backoff hint in seconds when the provider supplied one
        retry_after_secs: Option<u64>,
    },

    /// Call exceeded its time budget or the transport failed
    #[error("{provider} did not respond in time: {detail}")]
    Timeout {
        /// Provider name
        provider: String,
        /// Transport detail for logs
        detail: String,
    },

    /// Response could not be parsed or lacked mandatory fields
    #[error("{provider} returned an unusable response: {reason}")]
    MalformedResponse {
        /// Provider name
        provider: String,
        /// What was wrong with the payload
        reason: String,
    },
}

#[allow(clippy::ref_option)]
fn retry_hint(retry_after_secs: &Option<u64>) -> String {
    retry_after_secs.map_or_else(String::new, |secs| format!(" (retry after {secs}s)"))
}

impl ProviderError {
    /// Build a `NotFound` failure
    pub fn not_found(provider: &str, reference: impl Into<String>) -> Self {
        Self::NotFound {
            provider: provider.to_owned(),
            reference: reference.into(),
        }
    }

    /// Build a `RateLimited` failure
    #[must_use]
    pub fn rate_limited(provider: &str, retry_after_secs: Option<u64>) -> Self {
        Self::RateLimited {
            provider: provider.to_owned(),
            retry_after_secs,
        }
    }

    /// Build a `Timeout` failure
    pub fn timeout(provider: &str, detail: impl Into<String>) -> Self {
        Self::Timeout {
            provider: provider.to_owned(),
            detail: detail.into(),
        }
    }

    /// Build a `MalformedResponse` failure
    pub fn malformed(provider: &str, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            provider: provider.to_owned(),
            reason: reason.into(),
        }
    }

    /// Classification of this failure
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::NotFound { .. } => FailureKind::NotFound,
            Self::RateLimited { .. } => FailureKind::RateLimited,
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::MalformedResponse { .. } => FailureKind::MalformedResponse,
        }
    }

    /// Name of the provider that failed
    #[must_use]
    pub fn provider(&self) -> &str {
        match self {
            Self::NotFound { provider, .. }
            | Self::RateLimited { provider, .. }
            | Self::Timeout { provider, .. }
            | Self::MalformedResponse { provider, .. } => provider,
        }
    }

    /// Whether this failure indicates an unhealthy provider
    ///
    /// `NotFound` is a healthy answer and does not count toward opening a circuit.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        !matches!(self, Self::NotFound { .. })
    }

    /// Backoff hint for rate limited failures
    #[must_use]
    pub const fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::RateLimited {
                retry_after_secs, ..
            } => *retry_after_secs,
            _ => None,
        }
    }
}

/// Result alias for provider adapter calls
pub type AdapterResult<T> = Result<T, ProviderError>;
