// ABOUTME: Shared HTTP client with connection pooling for provider API calls
// ABOUTME: Maps HTTP statuses and transport errors onto the provider failure taxonomy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::http::{CLIENT_CONNECT_TIMEOUT_SECS, CLIENT_TIMEOUT_SECS};
use crate::errors::{AdapterResult, ProviderError};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, ClientBuilder, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;

/// Configured timeout values for the shared client
static CLIENT_TIMEOUTS: OnceLock<(u64, u64)> = OnceLock::new();

/// Global shared HTTP client with configured timeouts
static SHARED_CLIENT: OnceLock<Client> = OnceLock::new();

/// Initialize the shared HTTP client timeout configuration
///
/// Must be called once at startup before any adapter is constructed.
/// If not called, defaults are used (15s timeout, 5s connect timeout).
pub fn initialize_shared_client(timeout_secs: u64, connect_timeout_secs: u64) {
    let _ = CLIENT_TIMEOUTS.set((timeout_secs, connect_timeout_secs));
}

/// Get the shared HTTP client for provider API calls
///
/// The orchestrator's per-provider deadline is usually tighter than these
/// timeouts; they only bound calls made outside a resolution request.
pub fn shared_client() -> &'static Client {
    SHARED_CLIENT.get_or_init(|| {
        let (timeout, connect_timeout) = CLIENT_TIMEOUTS
            .get()
            .copied()
            .unwrap_or((CLIENT_TIMEOUT_SECS, CLIENT_CONNECT_TIMEOUT_SECS));

        ClientBuilder::new()
            .timeout(Duration::from_secs(timeout))
            .connect_timeout(Duration::from_secs(connect_timeout))
            .build()
            .unwrap_or_else(|_| Client::new())
    })
}

/// Send a request and decode a JSON body, classifying every failure
///
/// # Errors
///
/// - `NotFound` for HTTP 404
/// - `RateLimited` for HTTP 429, with the `Retry-After` seconds when present
/// - `MalformedResponse` for other non-success statuses and undecodable bodies
/// - `Timeout` for request timeouts and transport failures
pub async fn fetch_json<T: DeserializeOwned>(
    provider: &str,
    reference: &str,
    request: RequestBuilder,
) -> AdapterResult<T> {
    let response = request
        .send()
        .await
        .map_err(|e| transport_error(provider, &e))?;

    let status = response.status();
    debug!(provider, %status, "Received provider response");

    if !status.is_success() {
        return Err(status_error(provider, reference, status, response.headers()));
    }

    let body = response
        .text()
        .await
        .map_err(|e| transport_error(provider, &e))?;

    serde_json::from_str(&body)
        .map_err(|e| ProviderError::malformed(provider, format!("JSON parse error: {e}")))
}

/// Classify a non-success HTTP status
#[must_use]
pub fn status_error(
    provider: &str,
    reference: &str,
    status: StatusCode,
    headers: &HeaderMap,
) -> ProviderError {
    match status {
        StatusCode::NOT_FOUND => ProviderError::not_found(provider, reference),
        StatusCode::TOO_MANY_REQUESTS => {
            ProviderError::rate_limited(provider, retry_after_secs(headers))
        }
        other => ProviderError::malformed(provider, format!("HTTP {other}")),
    }
}

/// Classify a `reqwest` transport error
#[must_use]
pub fn transport_error(provider: &str, error: &reqwest::Error) -> ProviderError {
    if error.is_decode() {
        ProviderError::malformed(provider, error.to_string())
    } else {
        ProviderError::timeout(provider, error.to_string())
    }
}

/// Barcode usable as a URL path segment
///
/// # Errors
///
/// Returns `NotFound` for codes with anything but ASCII letters and digits,
/// which no product database indexes and which must not reach a URL path.
pub fn path_code<'a>(provider: &str, code: &'a str) -> AdapterResult<&'a str> {
    if !code.is_empty() && code.bytes().all(|b| b.is_ascii_alphanumeric()) {
        Ok(code)
    } else {
        Err(ProviderError::not_found(provider, code))
    }
}

/// Parse a delta-seconds `Retry-After` header
fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}
