// ABOUTME: Sliding-window rate limiter placed in front of each provider adapter
// ABOUTME: Refuses calls locally with a retry hint instead of spending upstream quota
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::{AdapterResult, ProviderError};
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Sliding-window limiter: at most `limit` calls per `window`
///
/// Unlike a waiting limiter, [`RateLimiter::acquire`] never sleeps: a
/// resolution request has a deadline, so an exhausted window is reported as
/// `RateLimited` and the orchestrator moves on to the next provider.
#[derive(Debug)]
pub struct RateLimiter {
    requests: Mutex<VecDeque<Instant>>,
    limit: u32,
    window: Duration,
}

impl RateLimiter {
    /// Limit to `limit` calls per `window`; a limit of zero disables limiting
    #[must_use]
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            requests: Mutex::new(VecDeque::new()),
            limit,
            window,
        }
    }

    /// Limit to `limit` calls per minute
    #[must_use]
    pub fn per_minute(limit: u32) -> Self {
        Self::new(limit, Duration::from_secs(60))
    }

    /// Take a slot for one call
    ///
    /// # Errors
    ///
    /// Returns `RateLimited` with the seconds until the oldest call leaves the
    /// window when no slot is free.
    pub async fn acquire(&self, provider: &str) -> AdapterResult<()> {
        if self.limit == 0 {
            return Ok(());
        }

        let now = Instant::now();
        let mut requests = self.requests.lock().await;
        while requests
            .front()
            .is_some_and(|&t| now.duration_since(t) >= self.window)
        {
            requests.pop_front();
        }

        if requests.len() >= self.limit as usize {
            let retry_after = requests.front().map(|&oldest| {
                self.window
                    .saturating_sub(now.duration_since(oldest))
                    .as_secs()
                    .max(1)
            });
            drop(requests);
            return Err(ProviderError::rate_limited(provider, retry_after));
        }

        requests.push_back(now);
        Ok(())
    }
}
