// ABOUTME: Resolution orchestrator driving cache, provider chain, confidence scoring, and personalization
// ABOUTME: Explicit per-request state machine with per-provider timeouts and a hard request deadline
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::chain::{ChainStage, FallbackPolicy, ResolutionChain};
use crate::cache::ResponseCache;
use crate::confidence;
use crate::constants::resolution::FAR_FUTURE_SECS;
use crate::errors::{ProviderError, Unresolved, UnresolvedReason};
use crate::logging::PipelineLogger;
use crate::models::{
    AppliedPersonalization, AttemptOutcome, ConfidenceTier, Observation, ObservationKind,
    ProviderAttempt, ProviderResult, ResolvedNutrition, SkipReason,
};
use crate::personalization::{personalize, PortionStore};
use std::cmp;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Timing settings fixed at construction
#[derive(Debug, Clone, Copy)]
pub struct ResolverSettings {
    /// Upper bound for a single provider call
    pub provider_timeout: Duration,
    /// TTL given to results written into the response cache
    pub cache_ttl: Duration,
    /// Request budget used by [`NutritionResolver::resolve_default`]
    pub request_budget: Duration,
}

/// A result the orchestrator has decided to return
#[derive(Debug)]
struct Accepted {
    result: ProviderResult,
    tier: ConfidenceTier,
    from_cache: bool,
}

/// Per-request state
#[derive(Debug)]
enum State {
    Start,
    TryProvider(usize),
    PersonalizationApply(Accepted),
    Done(Accepted, Option<AppliedPersonalization>),
    Unresolved(UnresolvedReason),
}

/// Mutable bookkeeping for one request
#[derive(Default)]
struct Progress {
    attempts: Vec<ProviderAttempt>,
    /// Best low-tier result so far; earlier stages win ties
    candidate: Option<(ProviderResult, ConfidenceTier)>,
    /// Whether the last stage's outcome allows a failure-only fallback to run
    fallback_armed: bool,
}

impl Progress {
    fn record(&mut self, provider: &str, outcome: AttemptOutcome, started: Instant) {
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.attempts
            .push(ProviderAttempt::new(provider, outcome, elapsed_ms));
    }

    fn offer_candidate(&mut self, result: ProviderResult, tier: ConfidenceTier) {
        let better = self
            .candidate
            .as_ref()
            .is_none_or(|(_, best)| tier > *best);
        if better {
            self.candidate = Some((result, tier));
        }
    }
}

/// Outcome of a single stage call
enum StageOutcome {
    Resolved(ProviderResult),
    Failed(ProviderError),
    DeadlineElapsed,
}

/// `from + after`, saturating to a far-future instant instead of overflowing
fn deadline_after(from: Instant, after: Duration) -> Instant {
    from.checked_add(after)
        .unwrap_or_else(|| from + Duration::from_secs(FAR_FUTURE_SECS))
}

/// Resolves observations to nutrition records
///
/// Shared across concurrent requests through `Arc`; chains, cache, and store
/// are all `Send + Sync`. Build one with [`NutritionResolver::builder`] or
/// [`NutritionResolver::from_config`].
pub struct NutritionResolver {
    photo_chain: ResolutionChain,
    barcode_chain: ResolutionChain,
    cache: Arc<dyn ResponseCache>,
    store: Arc<dyn PortionStore>,
    settings: ResolverSettings,
}

impl NutritionResolver {
    pub(super) fn from_parts(
        photo_chain: ResolutionChain,
        barcode_chain: ResolutionChain,
        cache: Arc<dyn ResponseCache>,
        store: Arc<dyn PortionStore>,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            photo_chain,
            barcode_chain,
            cache,
            store,
            settings,
        }
    }

    /// Chain used for an observation kind
    #[must_use]
    pub const fn chain(&self, kind: ObservationKind) -> &ResolutionChain {
        match kind {
            ObservationKind::Photo => &self.photo_chain,
            ObservationKind::Barcode => &self.barcode_chain,
        }
    }

    /// Response cache in front of the chains
    #[must_use]
    pub fn cache(&self) -> &Arc<dyn ResponseCache> {
        &self.cache
    }

    /// Personalization store, for wiring a history writer
    #[must_use]
    pub fn personalization(&self) -> &Arc<dyn PortionStore> {
        &self.store
    }

    /// Timing settings
    #[must_use]
    pub const fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Resolve with a relative time budget
    ///
    /// # Errors
    ///
    /// Returns [`Unresolved`] when no usable result was found in time
    pub async fn resolve_within(
        &self,
        observation: &Observation,
        user_id: Uuid,
        budget: Duration,
    ) -> Result<ResolvedNutrition, Unresolved> {
        self.resolve(observation, user_id, deadline_after(Instant::now(), budget))
            .await
    }

    /// Resolve with the configured request budget
    ///
    /// # Errors
    ///
    /// Returns [`Unresolved`] when no usable result was found in time
    pub async fn resolve_default(
        &self,
        observation: &Observation,
        user_id: Uuid,
    ) -> Result<ResolvedNutrition, Unresolved> {
        self.resolve_within(observation, user_id, self.settings.request_budget)
            .await
    }

    /// Resolve an observation for a user before `deadline`
    ///
    /// Providers are tried in precedence order until one yields a `moderate`
    /// or `high` result. If the chain ends with only `low` results the best of
    /// them is returned. An expired deadline abandons the in-flight provider
    /// call immediately.
    ///
    /// # Errors
    ///
    /// Returns [`Unresolved`] with the attempt trace when the observation is
    /// invalid, every provider failed, or the deadline elapsed
    #[instrument(skip(self, observation, deadline), fields(kind = %observation.kind(), reference = %observation.reference()))]
    pub async fn resolve(
        &self,
        observation: &Observation,
        user_id: Uuid,
        deadline: Instant,
    ) -> Result<ResolvedNutrition, Unresolved> {
        let chain = self.chain(observation.kind());
        let mut progress = Progress::default();
        let mut state = State::Start;

        loop {
            state = match state {
                State::Start => self.start(observation).await,
                State::TryProvider(index) => {
                    self.try_provider(chain, index, observation, deadline, &mut progress)
                        .await
                }
                State::PersonalizationApply(accepted) => {
                    let applied = self.lookup_personalization(user_id, &accepted.result).await;
                    State::Done(accepted, applied)
                }
                State::Done(accepted, personalization) => {
                    return Ok(self
                        .finish(observation, accepted, personalization, progress)
                        .await);
                }
                State::Unresolved(reason) => {
                    info!(
                        reason = ?reason,
                        attempts = progress.attempts.len(),
                        "Observation unresolved"
                    );
                    return Err(Unresolved::new(reason, progress.attempts));
                }
            };
        }
    }

    async fn start(&self, observation: &Observation) -> State {
        if !observation.is_resolvable() {
            return State::Unresolved(UnresolvedReason::InvalidObservation);
        }

        let key = observation.cache_key();
        match self.cache.get(&key).await {
            Ok(Some(result)) => {
                let tier = confidence::score(&result);
                debug!(key = %key, provider = %result.provider, %tier, "Response cache hit");
                State::PersonalizationApply(Accepted {
                    result,
                    tier,
                    from_cache: true,
                })
            }
            Ok(None) => State::TryProvider(0),
            Err(e) => {
                warn!(key = %key, error = %e, "Response cache read failed, treating as miss");
                State::TryProvider(0)
            }
        }
    }

    async fn try_provider(
        &self,
        chain: &ResolutionChain,
        index: usize,
        observation: &Observation,
        deadline: Instant,
        progress: &mut Progress,
    ) -> State {
        let Some(stage) = chain.stage(index) else {
            return progress.candidate.take().map_or(
                State::Unresolved(UnresolvedReason::ChainExhausted),
                |(result, tier)| {
                    info!(provider = %result.provider, %tier, "Chain exhausted, accepting best candidate");
                    State::PersonalizationApply(Accepted {
                        result,
                        tier,
                        from_cache: false,
                    })
                },
            );
        };
        let next = State::TryProvider(index + 1);

        if Instant::now() >= deadline {
            return State::Unresolved(UnresolvedReason::DeadlineExceeded);
        }

        if let Some(reason) = Self::skip_reason(stage, observation, progress.fallback_armed) {
            debug!(provider = stage.name(), reason = ?reason, "Skipping provider stage");
            if reason == SkipReason::CircuitOpen {
                progress.fallback_armed = true;
            }
            progress
                .attempts
                .push(ProviderAttempt::skipped(stage.name(), reason));
            return next;
        }

        let started = Instant::now();
        match self.call_stage(stage, observation, deadline).await {
            StageOutcome::DeadlineElapsed => {
                warn!(provider = stage.name(), "Request deadline elapsed during provider call");
                progress.record(stage.name(), AttemptOutcome::Cancelled, started);
                State::Unresolved(UnresolvedReason::DeadlineExceeded)
            }
            StageOutcome::Failed(error) => {
                warn!(provider = stage.name(), kind = %error.kind(), error = %error, "Provider failed");
                progress.fallback_armed = FallbackPolicy::arms_fallback(error.kind());
                progress.record(
                    stage.name(),
                    AttemptOutcome::Failed {
                        kind: error.kind(),
                        detail: error.to_string(),
                    },
                    started,
                );
                next
            }
            StageOutcome::Resolved(result) => {
                progress.fallback_armed = false;
                let tier = confidence::score(&result);
                if tier.is_acceptable() {
                    info!(provider = stage.name(), %tier, dish = %result.dish_name, "Provider result accepted");
                    progress.record(stage.name(), AttemptOutcome::Accepted { tier }, started);
                    return State::PersonalizationApply(Accepted {
                        result,
                        tier,
                        from_cache: false,
                    });
                }
                debug!(provider = stage.name(), confidence = result.confidence, "Low confidence result, continuing");
                progress.record(stage.name(), AttemptOutcome::LowConfidence, started);
                progress.offer_candidate(result, tier);
                next
            }
        }
    }

    fn skip_reason(
        stage: &ChainStage,
        observation: &Observation,
        fallback_armed: bool,
    ) -> Option<SkipReason> {
        if stage.policy() == FallbackPolicy::OnTransportFailure && !fallback_armed {
            return Some(SkipReason::FallbackNotTriggered);
        }
        if !stage.supports(observation) {
            return Some(SkipReason::RegionUnsupported);
        }
        if !stage.breaker().is_allowed() {
            return Some(SkipReason::CircuitOpen);
        }
        None
    }

    /// Call a provider bounded by `min(deadline, now + provider timeout)`
    ///
    /// Dropping the adapter future on expiry cancels its in-flight request.
    async fn call_stage(
        &self,
        stage: &ChainStage,
        observation: &Observation,
        deadline: Instant,
    ) -> StageOutcome {
        let provider_deadline = deadline_after(Instant::now(), self.settings.provider_timeout);
        let call_deadline = cmp::min(deadline, provider_deadline);

        match timeout_at(call_deadline, stage.provider().resolve(observation)).await {
            Ok(outcome) => {
                stage.breaker().record(&outcome);
                match outcome {
                    Ok(result) => StageOutcome::Resolved(result),
                    Err(error) => StageOutcome::Failed(error),
                }
            }
            Err(_) if call_deadline >= deadline => StageOutcome::DeadlineElapsed,
            Err(_) => {
                stage.breaker().record_failure();
                StageOutcome::Failed(ProviderError::timeout(
                    stage.name(),
                    format!(
                        "no response within {}ms",
                        self.settings.provider_timeout.as_millis()
                    ),
                ))
            }
        }
    }

    async fn lookup_personalization(
        &self,
        user_id: Uuid,
        result: &ProviderResult,
    ) -> Option<AppliedPersonalization> {
        match self.store.get(user_id, &result.dish_name).await {
            Ok(entry) => {
                let applied = personalize(result, entry.as_ref());
                if let Some(applied) = &applied {
                    debug!(
                        dish = %result.dish_name,
                        multiplier = applied.multiplier,
                        usual_portion_grams = applied.usual_portion_grams,
                        "Applied portion personalization"
                    );
                }
                applied
            }
            Err(e) => {
                warn!(error = %e, dish = %result.dish_name, "Personalization lookup failed, using provider portion");
                None
            }
        }
    }

    async fn finish(
        &self,
        observation: &Observation,
        accepted: Accepted,
        personalization: Option<AppliedPersonalization>,
        progress: Progress,
    ) -> ResolvedNutrition {
        if !accepted.from_cache {
            let key = observation.cache_key();
            if let Err(e) = self
                .cache
                .put(&key, &accepted.result, self.settings.cache_ttl)
                .await
            {
                warn!(key = %key, error = %e, "Response cache write failed");
            }
        }

        let resolved = ResolvedNutrition {
            result: accepted.result,
            tier: accepted.tier,
            personalization,
            from_cache: accepted.from_cache,
            attempts: progress.attempts,
        };
        PipelineLogger::log_resolution(observation.kind(), &resolved);
        resolved
    }
}
