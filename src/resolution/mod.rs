// ABOUTME: Resolution orchestrator driving provider chains, confidence scoring, and personalization
// ABOUTME: Exposes the resolver, its builder, and the chain types it is assembled from
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Resolution
//!
//! A [`NutritionResolver`] owns one [`ResolutionChain`] per observation kind.
//! A request moves through an explicit state machine:
//!
//! ```text
//! Start -> (cache hit) ------------------------> PersonalizationApply -> Done
//!       -> TryProvider(0) -> TryProvider(1) ... -^
//!                         \-> Unresolved (chain exhausted, deadline, invalid input)
//! ```
//!
//! Provider calls are sequential. Each call is bounded by the smaller of the
//! provider timeout and the request deadline, and is dropped (cancelling the
//! underlying HTTP request) when that bound elapses.

mod builder;
/// Provider stages and fallback policy
pub mod chain;
mod factory;
mod resolver;

pub use builder::ResolverBuilder;
pub use chain::{ChainStage, FallbackPolicy, ResolutionChain};
pub use resolver::{NutritionResolver, ResolverSettings};
