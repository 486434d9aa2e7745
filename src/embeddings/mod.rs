// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text embedding generation
//!
//! Provides the provider seam used to reach an external embedding service
//! and the client that applies timeouts, bounded retries and result
//! validation around it.
//!
//! Key features:
//! - OpenAI-compatible HTTP provider
//! - Per-attempt timeout with a configurable retry budget
//! - Shape validation against the requested text count and dimensions

pub mod client;
pub mod openai;
pub mod provider;

pub use client::{CallOutcome, EmbeddingClient, EmbeddingFailure, RetryPolicy};
pub use openai::OpenAiEmbeddingProvider;
pub use provider::{EmbeddingProvider, ProviderError};
