#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! LLM-backed route risk scoring.
//!
//! Supports Anthropic Claude and any `OpenAI`-compatible endpoint via a
//! common provider trait. The [`scorer::RiskAgent`] builds a lossless
//! per-route prompt — the model sees every incident, not a summary, because
//! it performs the summarization and judgment step itself — and enforces
//! the structured output contract: an integer risk score in `[1, 100]` and
//! a non-empty analysis.

pub mod providers;
pub mod scorer;

use safe_routes_models::{RiskResult, Route};
use thiserror::Error;

pub use scorer::RiskAgent;

/// Errors that can occur during AI operations.
#[derive(Debug, Error)]
pub enum AiError {
    /// HTTP request to the LLM provider failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider-specific error.
    #[error("Provider error: {message}")]
    Provider {
        /// Description of what went wrong.
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },

    /// Model output violated the structured output contract.
    #[error("Schema error: {message}")]
    Schema {
        /// Which constraint was violated.
        message: String,
    },
}

/// Produces a risk assessment for an enriched route.
///
/// Infallible by contract: scoring failures are encoded in the returned
/// [`RiskResult`] as `status: failed`, never raised, so one route's failure
/// cannot abort its siblings.
#[async_trait::async_trait]
pub trait RouteScorer: Send + Sync {
    /// Scores a single enriched route.
    async fn assess(&self, route: &Route) -> RiskResult;
}
