#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Driving route retrieval for risk analysis.
//!
//! Fetches route alternatives from the Google Directions API, converts
//! them into domain [`Route`]s, samples crime-probe waypoints from each
//! overview polyline at a density-adaptive interval, and classifies
//! real-time traffic. Routes leave this crate already sampled — sampling
//! always happens before enrichment.

pub mod directions;
pub mod traffic;

use safe_routes_models::Route;
use thiserror::Error;

pub use directions::DirectionsClient;

/// Errors from route retrieval.
#[derive(Debug, Error)]
pub enum MapsError {
    /// Missing or invalid configuration; fatal before any network call.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of what is missing.
        message: String,
    },

    /// No route exists between the given addresses.
    #[error("No routes found between '{origin}' and '{destination}'")]
    NoRouteFound {
        /// The requested origin address.
        origin: String,
        /// The requested destination address.
        destination: String,
    },

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response did not have the expected shape.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Route geometry failed to decode.
    #[error(transparent)]
    Polyline(#[from] safe_routes_geo::PolylineError),
}

/// A source of driving route alternatives between two addresses.
#[async_trait::async_trait]
pub trait RouteSource: Send + Sync {
    /// Fetches route alternatives, waypoints already sampled.
    ///
    /// # Errors
    ///
    /// Returns [`MapsError::Config`] when no API key is configured and
    /// [`MapsError::NoRouteFound`] when no route exists between the
    /// addresses.
    async fn fetch_routes(
        &self,
        origin: &str,
        destination: &str,
        include_traffic: bool,
    ) -> Result<Vec<Route>, MapsError>;
}
