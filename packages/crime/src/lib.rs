#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Crime incident lookups and waypoint enrichment.
//!
//! The [`CrimeSource`] trait is the seam between the enrichment pipeline and
//! the upstream incident API. Implementations never return `Err`: rate
//! limits, HTTP failures, and transport errors all surface as
//! [`CrimeData::Error`] values so a failed lookup stays local to its
//! waypoint and the rest of the route proceeds with partial data.

pub mod client;
pub mod enrich;

use safe_routes_models::CrimeData;

pub use client::CrimeClient;
pub use enrich::{enrich_route, enrich_routes, enrich_waypoint};

/// Search radius for incident lookups, in miles.
pub const RADIUS_MILES: f64 = 0.25;

/// Incident query window, in days before now.
pub const DAYS_BACK: i64 = 14;

/// A source of time-windowed crime incident data for a coordinate.
#[async_trait::async_trait]
pub trait CrimeSource: Send + Sync {
    /// Looks up incidents near a coordinate over the fixed query window.
    ///
    /// Infallible by contract: failures are encoded in the returned
    /// [`CrimeData`], never raised.
    async fn incidents(&self, latitude: f64, longitude: f64) -> CrimeData;
}
