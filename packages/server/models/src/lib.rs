#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the route risk server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the pipeline types to allow independent evolution of the API
//! contract.

use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// Query parameters for the analyze endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeQueryParams {
    /// Starting address.
    pub origin: String,
    /// Destination address.
    pub destination: String,
    /// Whether to include real-time traffic. Defaults to true.
    pub include_traffic: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_params_accept_camel_case() {
        let params: AnalyzeQueryParams = serde_json::from_value(serde_json::json!({
            "origin": "233 S Wacker Dr, Chicago, IL",
            "destination": "600 E Grand Ave, Chicago, IL",
            "includeTraffic": false
        }))
        .unwrap();

        assert_eq!(params.origin, "233 S Wacker Dr, Chicago, IL");
        assert_eq!(params.include_traffic, Some(false));
    }

    #[test]
    fn include_traffic_is_optional() {
        let params: AnalyzeQueryParams = serde_json::from_value(serde_json::json!({
            "origin": "A",
            "destination": "B"
        }))
        .unwrap();

        assert_eq!(params.include_traffic, None);
    }
}
