//! Crimeometer incident API client.
//!
//! Queries the `/incidents/raw-data` endpoint with a fixed 14-day window,
//! 0.25 mile radius, and a 5-incident result cap. The client holds one
//! reusable `reqwest::Client`; per-request timeouts are set on the request
//! builder.

use chrono::{Duration, Utc};
use safe_routes_models::{CrimeData, CrimeIncidents, CrimeLookupError, Incident, Location,
    INCIDENT_LIMIT};

use crate::{CrimeSource, DAYS_BACK, RADIUS_MILES};

/// Default API base URL when `CRIME_API_BASE_URL` is not set.
const DEFAULT_BASE_URL: &str = "https://api.crimeometer.com/v1";

/// Per-request deadline in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client for the Crimeometer incident API.
pub struct CrimeClient {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl CrimeClient {
    /// Creates a client from `CRIME_API_KEY` and `CRIME_API_BASE_URL`.
    ///
    /// A missing API key does not fail construction: every lookup then
    /// returns a [`CrimeData::Error`] naming the missing key, keeping the
    /// failure local to the waypoints it affects.
    #[must_use]
    pub fn from_env() -> Self {
        let api_key = std::env::var("CRIME_API_KEY").ok().filter(|k| !k.is_empty());
        if api_key.is_none() {
            log::warn!("CRIME_API_KEY not set; crime lookups will return errors");
        }

        Self {
            api_key,
            base_url: std::env::var("CRIME_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            client: reqwest::Client::new(),
        }
    }

    /// Computes the `(datetime_ini, datetime_end)` pair for the query
    /// window, formatted as `yyyy-MM-ddT00:00:00.000Z`.
    fn date_range(days_back: i64) -> (String, String) {
        let now = Utc::now();
        let start = now - Duration::days(days_back);

        let fmt = "%Y-%m-%dT00:00:00.000Z";
        (start.format(fmt).to_string(), now.format(fmt).to_string())
    }
}

#[async_trait::async_trait]
impl CrimeSource for CrimeClient {
    async fn incidents(&self, latitude: f64, longitude: f64) -> CrimeData {
        let location = Location {
            lat: latitude,
            lon: longitude,
        };

        let Some(api_key) = &self.api_key else {
            return CrimeData::Error(CrimeLookupError {
                error: "CRIME_API_KEY not set".to_string(),
                status_code: None,
                location,
            });
        };

        let (datetime_ini, datetime_end) = Self::date_range(DAYS_BACK);
        let url = format!("{}/incidents/raw-data", self.base_url);

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("distance", format!("{RADIUS_MILES}mi")),
                ("datetime_ini", datetime_ini),
                ("datetime_end", datetime_end),
                ("page", "1".to_string()),
            ])
            .header("Content-Type", "application/json")
            .header("x-api-key", api_key)
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .send()
            .await;

        let resp = match resp {
            Ok(resp) => resp,
            Err(e) => {
                log::error!("crime lookup request failed: {e}");
                return CrimeData::Error(CrimeLookupError {
                    error: e.to_string(),
                    status_code: None,
                    location,
                });
            }
        };

        let status = resp.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return CrimeData::Error(CrimeLookupError {
                error: "Rate limit exceeded".to_string(),
                status_code: Some(status.as_u16()),
                location,
            });
        }

        if !status.is_success() {
            log::error!("crime lookup returned HTTP {status}");
            return CrimeData::Error(CrimeLookupError {
                error: format!("HTTP {}", status.as_u16()),
                status_code: Some(status.as_u16()),
                location,
            });
        }

        match resp.json::<serde_json::Value>().await {
            Ok(body) => parse_raw_data(&body, location),
            Err(e) => {
                log::error!("crime lookup body parse failed: {e}");
                CrimeData::Error(CrimeLookupError {
                    error: e.to_string(),
                    status_code: None,
                    location,
                })
            }
        }
    }
}

/// Parses a raw-data response body into [`CrimeData`].
///
/// The upstream returns a list with one element; anything else counts as
/// zero incidents. Incidents are truncated to [`INCIDENT_LIMIT`] in
/// upstream order — no sort beyond what the API gives.
fn parse_raw_data(body: &serde_json::Value, location: Location) -> CrimeData {
    let Some(result) = body.as_array().and_then(|entries| entries.first()) else {
        return CrimeData::Incidents(CrimeIncidents {
            total_incidents: 0,
            incidents: Vec::new(),
            incidents_returned: 0,
            location,
        });
    };

    let total_incidents = result
        .get("total_incidents")
        .and_then(serde_json::Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0);

    let incidents: Vec<Incident> = result
        .get("incidents")
        .and_then(serde_json::Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .take(INCIDENT_LIMIT)
                .map(|entry| {
                    serde_json::from_value(entry.clone()).unwrap_or_else(|_| Incident {
                        offense: "Unknown".to_string(),
                        incident_date: "Unknown date".to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let incidents_returned = incidents.len();

    CrimeData::Incidents(CrimeIncidents {
        total_incidents,
        incidents,
        incidents_returned,
        location,
    })
}
