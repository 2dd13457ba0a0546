//! Route risk scoring agent.
//!
//! Builds a lossless per-route prompt from the enriched waypoints, sends it
//! to the configured LLM provider, and enforces the structured output
//! contract on the reply.

use safe_routes_models::{CrimeData, RiskResult, Route};
use serde::Deserialize;

use crate::providers::{self, LlmProvider};
use crate::{AiError, RouteScorer};

/// System prompt establishing the scoring rubric and output contract.
const SYSTEM_PROMPT: &str = "\
You are a route safety analyst. You assess the theft and crime risk of \
driving routes based on recent incident data sampled along the route.

Score each route on a scale of 1 to 100:
- 1-20: Very low risk. Little to no recent criminal activity.
- 21-40: Low risk. Sparse, minor incidents.
- 41-60: Moderate risk. Regular incidents along parts of the route.
- 61-80: High risk. Frequent or serious incidents along the route.
- 81-100: Very high risk. Dense, serious criminal activity.

Consider the density of incidents relative to route length, the severity \
of the offense types (violent crime and vehicle theft weigh more than \
petty theft), and how incidents cluster along the route. Where crime data \
is missing or a lookup failed, acknowledge the uncertainty in your \
analysis rather than treating the gap as zero risk.

Respond with ONLY a JSON object, no markdown fences and no prose outside \
it, in exactly this shape:
{\"risk_score\": <integer 1-100>, \"analysis\": \"<2-4 sentence assessment>\"}";

/// Structured output the model is instructed to produce.
#[derive(Deserialize)]
struct RawAssessment {
    risk_score: i64,
    analysis: String,
}

/// Builds the per-route user prompt.
///
/// Deterministic and total: every waypoint appears in traversal order, and
/// every incident the enricher attached is included verbatim. The model
/// performs the summarization step, so nothing is aggregated here.
#[must_use]
pub fn build_prompt(route: &Route) -> String {
    use std::fmt::Write as _;

    let mut prompt = String::new();

    let _ = writeln!(prompt, "Route {}: {}", route.route_id, route.summary);
    let _ = writeln!(
        prompt,
        "Distance: {} miles, Duration: {} minutes",
        route.distance_miles, route.duration_minutes
    );
    let _ = writeln!(prompt, "From: {}", route.start_address);
    let _ = writeln!(prompt, "To: {}", route.end_address);
    let _ = writeln!(
        prompt,
        "\nCrime data sampled at {} points along the route:",
        route.waypoints.len()
    );

    for (i, waypoint) in route.waypoints.iter().enumerate() {
        let _ = writeln!(
            prompt,
            "\n--- Waypoint {} ({:.5}, {:.5}) ---",
            i + 1,
            waypoint.latitude,
            waypoint.longitude
        );

        match &waypoint.crime_data {
            Some(CrimeData::Incidents(data)) => {
                if data.incidents.is_empty() {
                    let _ = writeln!(prompt, "No incidents reported");
                } else {
                    let _ = writeln!(
                        prompt,
                        "{} total incidents in the past two weeks, showing {}:",
                        data.total_incidents, data.incidents_returned
                    );
                    for incident in &data.incidents {
                        let _ =
                            writeln!(prompt, "- {} ({})", incident.offense, incident.incident_date);
                    }
                }
            }
            Some(CrimeData::Error(err)) => {
                let _ = writeln!(prompt, "Crime data unavailable: {}", err.error);
            }
            None => {
                let _ = writeln!(prompt, "Crime data unavailable: no lookup performed");
            }
        }
    }

    prompt.push_str("\nAssess the overall theft and crime risk of this route.");

    prompt
}

/// Extracts the first JSON object from model output.
///
/// Tolerates markdown code fences and prose around the object by slicing
/// from the first `{` to the last `}`.
fn extract_json(text: &str) -> Result<&str, AiError> {
    let start = text.find('{').ok_or_else(|| AiError::Schema {
        message: "no JSON object in model output".to_string(),
    })?;
    let end = text.rfind('}').ok_or_else(|| AiError::Schema {
        message: "unterminated JSON object in model output".to_string(),
    })?;

    if end < start {
        return Err(AiError::Schema {
            message: "malformed JSON object in model output".to_string(),
        });
    }

    Ok(&text[start..=end])
}

/// Validates the structured output contract.
fn validate(raw: RawAssessment) -> Result<(u8, String), AiError> {
    if !(1..=100).contains(&raw.risk_score) {
        return Err(AiError::Schema {
            message: format!("risk_score {} outside [1, 100]", raw.risk_score),
        });
    }

    if raw.analysis.trim().is_empty() {
        return Err(AiError::Schema {
            message: "empty analysis".to_string(),
        });
    }

    let score = u8::try_from(raw.risk_score).map_err(|_| AiError::Schema {
        message: format!("risk_score {} outside [1, 100]", raw.risk_score),
    })?;

    Ok((score, raw.analysis))
}

/// LLM-backed implementation of [`RouteScorer`].
pub struct RiskAgent {
    provider: Box<dyn LlmProvider>,
}

impl RiskAgent {
    /// Creates a risk agent with the given provider.
    #[must_use]
    pub fn new(provider: Box<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// Creates a risk agent from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Config`] if no provider credentials are found.
    pub fn from_env() -> Result<Self, AiError> {
        Ok(Self::new(providers::create_provider_from_env()?))
    }

    async fn try_assess(&self, route: &Route) -> Result<(u8, String), AiError> {
        let prompt = build_prompt(route);
        let output = self.provider.complete(SYSTEM_PROMPT, &prompt).await?;
        let raw: RawAssessment = serde_json::from_str(extract_json(&output)?)?;
        validate(raw)
    }
}

#[async_trait::async_trait]
impl RouteScorer for RiskAgent {
    async fn assess(&self, route: &Route) -> RiskResult {
        match self.try_assess(route).await {
            Ok((score, analysis)) => {
                log::debug!(
                    "Route {} assessed: risk_score={score}",
                    route.route_id
                );
                RiskResult::success(route.route_id, score, analysis)
            }
            Err(e) => {
                log::error!("Risk assessment failed for route {}: {e}", route.route_id);
                RiskResult::failed(route.route_id, e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use safe_routes_models::{
        CrimeIncidents, CrimeLookupError, Incident, Location, RiskStatus, Waypoint,
    };

    use super::*;

    struct FixedProvider {
        output: String,
    }

    #[async_trait::async_trait]
    impl LlmProvider for FixedProvider {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, AiError> {
            Ok(self.output.clone())
        }
    }

    struct FailingProvider;

    #[async_trait::async_trait]
    impl LlmProvider for FailingProvider {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, AiError> {
            Err(AiError::Provider {
                message: "upstream unavailable".to_string(),
            })
        }
    }

    fn enriched_route() -> Route {
        Route {
            route_id: 2,
            summary: "Lake Shore Dr".to_string(),
            distance_miles: 4.1,
            duration_minutes: 18,
            start_address: "233 S Wacker Dr, Chicago, IL".to_string(),
            end_address: "600 E Grand Ave, Chicago, IL".to_string(),
            polyline: "_p~iF~ps|U".to_string(),
            waypoints: vec![
                Waypoint {
                    crime_data: Some(CrimeData::Incidents(CrimeIncidents {
                        total_incidents: 7,
                        incidents: vec![
                            Incident {
                                offense: "THEFT".to_string(),
                                incident_date: "2026-08-10".to_string(),
                            },
                            Incident {
                                offense: "MOTOR VEHICLE THEFT".to_string(),
                                incident_date: "2026-08-12".to_string(),
                            },
                        ],
                        incidents_returned: 2,
                        location: Location {
                            lat: 41.878,
                            lon: -87.636,
                        },
                    })),
                    ..Waypoint::at(41.878, -87.636)
                },
                Waypoint {
                    crime_data: Some(CrimeData::Incidents(CrimeIncidents {
                        total_incidents: 0,
                        incidents: vec![],
                        incidents_returned: 0,
                        location: Location {
                            lat: 41.885,
                            lon: -87.617,
                        },
                    })),
                    ..Waypoint::at(41.885, -87.617)
                },
                Waypoint {
                    crime_data: Some(CrimeData::Error(CrimeLookupError {
                        error: "Rate limit exceeded".to_string(),
                        status_code: Some(429),
                        location: Location {
                            lat: 41.891,
                            lon: -87.613,
                        },
                    })),
                    ..Waypoint::at(41.891, -87.613)
                },
            ],
            traffic: None,
        }
    }

    #[test]
    fn prompt_includes_every_waypoint_in_order() {
        let prompt = build_prompt(&enriched_route());

        let first = prompt.find("--- Waypoint 1 (41.87800, -87.63600) ---").unwrap();
        let second = prompt.find("--- Waypoint 2 (41.88500, -87.61700) ---").unwrap();
        let third = prompt.find("--- Waypoint 3 (41.89100, -87.61300) ---").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn prompt_lists_incidents_verbatim() {
        let prompt = build_prompt(&enriched_route());

        assert!(prompt.contains("7 total incidents in the past two weeks, showing 2:"));
        assert!(prompt.contains("- THEFT (2026-08-10)"));
        assert!(prompt.contains("- MOTOR VEHICLE THEFT (2026-08-12)"));
    }

    #[test]
    fn prompt_marks_clean_and_failed_waypoints() {
        let prompt = build_prompt(&enriched_route());

        assert!(prompt.contains("No incidents reported"));
        assert!(prompt.contains("Crime data unavailable: Rate limit exceeded"));
    }

    #[tokio::test]
    async fn fully_rate_limited_route_is_still_scoreable() {
        let mut route = enriched_route();
        for wp in &mut route.waypoints {
            wp.crime_data = Some(CrimeData::Error(CrimeLookupError {
                error: "Rate limit exceeded".to_string(),
                status_code: Some(429),
                location: Location {
                    lat: wp.latitude,
                    lon: wp.longitude,
                },
            }));
        }

        let prompt = build_prompt(&route);
        assert_eq!(prompt.matches("Crime data unavailable").count(), 3);

        let agent = RiskAgent::new(Box::new(FixedProvider {
            output: "{\"risk_score\": 40, \"analysis\": \"Data gaps limit confidence.\"}"
                .to_string(),
        }));
        let result = agent.assess(&route).await;
        assert_eq!(result.status, RiskStatus::Success);
        assert_eq!(result.risk_score, Some(40));
    }

    #[test]
    fn prompt_is_deterministic() {
        let route = enriched_route();
        assert_eq!(build_prompt(&route), build_prompt(&route));
    }

    #[test]
    fn extract_json_handles_code_fences() {
        let output = "```json\n{\"risk_score\": 42, \"analysis\": \"ok\"}\n```";
        let json = extract_json(output).unwrap();
        assert_eq!(json, "{\"risk_score\": 42, \"analysis\": \"ok\"}");
    }

    #[test]
    fn extract_json_handles_bare_object() {
        let output = "{\"risk_score\": 42, \"analysis\": \"ok\"}";
        assert_eq!(extract_json(output).unwrap(), output);
    }

    #[test]
    fn extract_json_rejects_prose_only_output() {
        assert!(extract_json("I cannot assess this route.").is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_score() {
        let raw = RawAssessment {
            risk_score: 0,
            analysis: "fine".to_string(),
        };
        assert!(validate(raw).is_err());

        let raw = RawAssessment {
            risk_score: 101,
            analysis: "fine".to_string(),
        };
        assert!(validate(raw).is_err());
    }

    #[test]
    fn validate_rejects_blank_analysis() {
        let raw = RawAssessment {
            risk_score: 50,
            analysis: "   ".to_string(),
        };
        assert!(validate(raw).is_err());
    }

    #[tokio::test]
    async fn assess_returns_success_for_valid_output() {
        let agent = RiskAgent::new(Box::new(FixedProvider {
            output: "{\"risk_score\": 55, \"analysis\": \"Moderate theft activity.\"}"
                .to_string(),
        }));

        let result = agent.assess(&enriched_route()).await;

        assert_eq!(result.status, RiskStatus::Success);
        assert_eq!(result.route_id, 2);
        assert_eq!(result.risk_score, Some(55));
        assert_eq!(result.analysis.as_deref(), Some("Moderate theft activity."));
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn assess_returns_failed_for_provider_error() {
        let agent = RiskAgent::new(Box::new(FailingProvider));

        let result = agent.assess(&enriched_route()).await;

        assert_eq!(result.status, RiskStatus::Failed);
        assert_eq!(result.risk_score, None);
        assert!(result.error.unwrap().contains("upstream unavailable"));
    }

    #[tokio::test]
    async fn assess_returns_failed_for_invalid_schema() {
        let agent = RiskAgent::new(Box::new(FixedProvider {
            output: "{\"risk_score\": 250, \"analysis\": \"impossible\"}".to_string(),
        }));

        let result = agent.assess(&enriched_route()).await;

        assert_eq!(result.status, RiskStatus::Failed);
        assert!(result.error.unwrap().contains("outside [1, 100]"));
    }
}
