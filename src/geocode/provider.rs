//! Place search providers: the lookup seam and the Google Places client.

use super::types::{Candidate, GeocodeError, Position};
use crate::config::GeocoderConfig;
use serde::Deserialize;
use std::time::Duration;

/// Anything that can turn a free-text query into candidate places.
pub trait PlaceSearch {
    fn find_places(&self, query: &str) -> Result<Vec<Candidate>, GeocodeError>;
}

// ─── Google Places "find place from text" ───────────────────────

#[derive(Deserialize, Debug)]
struct FindPlaceResponse {
    #[serde(default)]
    candidates: Option<Vec<RawCandidate>>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawCandidate {
    #[serde(default)]
    name: String,
    geometry: RawGeometry,
}

#[derive(Deserialize, Debug)]
struct RawGeometry {
    location: RawLocation,
}

#[derive(Deserialize, Debug)]
struct RawLocation {
    lat: f64,
    lng: f64,
}

impl From<RawCandidate> for Candidate {
    fn from(raw: RawCandidate) -> Self {
        Candidate {
            name: raw.name,
            position: Position::new(raw.geometry.location.lat, raw.geometry.location.lng),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CandidateList {
    Bare(Vec<RawCandidate>),
    Response(FindPlaceResponse),
}

/// Parse a Places API response body into candidates.
pub fn parse_find_place_response(body: &str) -> Result<Vec<Candidate>, GeocodeError> {
    let response: FindPlaceResponse =
        serde_json::from_str(body).map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;
    candidates_from_response(response)
}

/// Parse either a full Places response or a bare array of provider candidates.
pub fn parse_candidate_list(json: &str) -> Result<Vec<Candidate>, GeocodeError> {
    match serde_json::from_str(json).map_err(|e| GeocodeError::InvalidResponse(e.to_string()))? {
        CandidateList::Bare(raw) => Ok(raw.into_iter().map(Candidate::from).collect()),
        CandidateList::Response(response) => candidates_from_response(response),
    }
}

fn candidates_from_response(response: FindPlaceResponse) -> Result<Vec<Candidate>, GeocodeError> {
    match response.status.as_deref() {
        None | Some("OK") => {}
        Some("ZERO_RESULTS") => return Ok(Vec::new()),
        Some(status) => {
            return Err(GeocodeError::Provider {
                status: status.to_string(),
                message: response.error_message.unwrap_or_default(),
            })
        }
    }

    let raw = response
        .candidates
        .ok_or_else(|| GeocodeError::InvalidResponse("no candidates field".into()))?;
    Ok(raw.into_iter().map(Candidate::from).collect())
}

/// Client for the Google Places API.
pub struct GooglePlaces {
    agent: ureq::Agent,
    api_key: String,
    url: String,
}

impl GooglePlaces {
    pub fn new(config: &GeocoderConfig) -> Result<Self, GeocodeError> {
        if !config.has_api_key() {
            return Err(GeocodeError::MissingApiKey);
        }
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("unlogeo/", env!("CARGO_PKG_VERSION")))
            .build();
        Ok(Self {
            agent,
            api_key: config.api_key.trim().to_string(),
            url: format!(
                "{}/place/findplacefromtext/json",
                config.endpoint.trim_end_matches('/')
            ),
        })
    }
}

impl PlaceSearch for GooglePlaces {
    fn find_places(&self, query: &str) -> Result<Vec<Candidate>, GeocodeError> {
        tracing::debug!(query, "places request");
        let response = self
            .agent
            .get(&self.url)
            .query("key", &self.api_key)
            .query("input", query)
            .query("inputtype", "textquery")
            .query("fields", "geometry/location,name")
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => GeocodeError::Status(code),
                ureq::Error::Transport(t) => GeocodeError::Network(t.to_string()),
            })?;

        let body = response
            .into_string()
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;
        parse_find_place_response(&body)
    }
}
