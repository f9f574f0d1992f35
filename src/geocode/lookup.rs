//! Geocoder: sends a place name to a provider and settles multi-match results.
//!
//! Flow:  search → none: unresolved → one: use it → many: disambiguate → tie: unresolved

use super::disambiguate::pick_candidate;
use super::provider::PlaceSearch;
use super::types::{Candidate, GeocodeError, Resolution, ResolveMethod, UnresolvedReason};

/// Options for building the search text.
#[derive(Debug, Clone)]
pub struct LookupOptions {
    /// Append " port" to names that do not already mention a port.
    pub append_port_suffix: bool,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self { append_port_suffix: true }
    }
}

/// Resolves place names through a [`PlaceSearch`] backend.
pub struct Geocoder<S> {
    search: S,
    opts: LookupOptions,
}

impl<S: PlaceSearch> Geocoder<S> {
    pub fn new(search: S, opts: LookupOptions) -> Self {
        Self { search, opts }
    }

    /// The text actually sent to the provider for `place_name`.
    pub fn search_text(&self, place_name: &str) -> String {
        if self.opts.append_port_suffix && !place_name.to_lowercase().contains("port") {
            format!("{} port", place_name)
        } else {
            place_name.to_string()
        }
    }

    /// Resolve one place name. Failures are reported as unresolved, never as errors.
    pub fn resolve(&self, place_name: &str) -> Resolution {
        self.resolve_from(place_name, self.candidates(place_name))
    }

    /// Settle a search result already fetched with [`Geocoder::candidates`],
    /// so callers that also show the raw list send only one request.
    pub fn resolve_from(
        &self,
        place_name: &str,
        fetched: Result<Vec<Candidate>, GeocodeError>,
    ) -> Resolution {
        let candidates = match fetched {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(place = place_name, error = %e, "place search failed");
                return Resolution::unresolved(UnresolvedReason::RequestFailed(e.to_string()));
            }
        };

        match candidates.as_slice() {
            [] => {
                tracing::info!(place = place_name, "no candidates");
                Resolution::unresolved(UnresolvedReason::NoCandidates)
            }
            [only] => Resolution::Resolved {
                candidate: only.clone(),
                method: ResolveMethod::Single,
            },
            _ => {
                let among = candidates.len();
                tracing::info!(
                    place = place_name,
                    among,
                    names = ?candidates.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
                    "more than one candidate"
                );
                match pick_candidate(place_name, &candidates) {
                    Some(chosen) => {
                        tracing::info!(place = place_name, chosen = %chosen.name, "decided");
                        Resolution::Resolved {
                            candidate: chosen.clone(),
                            method: ResolveMethod::Disambiguated { among },
                        }
                    }
                    None => Resolution::unresolved(UnresolvedReason::Ambiguous { among }),
                }
            }
        }
    }

    /// Raw candidates for a place name, without disambiguation.
    pub fn candidates(&self, place_name: &str) -> Result<Vec<Candidate>, GeocodeError> {
        self.search.find_places(&self.search_text(place_name))
    }
}
