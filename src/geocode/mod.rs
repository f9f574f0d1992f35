//! Geocoding subsystem for port names.
//!
//! Provides the place search seam, a Google Places client, the name
//! similarity metric, and the candidate disambiguator.

pub mod disambiguate;
pub mod lookup;
pub mod provider;
pub mod similarity;
pub mod types;

pub use disambiguate::pick_candidate;
pub use lookup::{Geocoder, LookupOptions};
pub use provider::{parse_candidate_list, GooglePlaces, PlaceSearch};
pub use similarity::{similarity, Similarity};
pub use types::{Candidate, GeocodeError, Position, Resolution, ResolveMethod, UnresolvedReason};
