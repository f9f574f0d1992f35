//! Core types for the geocoding subsystem.

use serde::Serialize;
use std::fmt;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
}

impl Position {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A provider's proposed match for a place name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub name: String,
    pub position: Position,
}

impl Candidate {
    pub fn new(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            name: name.into(),
            position: Position::new(lat, lng),
        }
    }
}

/// How a resolved candidate was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolveMethod {
    /// The provider returned exactly one candidate.
    Single,
    /// The disambiguator picked one out of `among` candidates.
    Disambiguated { among: usize },
}

/// Why a query was left unresolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum UnresolvedReason {
    NoCandidates,
    /// Several distinctly named candidates tied for the best score.
    Ambiguous { among: usize },
    RequestFailed(String),
}

/// Outcome of geocoding one place name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Resolution {
    Resolved {
        candidate: Candidate,
        method: ResolveMethod,
    },
    Unresolved {
        reason: UnresolvedReason,
    },
}

impl Resolution {
    pub fn unresolved(reason: UnresolvedReason) -> Self {
        Self::Unresolved { reason }
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            Self::Resolved { candidate, .. } => Some(candidate.position),
            Self::Unresolved { .. } => None,
        }
    }

    /// Short status label, as written to the batch output.
    pub fn status(&self) -> &'static str {
        match self {
            Self::Resolved { method: ResolveMethod::Single, .. } => "single",
            Self::Resolved { method: ResolveMethod::Disambiguated { .. }, .. } => "disambiguated",
            Self::Unresolved { reason: UnresolvedReason::NoCandidates } => "no_candidates",
            Self::Unresolved { reason: UnresolvedReason::Ambiguous { .. } } => "ambiguous",
            Self::Unresolved { reason: UnresolvedReason::RequestFailed(_) } => "request_failed",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved { candidate, method } => {
                write!(
                    f,
                    "{} ({:.4}, {:.4})",
                    candidate.name, candidate.position.lat, candidate.position.lng
                )?;
                if let ResolveMethod::Disambiguated { among } = method {
                    write!(f, " [picked from {} candidates]", among)?;
                }
                Ok(())
            }
            Self::Unresolved { reason } => match reason {
                UnresolvedReason::NoCandidates => write!(f, "no candidates"),
                UnresolvedReason::Ambiguous { among } => {
                    write!(f, "ambiguous: {} candidates tie on name similarity", among)
                }
                UnresolvedReason::RequestFailed(msg) => write!(f, "request failed: {}", msg),
            },
        }
    }
}

/// Geocoding provider errors.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("no API key configured (set GCPAPIKEY or api_key in the config file)")]
    MissingApiKey,
    #[error("network error: {0}")]
    Network(String),
    #[error("provider returned HTTP {0}")]
    Status(u16),
    #[error("provider status {status}: {message}")]
    Provider { status: String, message: String },
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}
