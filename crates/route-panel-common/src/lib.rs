//! Shared domain types for the route panel.
//!
//! These types cross every seam of the system: the Jira adapter produces
//! [`IssueSnapshot`]s, the gate turns them into a [`GateResult`], and the
//! panel controller and resolver hand [`RouteCandidate`]s to the rendering
//! layer.

use serde::{Deserialize, Serialize};

/// Address fields of an issue, keyed by logical name rather than tracker field id.
///
/// The adapter maps the tracker's custom field identifiers onto these two
/// slots once, at the boundary. `None` means the field was absent or null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressFields {
    pub pickup: Option<String>,
    pub delivery: Option<String>,
}

impl AddressFields {
    pub fn new(pickup: Option<&str>, delivery: Option<&str>) -> Self {
        Self {
            pickup: pickup.map(str::to_string),
            delivery: delivery.map(str::to_string),
        }
    }
}

/// Read-only view of one issue as fetched from the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSnapshot {
    pub key: String,
    pub status: String,
    pub fields: AddressFields,
}

impl IssueSnapshot {
    pub fn new(key: impl Into<String>, status: impl Into<String>, fields: AddressFields) -> Self {
        Self {
            key: key.into(),
            status: status.into(),
            fields,
        }
    }
}

/// A pickup/delivery address pair ready for link construction.
///
/// Candidates built through [`RouteCandidate::from_addresses`] are always
/// trimmed and non-empty. The fields stay public because candidates also
/// arrive deserialized from the resolver boundary, where that guarantee does
/// not hold; use [`RouteCandidate::is_complete`] to re-check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteCandidate {
    pub start: String,
    pub end: String,
}

impl RouteCandidate {
    /// Build a candidate from raw addresses, trimming both.
    /// Returns `None` if either is blank.
    pub fn from_addresses(start: &str, end: &str) -> Option<Self> {
        let start = start.trim();
        let end = end.trim();
        if start.is_empty() || end.is_empty() {
            return None;
        }
        Some(Self {
            start: start.to_string(),
            end: end.to_string(),
        })
    }

    /// Both addresses present and non-blank.
    pub fn is_complete(&self) -> bool {
        !self.start.trim().is_empty() && !self.end.trim().is_empty()
    }
}

/// Outcome of gating one issue snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum GateResult {
    /// The panel does not apply to this issue.
    NotApplicable,
    /// The issue qualifies; the candidate holds its trimmed addresses.
    Route(RouteCandidate),
}

impl GateResult {
    pub fn is_applicable(&self) -> bool {
        matches!(self, Self::Route(_))
    }

    pub fn candidate(&self) -> Option<&RouteCandidate> {
        match self {
            Self::Route(candidate) => Some(candidate),
            Self::NotApplicable => None,
        }
    }

    pub fn into_candidate(self) -> Option<RouteCandidate> {
        match self {
            Self::Route(candidate) => Some(candidate),
            Self::NotApplicable => None,
        }
    }
}
