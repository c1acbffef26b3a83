//! View state of the route panel.

use route_panel_common::RouteCandidate;
use serde::Serialize;

use crate::errors::FetchError;

/// Prefix of the message shown when the issue could not be loaded.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load route data";

/// Message shown when a positive gate result still lacks an address.
pub const MISSING_ADDRESS_MESSAGE: &str = "Missing address information";

/// What the rendering layer shows. Exactly one is active at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewState {
    /// A fetch cycle is in flight
    #[default]
    Loading,
    /// The issue does not qualify for the panel
    NotApplicable,
    /// The issue could not be loaded or its addresses failed validation
    Error { message: String },
    /// A route can be shown
    Ready(RouteCandidate),
}

impl ViewState {
    /// Error state for a failed fetch.
    pub fn load_failed(err: &FetchError) -> Self {
        ViewState::Error {
            message: format!("{}: {}", LOAD_FAILED_MESSAGE, err),
        }
    }

    /// `Ready` if the candidate has both addresses, otherwise an error.
    pub fn from_candidate(candidate: RouteCandidate) -> Self {
        if candidate.is_complete() {
            ViewState::Ready(candidate)
        } else {
            ViewState::Error {
                message: MISSING_ADDRESS_MESSAGE.to_string(),
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Check if a fetch cycle has settled into a final state.
    pub fn is_terminal(&self) -> bool {
        !self.is_loading()
    }

    pub fn candidate(&self) -> Option<&RouteCandidate> {
        match self {
            Self::Ready(candidate) => Some(candidate),
            _ => None,
        }
    }

    /// Short name for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::NotApplicable => "not_applicable",
            Self::Error { .. } => "error",
            Self::Ready(_) => "ready",
        }
    }
}
