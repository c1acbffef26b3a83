//! Typed error hierarchy for the route panel.
//!
//! Two enums cover the two external seams:
//! - `FetchError` - issue fetch failures (transport, HTTP status, payload shape)
//! - `SubscribeError` - change-notification registration failures
//!
//! Gating failures are not errors: an issue that does not qualify yields
//! `GateResult::NotApplicable`.

use thiserror::Error;

/// Errors from the issue fetch adapter.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid issue key '{key}'")]
    InvalidKey { key: String },

    #[error("Request to issue tracker failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Issue tracker returned HTTP {status} for {key}")]
    Status { key: String, status: u16 },

    #[error("Malformed issue payload: {0}")]
    Shape(String),
}

/// Coarse classification of a [`FetchError`], for logging and the view layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Rejected locally before any request was made
    Input,
    Transport,
    Shape,
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::InvalidKey { .. } => FetchErrorKind::Input,
            FetchError::Transport(_) | FetchError::Status { .. } => FetchErrorKind::Transport,
            FetchError::Shape(_) => FetchErrorKind::Shape,
        }
    }
}

/// Errors from registering with a change-notification source.
#[derive(Debug, Error)]
pub enum SubscribeError {
    #[error("Change feed for {key} is closed")]
    Closed { key: String },

    #[error("Failed to subscribe to changes for {key}: {reason}")]
    Rejected { key: String, reason: String },
}
