//! Host-side resolver: fetch an issue and run the gate in one call.
//!
//! Failures come back as `Err`, distinct from `NotApplicable`, so callers can
//! tell "this issue has no route" from "we could not find out".

use route_panel_common::{GateResult, RouteCandidate};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::instrument;

use crate::errors::FetchError;
use crate::gate;
use crate::source::IssueSource;

/// Result of resolving one issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Route(RouteCandidate),
    NotApplicable,
}

impl Resolution {
    /// `{"start": .., "end": ..}` for a route, `null` otherwise.
    pub fn to_json(&self) -> Value {
        match self {
            Resolution::Route(candidate) => json!({
                "start": candidate.start,
                "end": candidate.end,
            }),
            Resolution::NotApplicable => Value::Null,
        }
    }

    pub fn candidate(&self) -> Option<&RouteCandidate> {
        match self {
            Resolution::Route(candidate) => Some(candidate),
            Resolution::NotApplicable => None,
        }
    }
}

impl From<GateResult> for Resolution {
    fn from(result: GateResult) -> Self {
        match result {
            GateResult::Route(candidate) => Resolution::Route(candidate),
            GateResult::NotApplicable => Resolution::NotApplicable,
        }
    }
}

pub struct Resolver {
    source: Arc<dyn IssueSource>,
}

impl Resolver {
    pub fn new(source: Arc<dyn IssueSource>) -> Self {
        Self { source }
    }

    #[instrument(skip(self))]
    pub async fn fetch_issue_details(&self, key: &str) -> Result<Resolution, FetchError> {
        match self.source.fetch_issue(key).await? {
            Some(snapshot) => Ok(gate::evaluate(&snapshot).into()),
            None => Ok(Resolution::NotApplicable),
        }
    }
}
