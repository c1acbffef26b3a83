//! Seams to the issue tracker.
//!
//! Real implementation: `JiraClient`. Tests substitute scripted sources.

use async_trait::async_trait;
use route_panel_common::IssueSnapshot;

use crate::errors::FetchError;

/// Retrieves the current snapshot of an issue.
#[async_trait]
pub trait IssueSource: Send + Sync {
    /// `Ok(None)` means host-side gating already excluded the issue; it is
    /// not an error and is never returned for a failed request.
    async fn fetch_issue(&self, key: &str) -> Result<Option<IssueSnapshot>, FetchError>;
}

/// Reports an opaque revision marker for an issue, changing whenever the
/// issue changes. Used to turn polling into change notifications.
#[async_trait]
pub trait RevisionProbe: Send + Sync {
    async fn revision(&self, key: &str) -> Result<String, FetchError>;
}
