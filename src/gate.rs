//! Issue gate: decides whether the route panel applies to an issue.
//!
//! Rules, applied in order and short-circuiting:
//! 1. The status (case-insensitive) must be `planned` or `ready for pick up`.
//! 2. Pickup and delivery must both be present and non-blank.
//!
//! A qualifying issue yields a [`RouteCandidate`] with trimmed addresses.

use route_panel_common::{GateResult, IssueSnapshot, RouteCandidate};
use tracing::debug;

/// Statuses for which the panel is shown, already lower-cased.
pub const ACCEPTED_STATUSES: &[&str] = &["planned", "ready for pick up"];

/// Check whether a tracker status qualifies for the panel.
pub fn is_accepted_status(status: &str) -> bool {
    let normalized = status.to_lowercase();
    ACCEPTED_STATUSES.contains(&normalized.as_str())
}

/// Classify an issue snapshot. Pure and total.
pub fn evaluate(snapshot: &IssueSnapshot) -> GateResult {
    if !is_accepted_status(&snapshot.status) {
        debug!(issue = %snapshot.key, status = %snapshot.status, "status not eligible for route panel");
        return GateResult::NotApplicable;
    }

    let Some(pickup) = present(snapshot.fields.pickup.as_deref()) else {
        debug!(issue = %snapshot.key, "missing pickup address");
        return GateResult::NotApplicable;
    };
    let Some(delivery) = present(snapshot.fields.delivery.as_deref()) else {
        debug!(issue = %snapshot.key, "missing delivery address");
        return GateResult::NotApplicable;
    };

    match RouteCandidate::from_addresses(pickup, delivery) {
        Some(candidate) => GateResult::Route(candidate),
        None => GateResult::NotApplicable,
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
