//! Turns tracker revisions into change notifications.
//!
//! The tracker has no push channel we can reach from a terminal, so the
//! poller asks for the issue's `updated` stamp on an interval and publishes
//! an [`IssueChanged`](crate::panel::events::IssueChanged) event whenever it
//! moves.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::panel::events::IssueEvents;
use crate::source::RevisionProbe;

pub struct ChangePoller {
    probe: Arc<dyn RevisionProbe>,
    events: IssueEvents,
    issue_key: String,
    interval: Duration,
}

impl ChangePoller {
    pub fn new(
        probe: Arc<dyn RevisionProbe>,
        events: IssueEvents,
        issue_key: impl Into<String>,
        interval: Duration,
    ) -> Self {
        Self {
            probe,
            events,
            issue_key: issue_key.into(),
            interval: interval.max(Duration::from_secs(1)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Probe once. The first revision seen is the baseline; any later
    /// different revision publishes a change. Returns true if it published.
    pub async fn poll_once(&self, last: &mut Option<String>) -> bool {
        let revision = match self.probe.revision(&self.issue_key).await {
            Ok(revision) => revision,
            Err(e) => {
                warn!(issue = %self.issue_key, error = %e, "revision probe failed");
                return false;
            }
        };

        match last.replace(revision.clone()) {
            None => {
                debug!(issue = %self.issue_key, %revision, "baseline revision");
                false
            }
            Some(previous) if previous == revision => false,
            Some(previous) => {
                info!(issue = %self.issue_key, %previous, %revision, "issue updated");
                self.events.publish(&self.issue_key);
                true
            }
        }
    }

    /// Poll forever. Ticks missed while a probe is slow are skipped.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last = None;
        loop {
            ticker.tick().await;
            self.poll_once(&mut last).await;
        }
    }

    /// Run on a background task that stops when the guard is dropped.
    pub fn spawn(self) -> PollerGuard {
        PollerGuard {
            handle: tokio::spawn(self.run()),
        }
    }
}

/// Aborts the polling task on drop.
pub struct PollerGuard {
    handle: JoinHandle<()>,
}

impl Drop for PollerGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
