//! Panel controller: drives the view state through fetch cycles.
//!
//! A cycle is one fetch → gate → settle pass. The controller starts a cycle
//! on mount and on every change notification for its issue. Each cycle
//! publishes `Loading` and then exactly one terminal state.
//!
//! Fetches run as spawned tasks and report back over a channel tagged with
//! their cycle number; only the controller writes the view state. Under
//! [`CyclePolicy::Overlap`] every completion is applied, so a slow earlier
//! response can overwrite a newer one. Under [`CyclePolicy::Latest`]
//! completions from superseded cycles are dropped.

use route_panel_common::{GateResult, IssueSnapshot};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::errors::FetchError;
use crate::gate;
use crate::panel::events::{ChangeSource, Subscription};
use crate::panel::state::ViewState;
use crate::panel_config::CyclePolicy;
use crate::source::IssueSource;

/// Sequence number of a fetch cycle, starting at 1.
pub type CycleId = u64;

struct Completion {
    cycle: CycleId,
    outcome: Result<Option<IssueSnapshot>, FetchError>,
}

/// What one call to [`PanelController::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelStep {
    /// A fetch finished; `applied` is false if its result was discarded.
    Settled { cycle: CycleId, applied: bool },
    /// A change notification started a new cycle.
    Refreshed { cycle: CycleId },
    /// The change feed closed; the subscription has been released.
    FeedClosed,
}

/// Map a fetch outcome to the state it settles into.
pub fn settle(outcome: Result<Option<IssueSnapshot>, FetchError>) -> ViewState {
    match outcome {
        Err(err) => {
            warn!(error = %err, kind = ?err.kind(), "failed to load route data");
            ViewState::load_failed(&err)
        }
        Ok(None) => ViewState::NotApplicable,
        Ok(Some(snapshot)) => match gate::evaluate(&snapshot) {
            GateResult::NotApplicable => ViewState::NotApplicable,
            GateResult::Route(candidate) => ViewState::from_candidate(candidate),
        },
    }
}

pub struct PanelController {
    issue_key: String,
    source: Arc<dyn IssueSource>,
    policy: CyclePolicy,
    state: watch::Sender<ViewState>,
    subscription: Option<Subscription>,
    last_started: CycleId,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    torn_down: bool,
}

enum Wake {
    Completed(Option<Completion>),
    Changed(bool),
}

impl PanelController {
    pub fn new(
        issue_key: impl Into<String>,
        source: Arc<dyn IssueSource>,
        policy: CyclePolicy,
    ) -> Self {
        let (state, _) = watch::channel(ViewState::Loading);
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            issue_key: issue_key.into(),
            source,
            policy,
            state,
            subscription: None,
            last_started: 0,
            completions_tx,
            completions_rx,
            torn_down: false,
        }
    }

    /// Current view state.
    pub fn state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Receiver for the rendering layer; sees every published state.
    pub fn watch(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Register for change notifications, then start the first cycle.
    ///
    /// A failed registration is logged and the panel runs without live
    /// updates; the first cycle still starts.
    pub async fn mount(&mut self, changes: &dyn ChangeSource) -> Option<CycleId> {
        if self.torn_down {
            return None;
        }
        match changes.subscribe(&self.issue_key).await {
            Ok(subscription) => self.subscription = Some(subscription),
            Err(err) => warn!(issue = %self.issue_key, error = %err, "live updates unavailable"),
        }
        self.begin_cycle()
    }

    /// Publish `Loading` and start fetching. No-op after teardown.
    pub fn begin_cycle(&mut self) -> Option<CycleId> {
        if self.torn_down {
            return None;
        }
        self.last_started += 1;
        let cycle = self.last_started;
        self.publish(ViewState::Loading);
        info!(issue = %self.issue_key, cycle, "fetch cycle started");

        let source = Arc::clone(&self.source);
        let key = self.issue_key.clone();
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let outcome = source.fetch_issue(&key).await;
            // The controller may be gone by now; the result is then dropped.
            let _ = tx.send(Completion { cycle, outcome });
        });
        Some(cycle)
    }

    /// Wait for the next fetch completion or change notification and act on it.
    ///
    /// Returns `None` after teardown.
    pub async fn step(&mut self) -> Option<PanelStep> {
        if self.torn_down {
            return None;
        }
        let wake = {
            let completions = &mut self.completions_rx;
            let subscription = self.subscription.as_mut();
            tokio::select! {
                done = completions.recv() => Wake::Completed(done),
                alive = next_change(subscription) => Wake::Changed(alive),
            }
        };

        match wake {
            Wake::Completed(Some(done)) => {
                let cycle = done.cycle;
                let applied = self.apply(done);
                Some(PanelStep::Settled { cycle, applied })
            }
            // The controller holds a sender, so the channel cannot close.
            Wake::Completed(None) => None,
            Wake::Changed(true) => {
                debug!(issue = %self.issue_key, "issue changed, refreshing");
                self.begin_cycle().map(|cycle| PanelStep::Refreshed { cycle })
            }
            Wake::Changed(false) => {
                warn!(issue = %self.issue_key, "change feed closed");
                if let Some(subscription) = self.subscription.take() {
                    subscription.release();
                }
                Some(PanelStep::FeedClosed)
            }
        }
    }

    /// Step until the first cycle settles into a terminal state.
    pub async fn settle_current(&mut self) -> ViewState {
        while self.state.borrow().is_loading() {
            if self.step().await.is_none() {
                break;
            }
        }
        self.state()
    }

    /// Step until `shutdown` resolves, then tear down.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                step = self.step() => {
                    if step.is_none() {
                        break;
                    }
                }
            }
        }
        self.teardown();
    }

    /// Release the subscription. Later completions and notifications are ignored.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        if let Some(subscription) = self.subscription.take() {
            subscription.release();
        }
        info!(issue = %self.issue_key, "panel torn down");
    }

    fn apply(&mut self, done: Completion) -> bool {
        if self.torn_down {
            return false;
        }
        if self.policy == CyclePolicy::Latest && done.cycle < self.last_started {
            debug!(
                issue = %self.issue_key,
                cycle = done.cycle,
                latest = self.last_started,
                "discarding stale fetch result"
            );
            return false;
        }
        let next = settle(done.outcome);
        info!(issue = %self.issue_key, cycle = done.cycle, state = next.label(), "fetch cycle settled");
        self.publish(next);
        true
    }

    fn publish(&self, next: ViewState) {
        self.state.send_replace(next);
    }
}

async fn next_change(subscription: Option<&mut Subscription>) -> bool {
    match subscription {
        Some(subscription) => subscription.changed().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SubscribeError;
    use crate::panel::events::IssueEvents;
    use crate::panel::state::LOAD_FAILED_MESSAGE;
    use crate::test_support::{FixedSource, ScriptedSource, server_error, snapshot};
    use async_trait::async_trait;
    use route_panel_common::RouteCandidate;
    use std::time::Duration;

    fn ready(start: &str, end: &str) -> ViewState {
        ViewState::Ready(RouteCandidate::from_addresses(start, end).unwrap())
    }

    struct RefusingFeed;

    #[async_trait]
    impl ChangeSource for RefusingFeed {
        async fn subscribe(&self, issue_key: &str) -> Result<Subscription, SubscribeError> {
            Err(SubscribeError::Rejected {
                key: issue_key.to_string(),
                reason: "no event bridge".to_string(),
            })
        }
    }

    // ── settle ───────────────────────────────────────────────────────

    #[test]
    fn test_settle_ready() {
        let state = settle(Ok(Some(snapshot(
            "Planned",
            Some("  123 Main St "),
            Some("456 Oak Ave"),
        ))));
        assert_eq!(state, ready("123 Main St", "456 Oak Ave"));
    }

    #[test]
    fn test_settle_wrong_status_is_not_applicable() {
        let state = settle(Ok(Some(snapshot("Done", Some("a"), Some("b")))));
        assert_eq!(state, ViewState::NotApplicable);
    }

    #[test]
    fn test_settle_missing_delivery_is_not_applicable() {
        let state = settle(Ok(Some(snapshot("Ready for pick up", Some("a"), None))));
        assert_eq!(state, ViewState::NotApplicable);
    }

    #[test]
    fn test_settle_no_snapshot_is_not_applicable() {
        assert_eq!(settle(Ok(None)), ViewState::NotApplicable);
    }

    #[test]
    fn test_settle_fetch_error_is_error() {
        match settle(Err(server_error())) {
            ViewState::Error { message } => assert!(message.starts_with(LOAD_FAILED_MESSAGE)),
            other => panic!("Expected Error, got {other:?}"),
        }
    }

    // ── lifecycle ────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_mount_subscribes_and_settles_ready() {
        let source = Arc::new(FixedSource::new(|| {
            Ok(Some(snapshot("Planned", Some("123 Main St"), Some("456 Oak Ave"))))
        }));
        let events = IssueEvents::default();
        let mut panel = PanelController::new("HAUL-42", source.clone(), CyclePolicy::Overlap);
        assert_eq!(panel.state(), ViewState::Loading);

        assert_eq!(panel.mount(&events).await, Some(1));
        assert!(panel.is_subscribed());
        assert_eq!(events.active_subscriptions(), 1);

        let step = panel.step().await;
        assert_eq!(step, Some(PanelStep::Settled { cycle: 1, applied: true }));
        assert_eq!(panel.state(), ready("123 Main St", "456 Oak Ave"));
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_http_500_settles_error() {
        let source = Arc::new(FixedSource::new(|| Err(server_error())));
        let events = IssueEvents::default();
        let mut panel = PanelController::new("HAUL-42", source, CyclePolicy::Overlap);
        panel.mount(&events).await;

        let state = panel.settle_current().await;
        assert!(matches!(state, ViewState::Error { .. }));
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_retried() {
        let source = Arc::new(FixedSource::new(|| Err(server_error())));
        let events = IssueEvents::default();
        let mut panel = PanelController::new("HAUL-42", source.clone(), CyclePolicy::Overlap);
        panel.mount(&events).await;
        panel.settle_current().await;

        let idle = tokio::time::timeout(Duration::from_millis(50), panel.step()).await;
        assert!(idle.is_err(), "no further work without a notification");
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_change_notification_starts_new_cycle() {
        let source = Arc::new(ScriptedSource::default());
        let first = source.expect_fetch();
        let second = source.expect_fetch();
        let events = IssueEvents::default();
        let mut panel = PanelController::new("HAUL-42", source.clone(), CyclePolicy::Overlap);
        let mut view = panel.watch();

        panel.mount(&events).await;
        first.send(Ok(Some(snapshot("Done", Some("a"), Some("b"))))).unwrap();
        assert_eq!(panel.settle_current().await, ViewState::NotApplicable);

        events.publish("HAUL-42");
        assert_eq!(panel.step().await, Some(PanelStep::Refreshed { cycle: 2 }));
        assert_eq!(panel.state(), ViewState::Loading);
        view.borrow_and_update();

        second
            .send(Ok(Some(snapshot("Planned", Some("a"), Some("b")))))
            .unwrap();
        assert_eq!(
            panel.step().await,
            Some(PanelStep::Settled { cycle: 2, applied: true })
        );
        assert!(view.has_changed().unwrap());
        assert_eq!(*view.borrow(), ready("a", "b"));
    }

    #[tokio::test]
    async fn test_notifications_for_other_issues_are_ignored() {
        let source = Arc::new(FixedSource::new(|| Ok(None)));
        let events = IssueEvents::default();
        let mut panel = PanelController::new("HAUL-42", source.clone(), CyclePolicy::Overlap);
        panel.mount(&events).await;
        panel.settle_current().await;

        events.publish("HAUL-7");
        let idle = tokio::time::timeout(Duration::from_millis(50), panel.step()).await;
        assert!(idle.is_err());
        assert_eq!(source.calls(), 1);
    }

    // ── overlapping cycles ───────────────────────────────────────────

    /// Cycle 1 is slow; a notification starts cycle 2, which answers first.
    async fn race(policy: CyclePolicy) -> (PanelController, Vec<PanelStep>) {
        let source = Arc::new(ScriptedSource::default());
        let slow = source.expect_fetch();
        let fast = source.expect_fetch();
        let events = IssueEvents::default();
        let mut panel = PanelController::new("HAUL-42", source.clone(), policy);

        panel.mount(&events).await;
        source.wait_for_calls(1).await;

        events.publish("HAUL-42");
        let mut steps = vec![panel.step().await.unwrap()];
        source.wait_for_calls(2).await;

        fast.send(Ok(Some(snapshot("Planned", Some("New Pickup"), Some("New Drop")))))
            .unwrap();
        steps.push(panel.step().await.unwrap());

        slow.send(Ok(Some(snapshot("Planned", Some("Old Pickup"), Some("Old Drop")))))
            .unwrap();
        steps.push(panel.step().await.unwrap());

        (panel, steps)
    }

    #[tokio::test]
    async fn test_overlap_policy_last_arrival_wins() {
        let (panel, steps) = race(CyclePolicy::Overlap).await;
        assert_eq!(
            steps,
            vec![
                PanelStep::Refreshed { cycle: 2 },
                PanelStep::Settled { cycle: 2, applied: true },
                PanelStep::Settled { cycle: 1, applied: true },
            ]
        );
        // The stale response arrived last and overwrote the newer one.
        assert_eq!(panel.state(), ready("Old Pickup", "Old Drop"));
    }

    #[tokio::test]
    async fn test_latest_policy_discards_stale_result() {
        let (panel, steps) = race(CyclePolicy::Latest).await;
        assert_eq!(
            steps,
            vec![
                PanelStep::Refreshed { cycle: 2 },
                PanelStep::Settled { cycle: 2, applied: true },
                PanelStep::Settled { cycle: 1, applied: false },
            ]
        );
        assert_eq!(panel.state(), ready("New Pickup", "New Drop"));
    }

    #[tokio::test]
    async fn test_overlap_policy_earlier_completion_settles_while_newer_is_pending() {
        let source = Arc::new(ScriptedSource::default());
        let first = source.expect_fetch();
        let _second = source.expect_fetch();
        let events = IssueEvents::default();
        let mut panel = PanelController::new("HAUL-42", source.clone(), CyclePolicy::Overlap);

        panel.mount(&events).await;
        source.wait_for_calls(1).await;
        events.publish("HAUL-42");
        panel.step().await;

        first.send(Ok(None)).unwrap();
        assert_eq!(
            panel.step().await,
            Some(PanelStep::Settled { cycle: 1, applied: true })
        );
        assert_eq!(panel.state(), ViewState::NotApplicable);
    }

    // ── teardown ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_teardown_releases_subscription_once() {
        let source = Arc::new(FixedSource::new(|| Ok(None)));
        let events = IssueEvents::default();
        let mut panel = PanelController::new("HAUL-42", source, CyclePolicy::Overlap);
        panel.mount(&events).await;
        assert_eq!(events.active_subscriptions(), 1);

        panel.teardown();
        assert_eq!(events.active_subscriptions(), 0);
        assert!(!panel.is_subscribed());

        panel.teardown();
        assert_eq!(events.active_subscriptions(), 0);
        assert!(panel.is_torn_down());
    }

    #[tokio::test]
    async fn test_no_transitions_after_teardown() {
        let source = Arc::new(ScriptedSource::default());
        let reply = source.expect_fetch();
        let events = IssueEvents::default();
        let mut panel = PanelController::new("HAUL-42", source.clone(), CyclePolicy::Overlap);

        panel.mount(&events).await;
        source.wait_for_calls(1).await;
        panel.teardown();

        // The outstanding fetch still completes, but nothing is applied.
        reply
            .send(Ok(Some(snapshot("Planned", Some("a"), Some("b")))))
            .unwrap();
        tokio::task::yield_now().await;
        assert_eq!(panel.step().await, None);
        assert_eq!(panel.begin_cycle(), None);
        assert_eq!(panel.state(), ViewState::Loading);
        assert_eq!(panel.mount(&events).await, None);
        assert_eq!(events.active_subscriptions(), 0);
    }

    #[tokio::test]
    async fn test_dropping_controller_releases_subscription() {
        let source = Arc::new(FixedSource::new(|| Ok(None)));
        let events = IssueEvents::default();
        {
            let mut panel = PanelController::new("HAUL-42", source, CyclePolicy::Overlap);
            panel.mount(&events).await;
            assert_eq!(events.active_subscriptions(), 1);
        }
        assert_eq!(events.active_subscriptions(), 0);
    }

    #[tokio::test]
    async fn test_subscribe_failure_still_fetches() {
        let source = Arc::new(FixedSource::new(|| {
            Ok(Some(snapshot("Planned", Some("a"), Some("b"))))
        }));
        let mut panel = PanelController::new("HAUL-42", source.clone(), CyclePolicy::Overlap);

        assert_eq!(panel.mount(&RefusingFeed).await, Some(1));
        assert!(!panel.is_subscribed());
        assert_eq!(panel.settle_current().await, ready("a", "b"));
    }

    #[tokio::test]
    async fn test_feed_closed_releases_subscription() {
        let source = Arc::new(FixedSource::new(|| Ok(None)));
        let events = IssueEvents::default();
        let mut panel = PanelController::new("HAUL-42", source, CyclePolicy::Overlap);
        panel.mount(&events).await;
        panel.settle_current().await;
        assert!(panel.is_subscribed());

        drop(events);
        assert_eq!(panel.step().await, Some(PanelStep::FeedClosed));
        assert!(!panel.is_subscribed());
    }

    #[tokio::test]
    async fn test_run_until_shutdown_tears_down() {
        let source = Arc::new(FixedSource::new(|| {
            Ok(Some(snapshot("Planned", Some("a"), Some("b"))))
        }));
        let events = IssueEvents::default();
        let mut panel = PanelController::new("HAUL-42", source.clone(), CyclePolicy::Latest);
        let mut view = panel.watch();
        panel.mount(&events).await;

        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let publisher = events.clone();
        let driver = tokio::spawn(async move {
            panel
                .run(async {
                    let _ = stop_rx.await;
                })
                .await;
            panel
        });

        view.wait_for(|s| s.is_terminal()).await.unwrap();
        publisher.publish("HAUL-42");
        tokio::time::timeout(Duration::from_secs(5), async {
            while source.calls() < 2 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
        view.wait_for(|s| s.is_terminal()).await.unwrap();

        stop_tx.send(()).unwrap();
        let panel = driver.await.unwrap();
        assert!(panel.is_torn_down());
        assert_eq!(events.active_subscriptions(), 0);
        assert_eq!(*view.borrow(), ready("a", "b"));
    }
}
