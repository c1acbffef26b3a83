//! Change notifications for issues.
//!
//! `IssueEvents` is an in-process broadcast hub. Subscribing returns an owned
//! [`Subscription`]; dropping it (or calling [`Subscription::release`]) is the
//! only way to unregister, so release happens exactly once on every exit path.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::errors::SubscribeError;

/// Name of the change channel, for logs.
pub const ISSUE_CHANGED: &str = "issue_changed";

const DEFAULT_CAPACITY: usize = 64;

/// An issue changed in the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueChanged {
    pub key: String,
}

/// A source of change notifications the panel can register with.
#[async_trait]
pub trait ChangeSource: Send + Sync {
    async fn subscribe(&self, issue_key: &str) -> Result<Subscription, SubscribeError>;
}

/// Broadcast hub for [`IssueChanged`] events.
#[derive(Clone)]
pub struct IssueEvents {
    tx: broadcast::Sender<IssueChanged>,
    active: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
}

impl Default for IssueEvents {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl IssueEvents {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            active: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Announce that `key` changed. Returns how many receivers saw it;
    /// zero is not an error.
    pub fn publish(&self, key: &str) -> usize {
        self.tx
            .send(IssueChanged {
                key: key.to_string(),
            })
            .unwrap_or(0)
    }

    /// Number of subscriptions not yet released.
    pub fn active_subscriptions(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Refuse new subscriptions. Existing ones keep receiving.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn register(&self, issue_key: &str) -> Result<Subscription, SubscribeError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(SubscribeError::Closed {
                key: issue_key.to_string(),
            });
        }
        self.active.fetch_add(1, Ordering::SeqCst);
        debug!(issue = issue_key, channel = ISSUE_CHANGED, "subscribed");
        Ok(Subscription {
            key: issue_key.to_string(),
            rx: self.tx.subscribe(),
            active: Arc::clone(&self.active),
        })
    }
}

#[async_trait]
impl ChangeSource for IssueEvents {
    async fn subscribe(&self, issue_key: &str) -> Result<Subscription, SubscribeError> {
        self.register(issue_key)
    }
}

/// Live registration for changes to one issue.
pub struct Subscription {
    key: String,
    rx: broadcast::Receiver<IssueChanged>,
    active: Arc<AtomicUsize>,
}

impl Subscription {
    /// Wait for the next change to this subscription's issue.
    ///
    /// Returns `false` once the feed is closed. Events for other issues are
    /// skipped; if the receiver lagged, the missed events are reported as a
    /// single change.
    pub async fn changed(&mut self) -> bool {
        loop {
            match self.rx.recv().await {
                Ok(event) if event.key == self.key => return true,
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(issue = %self.key, missed, "change feed lagged");
                    return true;
                }
                Err(broadcast::error::RecvError::Closed) => return false,
            }
        }
    }

    /// Unregister. Equivalent to dropping the subscription.
    pub fn release(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
        debug!(issue = %self.key, channel = ISSUE_CHANGED, "subscription released");
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("key", &self.key).finish()
    }
}
