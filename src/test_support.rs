//! Test doubles for the tracker seams.

use async_trait::async_trait;
use route_panel_common::{AddressFields, IssueSnapshot};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::oneshot;

use crate::errors::FetchError;
use crate::source::{IssueSource, RevisionProbe};

pub type FetchOutcome = Result<Option<IssueSnapshot>, FetchError>;

pub fn snapshot(status: &str, pickup: Option<&str>, delivery: Option<&str>) -> IssueSnapshot {
    IssueSnapshot::new("HAUL-42", status, AddressFields::new(pickup, delivery))
}

pub fn server_error() -> FetchError {
    FetchError::Status {
        key: "HAUL-42".to_string(),
        status: 500,
    }
}

/// Answers every fetch immediately by calling `reply`.
pub struct FixedSource {
    reply: Box<dyn Fn() -> FetchOutcome + Send + Sync>,
    calls: AtomicUsize,
}

impl FixedSource {
    pub fn new(reply: impl Fn() -> FetchOutcome + Send + Sync + 'static) -> Self {
        Self {
            reply: Box::new(reply),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IssueSource for FixedSource {
    async fn fetch_issue(&self, _key: &str) -> FetchOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.reply)()
    }
}

/// Each fetch blocks until the test answers it, in call order.
#[derive(Default)]
pub struct ScriptedSource {
    replies: Mutex<VecDeque<oneshot::Receiver<FetchOutcome>>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    /// Queue a reply slot for the next fetch; send on the returned sender to answer it.
    pub fn expect_fetch(&self) -> oneshot::Sender<FetchOutcome> {
        let (tx, rx) = oneshot::channel();
        self.replies.lock().unwrap().push_back(rx);
        tx
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Yield until at least `n` fetches have started.
    pub async fn wait_for_calls(&self, n: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.calls() < n {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("fetches did not start in time");
    }
}

#[async_trait]
impl IssueSource for ScriptedSource {
    async fn fetch_issue(&self, _key: &str) -> FetchOutcome {
        let reply = self.replies.lock().unwrap().pop_front();
        self.calls.fetch_add(1, Ordering::SeqCst);
        match reply {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(FetchError::Shape("reply dropped".to_string()))),
            None => Err(FetchError::Shape("unexpected fetch".to_string())),
        }
    }
}

/// Returns queued revisions in order, then repeats the last one.
#[derive(Default)]
pub struct QueuedProbe {
    revisions: Mutex<VecDeque<Result<String, FetchError>>>,
    last: Mutex<Option<String>>,
}

impl QueuedProbe {
    pub fn push(&self, revision: Result<String, FetchError>) {
        self.revisions.lock().unwrap().push_back(revision);
    }
}

#[async_trait]
impl RevisionProbe for QueuedProbe {
    async fn revision(&self, _key: &str) -> Result<String, FetchError> {
        let next = self.revisions.lock().unwrap().pop_front();
        match next {
            Some(Ok(rev)) => {
                *self.last.lock().unwrap() = Some(rev.clone());
                Ok(rev)
            }
            Some(Err(e)) => Err(e),
            None => self
                .last
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| FetchError::Shape("no revision queued".to_string())),
        }
    }
}
