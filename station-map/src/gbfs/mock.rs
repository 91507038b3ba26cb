//! Mock feed source for testing without network access.
//!
//! Serves a configurable body (or failure) as if it were the live feed, and
//! can hold individual fetches open to simulate slow responses.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use super::client::FeedSource;
use super::error::FetchError;
use super::types::FeedKind;

/// What the next fetch returns.
#[derive(Debug, Clone)]
enum Reply {
    Body(Vec<u8>),
    Transport(String),
    Status(u16),
}

#[derive(Debug)]
struct MockState {
    reply: Reply,
    /// Pending holds; each fetch takes the front one and waits on it.
    holds: VecDeque<Arc<Notify>>,
}

/// In-memory feed source.
///
/// Clones share state, so a test can keep a handle while the orchestrator
/// owns another.
#[derive(Debug, Clone)]
pub struct MockFeed {
    kind: FeedKind,
    state: Arc<Mutex<MockState>>,
    calls: Arc<AtomicUsize>,
}

impl MockFeed {
    /// A feed that serves `body` on every fetch.
    pub fn new(kind: FeedKind, body: impl Into<Vec<u8>>) -> Self {
        Self::with_reply(kind, Reply::Body(body.into()))
    }

    /// A feed whose every fetch fails with the given HTTP status.
    pub fn failing_status(kind: FeedKind, status: u16) -> Self {
        Self::with_reply(kind, Reply::Status(status))
    }

    /// A feed whose every fetch fails at the transport level.
    pub fn failing_transport(kind: FeedKind, message: impl Into<String>) -> Self {
        Self::with_reply(kind, Reply::Transport(message.into()))
    }

    fn with_reply(kind: FeedKind, reply: Reply) -> Self {
        Self {
            kind,
            state: Arc::new(Mutex::new(MockState {
                reply,
                holds: VecDeque::new(),
            })),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Replace the body served from now on.
    pub fn set_body(&self, body: impl Into<Vec<u8>>) {
        self.lock().reply = Reply::Body(body.into());
    }

    /// Make fetches fail with the given HTTP status from now on.
    pub fn set_status(&self, status: u16) {
        self.lock().reply = Reply::Status(status);
    }

    /// Hold the next fetch open until the returned handle is notified.
    ///
    /// The reply is read after the hold is released.
    pub fn hold_next(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.lock().holds.push_back(Arc::clone(&notify));
        notify
    }

    /// Number of fetches started so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        // A poisoned mock only happens after a test already panicked
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl FeedSource for MockFeed {
    fn kind(&self) -> FeedKind {
        self.kind
    }

    async fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let hold = self.lock().holds.pop_front();
        if let Some(hold) = hold {
            hold.notified().await;
        }

        let reply = self.lock().reply.clone();
        match reply {
            Reply::Body(body) => Ok(body),
            Reply::Transport(message) => Err(FetchError::Transport {
                kind: self.kind,
                message,
            }),
            Reply::Status(status) => Err(FetchError::HttpStatus {
                kind: self.kind,
                status,
                url: format!("mock://{}", self.kind),
            }),
        }
    }
}
