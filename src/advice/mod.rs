//! Bad-advice banner plumbing
//!
//! Advice text comes from an [`AdviceSource`]. The [`AdviceService`] runs each
//! request on its own tokio task and hands replies back through a channel the
//! tick loop drains, so a slow endpoint never blocks a tick. Replies carry the
//! session generation they were requested under; the session drops stale ones.

#[cfg(feature = "advice")]
mod client;

#[cfg(feature = "advice")]
pub use client::AdviceClient;

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

/// Advice request failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdviceError {
    #[error("HTTP request failed: {0}")]
    Request(String),
    #[error("request timed out")]
    Timeout,
    #[error("endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to parse response: {0}")]
    Decode(String),
    #[error("response contained no text")]
    Empty,
}

/// Reply from one advice request
#[derive(Debug, Clone)]
pub struct AdviceReply {
    /// Session generation at request time
    pub generation: u64,
    pub result: Result<String, AdviceError>,
}

/// Something that produces one line of advice per call
pub trait AdviceSource: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = Result<String, AdviceError>> + Send;
}

/// Offline source cycling through fixed lines
#[derive(Debug, Default)]
pub struct CannedAdvice {
    next: AtomicUsize,
}

const CANNED_LINES: &[&str] = &[
    "Touch the spiky balls.",
    "Let go of all buttons.",
    "Running left is the secret shortcut.",
    "Stars are a trap. Avoid them.",
];

impl CannedAdvice {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AdviceSource for CannedAdvice {
    fn fetch(&self) -> impl Future<Output = Result<String, AdviceError>> + Send {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % CANNED_LINES.len();
        std::future::ready(Ok(CANNED_LINES[index].to_string()))
    }
}

/// Background request dispatcher.
///
/// Requests run detached; their handles are kept only so pending ones can be
/// aborted when their replies could no longer be used.
pub struct AdviceService<S: AdviceSource> {
    source: Arc<S>,
    sender: Sender<AdviceReply>,
    receiver: Receiver<AdviceReply>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl<S: AdviceSource> AdviceService<S> {
    pub fn new(source: S) -> Self {
        let (sender, receiver) = unbounded();
        Self {
            source: Arc::new(source),
            sender,
            receiver,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Start a request on a background task. Must be called inside a tokio runtime.
    pub fn request(&self, generation: u64) {
        let source = Arc::clone(&self.source);
        let sender = self.sender.clone();

        debug!("Advice request dispatched (generation {})", generation);

        let handle = tokio::spawn(async move {
            let result = source.fetch().await;
            // Receiver lives as long as the service; a send error means shutdown
            let _ = sender.send(AdviceReply { generation, result });
        });

        let mut tasks = self.tasks.lock();
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle);
    }

    /// Collect every reply that arrived since the last drain
    pub fn drain(&self) -> Vec<AdviceReply> {
        self.receiver.try_iter().collect()
    }

    /// Requests still waiting on the source
    pub fn in_flight(&self) -> usize {
        self.tasks.lock().iter().filter(|task| !task.is_finished()).count()
    }

    /// Abort every pending request. Returns how many were still running.
    pub fn cancel_all(&self) -> usize {
        let mut tasks = self.tasks.lock();
        let pending = tasks.iter().filter(|task| !task.is_finished()).count();
        for task in tasks.drain(..) {
            task.abort();
        }
        if pending > 0 {
            debug!("Cancelled {} pending advice requests", pending);
        }
        pending
    }
}
