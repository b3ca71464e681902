//! Engine side of the facade.
//!
//! An engine is anything implementing [`SyncBackend`] and/or [`AsyncBackend`].
//! Engines never produce [`crate::Error`] for request failures; they report a
//! [`TransportFailure`] and leave classification to the execution adapter.

pub mod agent;
pub mod http;
pub mod mapping;
mod worker;

pub use agent::UreqBackend;
pub use http::ReqwestBackend;
pub use mapping::{project, ClientBuilderTarget};

use crate::types::{RequestDescriptor, Response};
use crate::Result;
use std::error::Error as StdError;
use std::io;

/// Outcome an engine reports for one request.
pub type Outcome = std::result::Result<Response, TransportFailure>;

/// Blocking execution capability.
pub trait SyncBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Build the native client on first use. Errors are configuration errors
    /// and are raised before any request is sent.
    fn prepare(&self) -> Result<()>;

    /// Send `request` and block until the response is fully read.
    ///
    /// The native response is released before this returns, on every path.
    fn execute(&self, request: &RequestDescriptor) -> Outcome;
}

/// Callback execution capability.
pub trait AsyncBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn prepare(&self) -> Result<()>;

    /// Hand `request` to an engine-owned worker and return immediately.
    /// `completion` is fired from that worker, never from the caller's thread.
    fn submit(&self, request: RequestDescriptor, completion: Completion);
}

/// Low-level failure category as far as the engine can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    /// A socket-level timeout. Whether it happened while connecting or while
    /// reading is carried in the message text.
    SocketTimeout,
    /// The host name did not resolve.
    UnknownHost,
    Io,
}

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct TransportFailure {
    category: FailureCategory,
    message: String,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl TransportFailure {
    pub fn new(category: FailureCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            source: None,
        }
    }

    pub fn socket_timeout(message: impl Into<String>) -> Self {
        Self::new(FailureCategory::SocketTimeout, message)
    }

    pub fn unknown_host(message: impl Into<String>) -> Self {
        Self::new(FailureCategory::UnknownHost, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(FailureCategory::Io, message)
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn category(&self) -> FailureCategory {
        self.category
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Failure for an I/O error raised while draining a response body.
    pub(crate) fn from_body_io(err: io::Error) -> Self {
        let message = describe(&err);
        match err.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
                TransportFailure::socket_timeout(format!("read timed out: {}", message))
                    .with_source(err)
            }
            _ => TransportFailure::io(message).with_source(err),
        }
    }
}

type Deliver = Box<dyn FnOnce(Outcome) + Send + 'static>;

/// One-shot completion slot for a submitted request.
///
/// `complete` consumes the slot, so an engine cannot report twice. A slot
/// dropped without being completed (worker panic, runtime shutdown) reports a
/// failure from its `Drop`, so the caller always hears back exactly once.
pub struct Completion {
    deliver: Option<Deliver>,
}

impl Completion {
    pub fn new(deliver: impl FnOnce(Outcome) + Send + 'static) -> Self {
        Self {
            deliver: Some(Box::new(deliver)),
        }
    }

    pub fn complete(mut self, outcome: Outcome) {
        if let Some(deliver) = self.deliver.take() {
            deliver(outcome);
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if let Some(deliver) = self.deliver.take() {
            deliver(Err(TransportFailure::io(
                "request was abandoned before it completed",
            )));
        }
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("pending", &self.deliver.is_some())
            .finish()
    }
}

/// Error text with its cause chain, deduplicated.
pub(crate) fn describe(err: &(dyn StdError + 'static)) -> String {
    let mut text = err.to_string();
    let mut next = err.source();
    while let Some(cause) = next {
        let part = cause.to_string();
        if !text.contains(&part) {
            text.push_str(": ");
            text.push_str(&part);
        }
        next = cause.source();
    }
    text
}

/// First `io::Error` in the cause chain, `err` itself included.
pub(crate) fn find_io_error<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a io::Error> {
    let mut next = Some(err);
    while let Some(current) = next {
        if let Some(io_err) = current.downcast_ref::<io::Error>() {
            return Some(io_err);
        }
        next = current.source();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting() -> (Arc<AtomicUsize>, Arc<AtomicUsize>, Completion) {
        let ok = Arc::new(AtomicUsize::new(0));
        let failed = Arc::new(AtomicUsize::new(0));
        let (ok2, failed2) = (ok.clone(), failed.clone());
        let completion = Completion::new(move |outcome| match outcome {
            Ok(_) => {
                ok2.fetch_add(1, Ordering::SeqCst);
            }
            Err(_) => {
                failed2.fetch_add(1, Ordering::SeqCst);
            }
        });
        (ok, failed, completion)
    }

    #[test]
    fn completing_fires_once() {
        let (ok, failed, completion) = counting();
        completion.complete(Err(TransportFailure::io("boom")));
        assert_eq!(ok.load(Ordering::SeqCst), 0);
        assert_eq!(failed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropping_uncompleted_slot_reports_failure() {
        let (ok, failed, completion) = counting();
        drop(completion);
        assert_eq!(ok.load(Ordering::SeqCst), 0);
        assert_eq!(failed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn describe_walks_cause_chain() {
        let inner = io::Error::new(io::ErrorKind::TimedOut, "connect timed out");
        let outer = TransportFailure::io("error sending request").with_source(inner);
        assert_eq!(describe(&outer), "error sending request: connect timed out");
        assert_eq!(
            find_io_error(&outer).map(io::Error::kind),
            Some(io::ErrorKind::TimedOut)
        );
    }

    #[test]
    fn body_timeouts_are_read_timeouts() {
        let f = TransportFailure::from_body_io(io::Error::new(io::ErrorKind::TimedOut, "slow"));
        assert_eq!(f.category(), FailureCategory::SocketTimeout);
        assert!(f.message().starts_with("read timed out"));
        let f = TransportFailure::from_body_io(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        assert_eq!(f.category(), FailureCategory::Io);
    }
}
