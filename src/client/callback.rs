//! Completion contract of the callback client.

use crate::types::Response;
use crate::{Error, Result};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// Receives the single outcome of one submitted request.
///
/// Exactly one method is called, exactly once, from an engine worker thread
/// and never from the thread that submitted the request. Callbacks must not
/// rely on thread-local state of the submitting thread.
///
/// Any `FnOnce(Result<Response>)` closure is a callback.
pub trait Callback: Send + 'static {
    fn completed(self: Box<Self>, response: Response);

    fn failed(self: Box<Self>, error: Error);
}

impl<F> Callback for F
where
    F: FnOnce(Result<Response>) + Send + 'static,
{
    fn completed(self: Box<Self>, response: Response) {
        (*self)(Ok(response))
    }

    fn failed(self: Box<Self>, error: Error) {
        (*self)(Err(error))
    }
}

/// Receiving half of [`ResponseFuture::channel`].
///
/// Resolves once the paired callback fires. Can be awaited, or waited on with
/// [`ResponseFuture::wait`] from outside an async runtime.
#[derive(Debug)]
pub struct ResponseFuture {
    rx: oneshot::Receiver<Result<Response>>,
}

impl ResponseFuture {
    /// A callback and the future it resolves.
    pub fn channel() -> (impl Callback, ResponseFuture) {
        let (tx, rx) = oneshot::channel();
        let callback = move |outcome: Result<Response>| {
            // The receiver may have been dropped; nobody is waiting then.
            let _ = tx.send(outcome);
        };
        (callback, ResponseFuture { rx })
    }

    /// Block the current thread until the outcome arrives.
    ///
    /// Panics when called from inside an async runtime.
    pub fn wait(self) -> Result<Response> {
        self.rx.blocking_recv().unwrap_or_else(|_| Err(abandoned()))
    }
}

impl Future for ResponseFuture {
    type Output = Result<Response>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or_else(|_| Err(abandoned())))
    }
}

fn abandoned() -> Error {
    super::error_classification::into_error(crate::transport::TransportFailure::io(
        "callback was dropped without an outcome",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResponseBody;
    use tokio_test::{assert_pending, assert_ready, task};

    fn ok_response() -> Response {
        Response {
            status: 204,
            reason: None,
            version: crate::types::ProtocolVersion::Http11,
            headers: Vec::new(),
            body: ResponseBody::new(Vec::new()),
        }
    }

    #[test]
    fn future_resolves_after_completion() {
        let (callback, future) = ResponseFuture::channel();
        let mut future = task::spawn(future);
        assert_pending!(future.poll());

        Box::new(callback).completed(ok_response());
        assert!(future.is_woken());
        let response = assert_ready!(future.poll()).unwrap();
        assert_eq!(response.status, 204);
    }

    #[test]
    fn dropped_callback_fails_the_future() {
        let (callback, future) = ResponseFuture::channel();
        drop(callback);
        let err = future.wait().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::GenericRequestFailure);
    }

    #[test]
    fn closures_are_callbacks() {
        let (tx, rx) = std::sync::mpsc::channel();
        let callback: Box<dyn Callback> = Box::new(move |r: Result<Response>| {
            tx.send(r.is_ok()).unwrap();
        });
        callback.failed(crate::Error::ReadTimeout {
            message: "read timed out".into(),
        });
        assert!(!rx.recv().unwrap());
    }
}
