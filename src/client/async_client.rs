use super::builder::HttpClientBuilder;
use super::callback::Callback;
use super::execution;
use crate::transport::AsyncBackend;
use crate::types::{IntoTarget, RequestBody, RequestMethod, RequestOptions};
use crate::Result;
use std::sync::Arc;

macro_rules! bodiless_verbs {
    ($($name:ident => $variant:ident, $wire:literal;)*) => {
        $(
            #[doc = concat!("Submit a `", $wire, "` request.")]
            pub fn $name<T: IntoTarget, C: Callback>(
                &self,
                target: T,
                options: RequestOptions,
                callback: C,
            ) -> Result<()> {
                self.submit(RequestMethod::$variant, target, None, options, Box::new(callback))
            }
        )*
    };
}

macro_rules! body_verbs {
    ($($name:ident => $variant:ident, $wire:literal;)*) => {
        $(
            #[doc = concat!("Submit a `", $wire, "` request with an optional body.")]
            pub fn $name<T: IntoTarget, C: Callback>(
                &self,
                target: T,
                body: Option<RequestBody>,
                options: RequestOptions,
                callback: C,
            ) -> Result<()> {
                self.submit(RequestMethod::$variant, target, body, options, Box::new(callback))
            }
        )*
    };
}

/// Callback client over one engine.
///
/// Every call returns as soon as the request is handed to the engine's
/// workers. `Err` is only returned for invalid arguments, which are detected
/// before submission. Every other outcome reaches the callback, exactly once,
/// on an engine worker thread.
///
/// Dropping the last handle to the engine shuts its runtime down in the
/// background. Requests still in flight still get exactly one outcome on a
/// worker thread: the reqwest engine abandons them and reports a request
/// failure, while the ureq engine lets them run to their own outcome.
#[derive(Clone)]
pub struct HttpAsyncClient {
    backend: Arc<dyn AsyncBackend>,
}

impl HttpAsyncClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    pub fn with_backend(backend: Arc<dyn AsyncBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Dispatch `method` to its verb operation.
    pub fn request<T: IntoTarget, C: Callback>(
        &self,
        method: RequestMethod,
        target: T,
        body: Option<RequestBody>,
        options: RequestOptions,
        callback: C,
    ) -> Result<()> {
        match method {
            RequestMethod::Get => self.get(target, options, callback),
            RequestMethod::Post => self.post(target, body, options, callback),
            RequestMethod::Put => self.put(target, body, options, callback),
            RequestMethod::Patch => self.patch(target, body, options, callback),
            RequestMethod::Delete => self.delete(target, options, callback),
            RequestMethod::Connect => self.connect(target, options, callback),
            RequestMethod::Trace => self.trace(target, options, callback),
            RequestMethod::Copy => self.copy(target, options, callback),
            RequestMethod::Move => self.r#move(target, options, callback),
            RequestMethod::Head => self.head(target, options, callback),
            RequestMethod::Options => self.options(target, options, callback),
            RequestMethod::Link => self.link(target, options, callback),
            RequestMethod::Unlink => self.unlink(target, options, callback),
            RequestMethod::Purge => self.purge(target, options, callback),
            RequestMethod::Lock => self.lock(target, options, callback),
            RequestMethod::Unlock => self.unlock(target, options, callback),
            RequestMethod::Propfind => self.propfind(target, options, callback),
            RequestMethod::Proppatch => self.proppatch(target, body, options, callback),
            RequestMethod::Report => self.report(target, body, options, callback),
            RequestMethod::View => self.view(target, options, callback),
            RequestMethod::Wrapped => self.wrapped(target, options, callback),
        }
    }

    /// Dispatch a verb given by name; see [`HttpClient::request_named`](crate::HttpClient::request_named).
    pub fn request_named<T: IntoTarget, C: Callback>(
        &self,
        method: &str,
        target: T,
        body: Option<RequestBody>,
        options: RequestOptions,
        callback: C,
    ) -> Result<()> {
        let method = execution::resolve_named(method)?;
        self.request(method, target, body, options, callback)
    }

    bodiless_verbs! {
        get => Get, "GET";
        delete => Delete, "DELETE";
        connect => Connect, "CONNECT";
        trace => Trace, "TRACE";
        copy => Copy, "COPY";
        r#move => Move, "MOVE";
        head => Head, "HEAD";
        options => Options, "OPTIONS";
        link => Link, "LINK";
        unlink => Unlink, "UNLINK";
        purge => Purge, "PURGE";
        lock => Lock, "LOCK";
        unlock => Unlock, "UNLOCK";
        propfind => Propfind, "PROPFIND";
        view => View, "VIEW";
        wrapped => Wrapped, "WRAPPED";
    }

    body_verbs! {
        post => Post, "POST";
        put => Put, "PUT";
        patch => Patch, "PATCH";
        proppatch => Proppatch, "PROPPATCH";
        report => Report, "REPORT";
    }

    fn submit<T: IntoTarget>(
        &self,
        method: RequestMethod,
        target: T,
        body: Option<RequestBody>,
        options: RequestOptions,
        callback: Box<dyn Callback>,
    ) -> Result<()> {
        execution::submit(self.backend.as_ref(), method, target, body, options, callback)
    }
}

impl std::fmt::Debug for HttpAsyncClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpAsyncClient")
            .field("backend", &self.backend.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{self, RecordingBackend};
    use crate::client::ResponseFuture;
    use crate::types::Response;
    use crate::ErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn every_verb_reaches_exactly_one_operation() {
        for method in RequestMethod::ALL {
            let backend = Arc::new(RecordingBackend::ok());
            let client = HttpAsyncClient::with_backend(backend.clone());
            let (callback, future) = ResponseFuture::channel();
            client
                .request(method, "http://example.test/", None, RequestOptions::new(), callback)
                .unwrap();
            assert_eq!(future.wait().unwrap().body.text(), method.as_str());
            assert_eq!(backend.methods(), vec![method]);
        }
    }

    #[test]
    fn outcome_fires_once_off_the_submitting_thread() {
        let backend = Arc::new(RecordingBackend::answering(testing::read_timeout));
        let client = HttpAsyncClient::with_backend(backend);
        let fired = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = mpsc::channel();

        for _ in 0..50 {
            let fired = fired.clone();
            let tx = tx.clone();
            client
                .get(
                    "http://example.test/",
                    RequestOptions::new(),
                    move |outcome: Result<Response>| {
                        fired.fetch_add(1, Ordering::SeqCst);
                        tx.send((thread::current().id(), outcome.map(|_| ()))).unwrap();
                    },
                )
                .unwrap();
        }
        drop(tx);

        let outcomes: Vec<_> = rx.iter().collect();
        assert_eq!(outcomes.len(), 50);
        assert_eq!(fired.load(Ordering::SeqCst), 50);
        for (thread_id, outcome) in outcomes {
            assert_ne!(thread_id, thread::current().id());
            assert_eq!(outcome.unwrap_err().kind(), ErrorKind::ReadTimeout);
        }
    }

    #[test]
    fn invalid_arguments_are_returned_not_called_back() {
        let backend = Arc::new(RecordingBackend::ok());
        let client = HttpAsyncClient::with_backend(backend.clone());
        let (tx, rx) = mpsc::channel::<()>();

        let err = client
            .request_named("", "http://example.test/", None, RequestOptions::new(), move |_: Result<Response>| {
                tx.send(()).unwrap();
            })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = client
            .post("::", None, RequestOptions::new(), |_: Result<Response>| {})
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        assert!(backend.calls().is_empty());
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[tokio::test]
    async fn futures_can_be_awaited() {
        let client = HttpAsyncClient::with_backend(Arc::new(RecordingBackend::ok()));
        let (callback, future) = ResponseFuture::channel();
        client
            .propfind("http://example.test/dav/", RequestOptions::new(), callback)
            .unwrap();
        let response = future.await.unwrap();
        assert_eq!(response.body.text(), "PROPFIND");
    }
}
