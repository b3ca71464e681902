use super::builder::HttpClientBuilder;
use super::execution;
use crate::transport::SyncBackend;
use crate::types::{IntoTarget, RequestBody, RequestMethod, RequestOptions, Response};
use crate::Result;
use std::sync::Arc;

macro_rules! bodiless_verbs {
    ($($name:ident => $variant:ident, $wire:literal;)*) => {
        $(
            #[doc = concat!("Send a `", $wire, "` request.")]
            pub fn $name<T: IntoTarget>(&self, target: T, options: RequestOptions) -> Result<Response> {
                self.send(RequestMethod::$variant, target, None, options)
            }
        )*
    };
}

macro_rules! body_verbs {
    ($($name:ident => $variant:ident, $wire:literal;)*) => {
        $(
            #[doc = concat!("Send a `", $wire, "` request with an optional body.")]
            pub fn $name<T: IntoTarget>(
                &self,
                target: T,
                body: Option<RequestBody>,
                options: RequestOptions,
            ) -> Result<Response> {
                self.send(RequestMethod::$variant, target, body, options)
            }
        )*
    };
}

/// Blocking client over one engine.
///
/// Each call blocks the calling thread until the response is fully read, and
/// returns either the response or an error of one of the five
/// [`ErrorKind`](crate::ErrorKind)s. Non-2xx statuses are responses.
///
/// The reqwest engine drives its blocking client from an internal runtime, so
/// this client must not be used from inside an async context; use
/// [`HttpAsyncClient`](crate::HttpAsyncClient) there.
#[derive(Clone)]
pub struct HttpClient {
    backend: Arc<dyn SyncBackend>,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Client over an injected engine.
    pub fn with_backend(backend: Arc<dyn SyncBackend>) -> Self {
        Self { backend }
    }

    /// Name of the engine executing requests.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Dispatch `method` to its verb operation.
    ///
    /// `body` is only forwarded by verbs that carry one (POST, PUT, PATCH,
    /// PROPPATCH, REPORT).
    pub fn request<T: IntoTarget>(
        &self,
        method: RequestMethod,
        target: T,
        body: Option<RequestBody>,
        options: RequestOptions,
    ) -> Result<Response> {
        match method {
            RequestMethod::Get => self.get(target, options),
            RequestMethod::Post => self.post(target, body, options),
            RequestMethod::Put => self.put(target, body, options),
            RequestMethod::Patch => self.patch(target, body, options),
            RequestMethod::Delete => self.delete(target, options),
            RequestMethod::Connect => self.connect(target, options),
            RequestMethod::Trace => self.trace(target, options),
            RequestMethod::Copy => self.copy(target, options),
            RequestMethod::Move => self.r#move(target, options),
            RequestMethod::Head => self.head(target, options),
            RequestMethod::Options => self.options(target, options),
            RequestMethod::Link => self.link(target, options),
            RequestMethod::Unlink => self.unlink(target, options),
            RequestMethod::Purge => self.purge(target, options),
            RequestMethod::Lock => self.lock(target, options),
            RequestMethod::Unlock => self.unlock(target, options),
            RequestMethod::Propfind => self.propfind(target, options),
            RequestMethod::Proppatch => self.proppatch(target, body, options),
            RequestMethod::Report => self.report(target, body, options),
            RequestMethod::View => self.view(target, options),
            RequestMethod::Wrapped => self.wrapped(target, options),
        }
    }

    /// Dispatch a verb given by name.
    ///
    /// A blank name fails with [`ErrorKind::InvalidArgument`](crate::ErrorKind::InvalidArgument)
    /// before anything is sent. A name outside [`RequestMethod`] is sent as GET.
    pub fn request_named<T: IntoTarget>(
        &self,
        method: &str,
        target: T,
        body: Option<RequestBody>,
        options: RequestOptions,
    ) -> Result<Response> {
        let method = execution::resolve_named(method)?;
        self.request(method, target, body, options)
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

    fn send<T: IntoTarget>(
        &self,
        method: RequestMethod,
        target: T,
        body: Option<RequestBody>,
        options: RequestOptions,
    ) -> Result<Response> {
        execution::execute(self.backend.as_ref(), method, target, body, options)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("backend", &self.backend.name())
            .finish()
    }
}
