//! reqwest engine: a builder-projected client, blocking for synchronous calls
//! and async on an engine-owned runtime for callback calls.

use super::mapping::{project, ClientBuilderTarget};
use super::worker::WorkerPool;
use super::{describe, AsyncBackend, Completion, Outcome, SyncBackend, TransportFailure};
use crate::config::{Certificate, Configuration};
use crate::types::{Header, ProtocolVersion, RequestDescriptor, RequestMethod, Response, ResponseBody};
use crate::{Error, ErrorContext, Result};
use once_cell::sync::OnceCell;
use reqwest::header::HeaderMap;
use reqwest::redirect::Policy;
use reqwest::{Method, StatusCode, Version};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, Instrument};

const ENGINE: &str = "reqwest";

/// Engine backed by reqwest.
///
/// Native clients are built from the [`Configuration`] on first use and then
/// reused for the lifetime of the backend. The blocking client must not be
/// built or dropped from inside an async runtime.
pub struct ReqwestBackend {
    configuration: Arc<Configuration>,
    blocking: OnceCell<reqwest::blocking::Client>,
    client: OnceCell<reqwest::Client>,
    workers: WorkerPool,
}

impl ReqwestBackend {
    pub fn new(configuration: Arc<Configuration>) -> Self {
        let workers = WorkerPool::new(ENGINE, configuration.worker_threads);
        Self {
            configuration,
            blocking: OnceCell::new(),
            client: OnceCell::new(),
            workers,
        }
    }

    /// Use a pre-built blocking client as-is; the configuration is not projected onto it.
    pub fn with_blocking_client(client: reqwest::blocking::Client) -> Self {
        let backend = Self::new(Arc::new(Configuration::default()));
        let _ = backend.blocking.set(client);
        backend
    }

    /// Use a pre-built async client as-is; the configuration is not projected onto it.
    pub fn with_client(client: reqwest::Client) -> Self {
        let backend = Self::new(Arc::new(Configuration::default()));
        let _ = backend.client.set(client);
        backend
    }

    fn blocking_client(&self) -> Result<&reqwest::blocking::Client> {
        self.blocking.get_or_try_init(|| {
            let builder = project(&self.configuration, reqwest::blocking::Client::builder())?;
            debug!(engine = ENGINE, mode = "blocking", "building client");
            builder.build().map_err(build_error)
        })
    }

    fn async_client(&self) -> Result<&reqwest::Client> {
        self.client.get_or_try_init(|| {
            let builder = project(&self.configuration, reqwest::Client::builder())?;
            debug!(engine = ENGINE, mode = "async", "building client");
            builder.build().map_err(build_error)
        })
    }
}

impl SyncBackend for ReqwestBackend {
    fn name(&self) -> &'static str {
        ENGINE
    }

    fn prepare(&self) -> Result<()> {
        self.blocking_client().map(|_| ())
    }

    fn execute(&self, request: &RequestDescriptor) -> Outcome {
        let client = self
            .blocking_client()
            .map_err(|e| TransportFailure::io(e.to_string()))?;

        let method = native_method(request.method())?;
        let mut builder = client.request(method, request.url().clone());
        for header in request.headers() {
            builder = builder.header(header.name(), header.value());
        }
        if let Some(body) = request.body() {
            builder = builder.body(body.data().to_vec());
        }
        if let Some(timeout) = request.read_timeout() {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().map_err(failure_from_reqwest)?;
        let (status, version) = (response.status(), response.version());
        let headers = native_headers(response.headers());
        // `bytes` consumes the native response, returning the connection to the pool.
        let data = response.bytes().map_err(failure_from_reqwest)?;
        trace!(engine = ENGINE, status = status.as_u16(), len = data.len(), "response read");
        Ok(normalize(status, version, headers, ResponseBody::new(data)))
    }
}

impl AsyncBackend for ReqwestBackend {
    fn name(&self) -> &'static str {
        ENGINE
    }

    fn prepare(&self) -> Result<()> {
        self.async_client()?;
        self.workers.get().map(|_| ())
    }

    fn submit(&self, request: RequestDescriptor, completion: Completion) {
        let (client, runtime) = match (self.async_client(), self.workers.get()) {
            (Ok(client), Ok(runtime)) => (client.clone(), runtime),
            (Err(e), _) | (_, Err(e)) => {
                completion.complete(Err(TransportFailure::io(e.to_string())));
                return;
            }
        };

        let task = async move {
            let outcome = send(&client, &request).await;
            completion.complete(outcome);
        };
        runtime.spawn(task.instrument(tracing::Span::current()));
    }
}

async fn send(client: &reqwest::Client, request: &RequestDescriptor) -> Outcome {
    let method = native_method(request.method())?;
    let mut builder = client.request(method, request.url().clone());
    for header in request.headers() {
        builder = builder.header(header.name(), header.value());
    }
    if let Some(body) = request.body() {
        builder = builder.body(body.data().clone());
    }
    if let Some(timeout) = request.read_timeout() {
        builder = builder.timeout(timeout);
    }

    let response = builder.send().await.map_err(failure_from_reqwest)?;
    let (status, version) = (response.status(), response.version());
    let headers = native_headers(response.headers());
    let data = response.bytes().await.map_err(failure_from_reqwest)?;
    trace!(engine = ENGINE, status = status.as_u16(), len = data.len(), "response read");
    Ok(normalize(status, version, headers, ResponseBody::new(data)))
}

fn native_method(method: RequestMethod) -> std::result::Result<Method, TransportFailure> {
    Method::from_bytes(method.as_str().as_bytes()).map_err(|e| {
        TransportFailure::io(format!("method {} rejected by {}", method, ENGINE)).with_source(e)
    })
}

fn native_headers(headers: &HeaderMap) -> Vec<Header> {
    headers
        .iter()
        .map(|(name, value)| {
            Header::new(
                name.as_str(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

fn protocol_version(version: Version) -> ProtocolVersion {
    if version == Version::HTTP_09 {
        ProtocolVersion::Http09
    } else if version == Version::HTTP_10 {
        ProtocolVersion::Http10
    } else if version == Version::HTTP_2 {
        ProtocolVersion::Http2
    } else if version == Version::HTTP_3 {
        ProtocolVersion::Http3
    } else {
        ProtocolVersion::Http11
    }
}

fn normalize(
    status: StatusCode,
    version: Version,
    headers: Vec<Header>,
    body: ResponseBody,
) -> Response {
    Response {
        status: status.as_u16(),
        reason: status.canonical_reason().map(str::to_string),
        version: protocol_version(version),
        headers,
        body,
    }
}

/// reqwest reports timeouts as a flag and the connect phase as another flag;
/// both end up in the message text the classifier reads.
///
/// Only the builder's `connect_timeout` sets the connect flag. The
/// whole-request timeout (the configured read timeout and any per-call
/// override) does not say which phase it expired in, so it is reported as a
/// read timeout even when the connection was never established.
fn failure_from_reqwest(err: reqwest::Error) -> TransportFailure {
    let text = describe(&err);
    let failure = if err.is_timeout() {
        let phase = if err.is_connect() {
            "connect timed out"
        } else {
            "read timed out"
        };
        TransportFailure::socket_timeout(format!("{}: {}", phase, text))
    } else if err.is_connect() && names_resolution_failure(&text) {
        TransportFailure::unknown_host(text)
    } else {
        TransportFailure::io(text)
    };
    failure.with_source(err)
}

fn names_resolution_failure(text: &str) -> bool {
    let text = text.to_lowercase();
    [
        "dns error",
        "failed to lookup address",
        "name or service not known",
        "no such host",
        "nodename nor servname",
    ]
    .iter()
    .any(|needle| text.contains(needle))
}

fn build_error(err: reqwest::Error) -> Error {
    Error::invalid_argument(
        "invalid client configuration",
        ErrorContext::new()
            .with_details(describe(&err))
            .with_source(ENGINE),
    )
}

fn certificate_error(err: reqwest::Error) -> Error {
    Error::invalid_argument(
        "root certificate rejected",
        ErrorContext::new()
            .with_field_path("tls.root_certificates")
            .with_details(err.to_string())
            .with_source(ENGINE),
    )
}

fn proxy_error(err: reqwest::Error) -> Error {
    Error::invalid_argument(
        "proxy rejected",
        ErrorContext::new()
            .with_field_path("proxy")
            .with_details(err.to_string())
            .with_source(ENGINE),
    )
}

fn redirect_policy(follow: bool, max: Option<u32>) -> Policy {
    match (follow, max) {
        (false, _) => Policy::none(),
        (true, Some(max)) => Policy::limited(max as usize),
        (true, None) => Policy::default(),
    }
}

// The blocking and async builders expose the same setters under the same names.
macro_rules! reqwest_builder_target {
    ($builder:ty) => {
        impl ClientBuilderTarget for $builder {
            const ENGINE: &'static str = ENGINE;

            fn connect_timeout(self, timeout: Duration) -> Self {
                <$builder>::connect_timeout(self, timeout)
            }

            /// reqwest has no read-phase timeout; the whole-request timeout stands in,
            /// and its expiry is always reported as a read timeout.
            fn read_timeout(self, timeout: Duration) -> Self {
                <$builder>::timeout(self, timeout)
            }

            fn max_per_route(self, per_route: usize) -> Self {
                <$builder>::pool_max_idle_per_host(self, per_route)
            }

            fn redirect_policy(self, follow: bool, max: Option<u32>) -> Self {
                <$builder>::redirect(self, redirect_policy(follow, max))
            }

            fn user_agent(self, user_agent: &str) -> Self {
                <$builder>::user_agent(self, user_agent)
            }

            fn proxy(self, url: &str) -> Result<Self> {
                let proxy = reqwest::Proxy::all(url).map_err(proxy_error)?;
                Ok(<$builder>::proxy(self, proxy))
            }

            fn content_compression(self, enabled: bool) -> Self {
                <$builder>::gzip(self, enabled)
            }

            /// Added next to the built-in roots, which stay trusted.

            fn root_certificates(self, certificates: &[Certificate]) -> Result<Self> {
                let mut builder = self;
                for certificate in certificates {
                    let native = reqwest::Certificate::from_pem(certificate.pem())
                        .map_err(certificate_error)?;
                    builder = <$builder>::add_root_certificate(builder, native);
                }
                Ok(builder)
            }

            fn validate_server_certificate(self, enabled: bool) -> Self {
                <$builder>::danger_accept_invalid_certs(self, !enabled)
            }
        }
    };
}

reqwest_builder_target!(reqwest::blocking::ClientBuilder);
reqwest_builder_target!(reqwest::ClientBuilder);
