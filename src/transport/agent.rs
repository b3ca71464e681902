//! ureq engine: an agent with an explicit connection pool and blocking I/O.
//! Callback calls run the blocking call on an engine-owned runtime.

use super::mapping::{project, ClientBuilderTarget};
use super::worker::WorkerPool;
use super::{describe, find_io_error, AsyncBackend, Completion, Outcome, SyncBackend, TransportFailure};
use crate::config::{Certificate, Configuration};
use crate::types::{Header, ProtocolVersion, RequestDescriptor, Response, ResponseBody};
use crate::{Error, ErrorContext, Result};
use once_cell::sync::OnceCell;
use std::io::{self, Read};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

const ENGINE: &str = "ureq";

/// Redirect limit applied when following is enabled without an explicit maximum.
const DEFAULT_REDIRECTS: u32 = 5;

/// Engine backed by a ureq [`ureq::Agent`].
pub struct UreqBackend {
    configuration: Arc<Configuration>,
    agent: OnceCell<ureq::Agent>,
    workers: WorkerPool,
}

impl UreqBackend {
    pub fn new(configuration: Arc<Configuration>) -> Self {
        let workers = WorkerPool::new(ENGINE, configuration.worker_threads);
        Self {
            configuration,
            agent: OnceCell::new(),
            workers,
        }
    }

    /// Use a pre-built agent as-is; the configuration is not projected onto it.
    pub fn with_agent(agent: ureq::Agent) -> Self {
        let backend = Self::new(Arc::new(Configuration::default()));
        let _ = backend.agent.set(agent);
        backend
    }

    fn agent(&self) -> Result<&ureq::Agent> {
        self.agent.get_or_try_init(|| {
            let builder = project(&self.configuration, ureq::AgentBuilder::new())?;
            debug!(engine = ENGINE, "building agent");
            Ok(builder.build())
        })
    }
}

impl SyncBackend for UreqBackend {
    fn name(&self) -> &'static str {
        ENGINE
    }

    fn prepare(&self) -> Result<()> {
        self.agent().map(|_| ())
    }

    fn execute(&self, request: &RequestDescriptor) -> Outcome {
        let agent = self
            .agent()
            .map_err(|e| TransportFailure::io(e.to_string()))?;
        call(agent, request)
    }
}

impl AsyncBackend for UreqBackend {
    fn name(&self) -> &'static str {
        ENGINE
    }

    fn prepare(&self) -> Result<()> {
        self.agent()?;
        self.workers.get().map(|_| ())
    }

    fn submit(&self, request: RequestDescriptor, completion: Completion) {
        let (agent, runtime) = match (self.agent(), self.workers.get()) {
            (Ok(agent), Ok(runtime)) => (agent.clone(), runtime),
            (Err(e), _) | (_, Err(e)) => {
                completion.complete(Err(TransportFailure::io(e.to_string())));
                return;
            }
        };

        let span = tracing::Span::current();
        runtime.spawn_blocking(move || {
            let _entered = span.enter();
            completion.complete(call(&agent, &request));
        });
    }
}

fn call(agent: &ureq::Agent, request: &RequestDescriptor) -> Outcome {
    let mut native = agent.request_url(request.method().as_str(), request.url());
    for (name, value) in merged_headers(request.headers()) {
        native = native.set(&name, &value);
    }
    if let Some(timeout) = request.read_timeout() {
        native = native.timeout(timeout);
    }

    let result = match request.body() {
        Some(body) => native.send_bytes(body.data().as_ref()),
        None => native.call(),
    };
    let response = match result {
        Ok(response) => response,
        // Non-2xx statuses are responses, not failures.
        Err(ureq::Error::Status(_, response)) => response,
        Err(ureq::Error::Transport(transport)) => return Err(failure_from_transport(transport)),
    };
    normalize(response)
}

/// ureq's `set` replaces earlier values, so repeated names are folded into one
/// comma-separated header, in first-seen order.
fn merged_headers(headers: &[Header]) -> Vec<(String, String)> {
    let mut merged: Vec<(String, String)> = Vec::new();
    for header in headers {
        match merged
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case(header.name()))
        {
            Some((_, value)) => {
                value.push_str(", ");
                value.push_str(header.value());
            }
            None => merged.push((header.name().to_string(), header.value().to_string())),
        }
    }
    merged
}

fn normalize(response: ureq::Response) -> Outcome {
    let status = response.status();
    let reason = Some(response.status_text().to_string()).filter(|s| !s.is_empty());
    let version = ProtocolVersion::parse(response.http_version()).unwrap_or(ProtocolVersion::Http11);

    let mut headers = Vec::new();
    for name in response.headers_names() {
        for value in response.all(&name) {
            headers.push(Header::new(name.clone(), value));
        }
    }

    // Reading to the end returns the connection to the agent's pool.
    let mut data = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut data)
        .map_err(TransportFailure::from_body_io)?;
    trace!(engine = ENGINE, status, len = data.len(), "response read");

    Ok(Response {
        status,
        reason,
        version,
        headers,
        body: ResponseBody::new(data),
    })
}

fn failure_from_transport(transport: ureq::Transport) -> TransportFailure {
    let kind = transport.kind();
    let text = describe(&transport);
    let timed_out = find_io_error(&transport)
        .map_or(false, |e| matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock));

    let failure = if kind == ureq::ErrorKind::Dns {
        TransportFailure::unknown_host(text)
    } else if timed_out {
        let phase = if kind == ureq::ErrorKind::ConnectionFailed {
            "connect timed out"
        } else {
            "read timed out"
        };
        TransportFailure::socket_timeout(format!("{}: {}", phase, text))
    } else {
        TransportFailure::io(text)
    };
    failure.with_source(transport)
}

fn proxy_error(err: ureq::Error) -> Error {
    Error::invalid_argument(
        "proxy rejected",
        ErrorContext::new()
            .with_field_path("proxy")
            .with_details(err.to_string())
            .with_source(ENGINE),
    )
}

/// ureq's default webpki roots plus the caller's certificates.
fn trust_store(certificates: &[Certificate]) -> Result<rustls::RootCertStore> {
    let mut roots = rustls::RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };
    for certificate in certificates {
        for der in certificate.der_certificates()? {
            roots.add(der).map_err(|e| tls_error(e.to_string()))?;
        }
    }
    Ok(roots)
}

fn tls_error(details: impl Into<String>) -> Error {
    Error::invalid_argument(
        "root certificate rejected",
        ErrorContext::new()
            .with_field_path("tls.root_certificates")
            .with_details(details)
            .with_source(ENGINE),
    )
}

impl ClientBuilderTarget for ureq::AgentBuilder {
    const ENGINE: &'static str = ENGINE;

    fn connect_timeout(self, timeout: Duration) -> Self {
        self.timeout_connect(timeout)
    }

    fn read_timeout(self, timeout: Duration) -> Self {
        self.timeout_read(timeout)
    }

    fn write_timeout(self, timeout: Duration) -> Self {
        self.timeout_write(timeout)
    }

    fn max_connections(self, total: usize) -> Self {
        self.max_idle_connections(total)
    }

    fn max_per_route(self, per_route: usize) -> Self {
        self.max_idle_connections_per_host(per_route)
    }

    fn redirect_policy(self, follow: bool, max: Option<u32>) -> Self {
        let limit = if follow {
            max.unwrap_or(DEFAULT_REDIRECTS)
        } else {
            0
        };
        self.redirects(limit)
    }

    fn user_agent(self, user_agent: &str) -> Self {
        ureq::AgentBuilder::user_agent(self, user_agent)
    }

    fn proxy(self, url: &str) -> Result<Self> {
        let proxy = ureq::Proxy::new(url).map_err(proxy_error)?;
        Ok(ureq::AgentBuilder::proxy(self, proxy))
    }

    fn root_certificates(self, certificates: &[Certificate]) -> Result<Self> {
        let roots = trust_store(certificates)?;
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let config = rustls::ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| tls_error(e.to_string()))?
            .with_root_certificates(roots)
            .with_no_client_auth();
        Ok(self.tls_config(Arc::new(config)))
    }
}
