//! Projection of a [`Configuration`] onto an engine's client builder.

use crate::config::{Certificate, Configuration};
use crate::Result;
use std::time::Duration;
use tracing::{debug, warn};

/// Setter surface of an engine's client builder.
///
/// Setters the engine has no counterpart for keep the default body, which
/// logs the skip and leaves the builder untouched.
pub trait ClientBuilderTarget: Sized {
    const ENGINE: &'static str;

    fn connect_timeout(self, timeout: Duration) -> Self;

    fn read_timeout(self, timeout: Duration) -> Self;

    fn write_timeout(self, _timeout: Duration) -> Self {
        skipped(Self::ENGINE, "write_timeout");
        self
    }

    fn max_connections(self, _total: usize) -> Self {
        skipped(Self::ENGINE, "max_connections");
        self
    }

    fn max_per_route(self, per_route: usize) -> Self;

    /// `max` is only meaningful when `follow` is true.
    fn redirect_policy(self, follow: bool, max: Option<u32>) -> Self;

    fn retry_on_connection_failure(self, _enabled: bool) -> Self {
        skipped(Self::ENGINE, "retry_on_connection_failure");
        self
    }

    fn user_agent(self, user_agent: &str) -> Self;

    /// A URL the engine cannot use is an invalid argument.
    fn proxy(self, url: &str) -> Result<Self>;

    fn content_compression(self, _enabled: bool) -> Self {
        skipped(Self::ENGINE, "content_compression");
        self
    }

    fn root_certificates(self, certificates: &[Certificate]) -> Result<Self>;

    fn validate_server_certificate(self, enabled: bool) -> Self {
        tls_check_kept(Self::ENGINE, "tls.validate_server_certificate", enabled);
        self
    }

    fn verify_hostname(self, enabled: bool) -> Self {
        tls_check_kept(Self::ENGINE, "tls.verify_hostname", enabled);
        self
    }
}

fn skipped(engine: &str, field: &str) {
    debug!(engine, field, "configuration field has no setter on this engine; keeping engine default");
}

/// A caller asking to turn a TLS check off on an engine that cannot do so
/// still gets the check.
fn tls_check_kept(engine: &str, field: &str, enabled: bool) {
    if enabled {
        skipped(engine, field);
    } else {
        warn!(engine, field, "cannot disable this TLS check on this engine; it stays enabled");
    }
}

fn positive(d: &Duration) -> bool {
    !d.is_zero()
}

/// Apply every populated field of `configuration` to `builder`.
///
/// Absent and zero values are never pushed. Projecting the same
/// configuration twice leaves the builder as projecting it once.
pub fn project<B: ClientBuilderTarget>(configuration: &Configuration, builder: B) -> Result<B> {
    let mut builder = builder;

    if let Some(t) = configuration.connect_timeout.filter(positive) {
        builder = builder.connect_timeout(t);
    }
    if let Some(t) = configuration.read_timeout.filter(positive) {
        builder = builder.read_timeout(t);
    }
    if let Some(t) = configuration.write_timeout.filter(positive) {
        builder = builder.write_timeout(t);
    }
    if let Some(n) = configuration.max_connections.filter(|n| *n > 0) {
        builder = builder.max_connections(n);
    }
    if let Some(n) = configuration.max_per_route.filter(|n| *n > 0) {
        builder = builder.max_per_route(n);
    }
    match (configuration.follow_redirects, configuration.max_redirects) {
        (Some(follow), max) => builder = builder.redirect_policy(follow, max),
        (None, Some(max)) => builder = builder.redirect_policy(true, Some(max)),
        (None, None) => {}
    }
    if let Some(enabled) = configuration.retry_on_connection_failure {
        builder = builder.retry_on_connection_failure(enabled);
    }
    if let Some(ua) = configuration.user_agent.as_deref().filter(|s| !s.trim().is_empty()) {
        builder = builder.user_agent(ua);
    }
    if let Some(url) = configuration.proxy.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        builder = builder.proxy(url)?;
    }
    if let Some(enabled) = configuration.content_compression {
        builder = builder.content_compression(enabled);
    }

    if let Some(tls) = &configuration.tls {
        if !tls.root_certificates.is_empty() {
            builder = builder.root_certificates(&tls.root_certificates)?;
        }
        if let Some(enabled) = tls.validate_server_certificate {
            builder = builder.validate_server_certificate(enabled);
        }
        if let Some(enabled) = tls.verify_hostname {
            builder = builder.verify_hostname(enabled);
        }
    }

    debug!(engine = B::ENGINE, "configuration projected");
    Ok(builder)
}
