//! Request-side types: options, body, and the immutable descriptor handed to engines.

use crate::types::RequestMethod;
use crate::{Error, ErrorContext, Result};
use bytes::Bytes;
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// One header line. Order and duplicates are preserved end to end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    name: String,
    value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Ordered query-parameter multimap. Duplicate keys are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters(Vec<(String, String)>);

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl ToString) {
        self.0.push((key.into(), value.to_string()));
    }

    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.append(key, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: ToString, const N: usize> From<[(K, V); N]> for Parameters {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.to_string()))
                .collect(),
        )
    }
}

/// Opaque request payload with an optional content-type tag.
///
/// Encoding richer payloads (multipart and friends) is left to the caller;
/// the helpers here only cover the trivially encodable forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBody {
    content_type: Option<String>,
    data: Bytes,
}

impl RequestBody {
    pub fn bytes(content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            content_type: Some(content_type.into()),
            data: data.into(),
        }
    }

    /// Payload without a content-type tag.
    pub fn raw(data: impl Into<Bytes>) -> Self {
        Self {
            content_type: None,
            data: data.into(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::bytes("text/plain; charset=utf-8", text.into())
    }

    /// `application/x-www-form-urlencoded` body built from ordered pairs.
    pub fn form(fields: &Parameters) -> Self {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (k, v) in fields.iter() {
            serializer.append_pair(k, v);
        }
        Self::bytes("application/x-www-form-urlencoded", serializer.finish())
    }

    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let data = serde_json::to_vec(value).map_err(|e| {
            Error::invalid_argument(
                "request body could not be encoded as JSON",
                ErrorContext::new()
                    .with_field_path("body")
                    .with_details(e.to_string())
                    .with_source("request_body"),
            )
        })?;
        Ok(Self::bytes("application/json", data))
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Per-call options shared by every verb: query parameters, headers and an
/// optional read-timeout override.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub parameters: Parameters,
    pub headers: Vec<Header>,
    /// Overrides the configured read timeout for this call only. Zero means "not set".
    pub read_timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parameter(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.parameters.append(key, value);
        self
    }

    pub fn parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Header::new(name, value));
        self
    }

    pub fn headers(mut self, headers: Vec<Header>) -> Self {
        self.headers = headers;
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }
}

/// Conversion into a request target; string forms are parsed and rejected
/// as `InvalidArgument` when malformed.
pub trait IntoTarget {
    fn into_target(self) -> Result<Url>;
}

impl IntoTarget for Url {
    fn into_target(self) -> Result<Url> {
        Ok(self)
    }
}

impl IntoTarget for &Url {
    fn into_target(self) -> Result<Url> {
        Ok(self.clone())
    }
}

impl IntoTarget for &str {
    fn into_target(self) -> Result<Url> {
        Url::parse(self.trim()).map_err(|e| {
            Error::invalid_argument(
                format!("target is not a valid URI: {}", e),
                ErrorContext::new()
                    .with_field_path("target")
                    .with_details(self)
                    .with_source("request_validation"),
            )
        })
    }
}

impl IntoTarget for String {
    fn into_target(self) -> Result<Url> {
        self.as_str().into_target()
    }
}

impl IntoTarget for &String {
    fn into_target(self) -> Result<Url> {
        self.as_str().into_target()
    }
}

/// Validated, immutable request handed to an engine.
///
/// The URL already carries the query parameters, and the header list already
/// carries the body's `Content-Type` when the caller did not set one.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: RequestMethod,
    url: Url,
    headers: Vec<Header>,
    body: Option<RequestBody>,
    read_timeout: Option<Duration>,
}

impl RequestDescriptor {
    pub fn new(
        method: RequestMethod,
        target: Url,
        body: Option<RequestBody>,
        options: RequestOptions,
    ) -> Result<Self> {
        match target.scheme() {
            "http" | "https" => {}
            other => {
                return Err(Error::invalid_argument(
                    format!("unsupported URI scheme '{}'", other),
                    ErrorContext::new()
                        .with_field_path("target")
                        .with_details(target.as_str())
                        .with_source("request_validation"),
                ))
            }
        }
        if target.host_str().map_or(true, str::is_empty) {
            return Err(Error::invalid_argument(
                "target has no host",
                ErrorContext::new()
                    .with_field_path("target")
                    .with_details(target.as_str())
                    .with_source("request_validation"),
            ));
        }

        let RequestOptions {
            parameters,
            mut headers,
            read_timeout,
        } = options;

        for (idx, header) in headers.iter().enumerate() {
            validate_header(idx, header)?;
        }

        let mut url = target;
        if !parameters.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in parameters.iter() {
                pairs.append_pair(k, v);
            }
        }

        if let Some(content_type) = body.as_ref().and_then(RequestBody::content_type) {
            let explicit = headers
                .iter()
                .any(|h| h.name().eq_ignore_ascii_case("content-type"));
            if !explicit {
                headers.push(Header::new("Content-Type", content_type));
            }
        }

        Ok(Self {
            method,
            url,
            headers,
            body,
            read_timeout: read_timeout.filter(|t| !t.is_zero()),
        })
    }

    pub fn method(&self) -> RequestMethod {
        self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout
    }
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
}

fn validate_header(idx: usize, header: &Header) -> Result<()> {
    if header.name().is_empty() || !header.name().chars().all(is_token_char) {
        return Err(Error::invalid_argument(
            "invalid header name",
            ErrorContext::new()
                .with_field_path(format!("headers[{}].name", idx))
                .with_details(header.name())
                .with_source("request_validation"),
        ));
    }
    if header.value().chars().any(|c| matches!(c, '\r' | '\n' | '\0')) {
        return Err(Error::invalid_argument(
            "header value contains a line break or NUL",
            ErrorContext::new()
                .with_field_path(format!("headers[{}].value", idx))
                .with_source("request_validation"),
        ));
    }
    Ok(())
}
