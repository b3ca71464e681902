//! Normalized response returned to callers.

use crate::types::Header;
use bytes::Bytes;
use std::fmt;
use std::io::{Cursor, Read};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolVersion {
    Http09,
    Http10,
    Http11,
    Http2,
    Http3,
}

impl ProtocolVersion {
    /// Parses a status-line version token such as `HTTP/1.1`.
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "HTTP/0.9" => Some(ProtocolVersion::Http09),
            "HTTP/1.0" => Some(ProtocolVersion::Http10),
            "HTTP/1.1" => Some(ProtocolVersion::Http11),
            "HTTP/2" | "HTTP/2.0" => Some(ProtocolVersion::Http2),
            "HTTP/3" | "HTTP/3.0" => Some(ProtocolVersion::Http3),
            _ => None,
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProtocolVersion::Http09 => "HTTP/0.9",
            ProtocolVersion::Http10 => "HTTP/1.0",
            ProtocolVersion::Http11 => "HTTP/1.1",
            ProtocolVersion::Http2 => "HTTP/2",
            ProtocolVersion::Http3 => "HTTP/3",
        })
    }
}

/// Response payload, already drained from the engine.
///
/// The engine's connection is released before a `ResponseBody` exists, so
/// holding one never pins a pooled connection.
#[derive(Clone, Default)]
pub struct ResponseBody {
    data: Bytes,
}

impl ResponseBody {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    /// Consume the body as a byte stream.
    pub fn reader(self) -> impl Read + Send + 'static {
        Cursor::new(self.data)
    }

    pub fn bytes(self) -> Bytes {
        self.data
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Lossy UTF-8 view of the payload.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseBody")
            .field("len", &self.data.len())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    /// Reason phrase, when the engine reports one.
    pub reason: Option<String>,
    pub version: ProtocolVersion,
    pub headers: Vec<Header>,
    pub body: ResponseBody,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name().eq_ignore_ascii_case(name))
            .map(Header::value)
    }

    pub fn headers_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |h| h.name().eq_ignore_ascii_case(name))
            .map(Header::value)
    }

    pub fn into_body(self) -> ResponseBody {
        self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response() -> Response {
        Response {
            status: 207,
            reason: Some("Multi-Status".into()),
            version: ProtocolVersion::Http11,
            headers: vec![
                Header::new("Set-Cookie", "a=1"),
                Header::new("content-type", "application/xml"),
                Header::new("set-cookie", "b=2"),
            ],
            body: ResponseBody::new("<multistatus/>"),
        }
    }

    #[test]
    fn header_lookup_is_case_insensitive_and_ordered() {
        let resp = response();
        assert_eq!(resp.header("Content-Type"), Some("application/xml"));
        let cookies: Vec<_> = resp.headers_named("SET-COOKIE").collect();
        assert_eq!(cookies, vec!["a=1", "b=2"]);
        assert!(resp.is_success());
    }

    #[test]
    fn body_reader_yields_payload() {
        let mut out = String::new();
        response().into_body().reader().read_to_string(&mut out).unwrap();
        assert_eq!(out, "<multistatus/>");
    }

    #[test]
    fn version_tokens() {
        assert_eq!(ProtocolVersion::parse("HTTP/1.1"), Some(ProtocolVersion::Http11));
        assert_eq!(ProtocolVersion::parse("http/2.0"), Some(ProtocolVersion::Http2));
        assert_eq!(ProtocolVersion::parse("SPDY/3"), None);
        assert_eq!(ProtocolVersion::Http10.to_string(), "HTTP/1.0");
    }
}
