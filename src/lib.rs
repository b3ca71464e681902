//! # unihttp
//!
//! One HTTP client facade over two engines.
//!
//! Application code dispatches any of a closed set of verbs (the standard
//! methods plus WebDAV and link-style extensions) against a target, with
//! optional query parameters, headers, body and per-call read timeout. The
//! request is executed by whichever engine the client was built with, and
//! the outcome comes back in engine-neutral types:
//!
//! - [`HttpClient`] blocks and returns a [`Response`] or an [`Error`].
//! - [`HttpAsyncClient`] returns immediately and later fires a [`Callback`]
//!   exactly once, on an engine worker thread.
//!
//! ## Engines
//!
//! | [`BackendKind`] | engine | blocking calls | callback calls |
//! |---|---|---|---|
//! | `Reqwest` (default) | [`ReqwestBackend`] | `reqwest::blocking` | `reqwest` on an engine-owned tokio runtime |
//! | `Ureq` | [`UreqBackend`] | `ureq::Agent` | `ureq::Agent` via `spawn_blocking` |
//!
//! Anything implementing [`SyncBackend`] / [`AsyncBackend`] can be injected
//! through [`HttpClientBuilder`] instead.
//!
//! ## Errors
//!
//! Every failure is one of five [`ErrorKind`]s. Invalid arguments are raised
//! before anything is sent, on both clients. Engine failures are classified
//! into connect timeout, read timeout, host resolution failure or generic
//! request failure; engine error types never escape the crate.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use unihttp::{Configuration, HttpClientBuilder, RequestBody, RequestOptions};
//! use std::time::Duration;
//!
//! fn main() -> unihttp::Result<()> {
//!     let client = HttpClientBuilder::new()
//!         .configuration(Configuration::new().with_connect_timeout(Duration::from_secs(2)))
//!         .build();
//!
//!     let response = client.post(
//!         "http://localhost:8080/items",
//!         Some(RequestBody::json(&serde_json::json!({"name": "widget"}))?),
//!         RequestOptions::new()
//!             .parameter("dry_run", "true")
//!             .header("X-Request-Source", "docs"),
//!     )?;
//!     println!("{} {}", response.status, response.body.text());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Blocking and callback facades, verb dispatch, error classification |
//! | [`config`] | Engine-neutral configuration, environment and YAML loading |
//! | [`transport`] | Engine capability traits, the two engines, configuration projection |
//! | [`types`] | Verbs, request and response types |

pub mod client;
pub mod config;
pub mod transport;
pub mod types;

pub use client::{Callback, HttpAsyncClient, HttpClient, HttpClientBuilder, ResponseFuture};
pub use config::{BackendKind, Certificate, Configuration, TlsConfiguration};
pub use transport::{AsyncBackend, ReqwestBackend, SyncBackend, UreqBackend};
pub use types::{
    Header, Parameters, ProtocolVersion, RequestBody, RequestMethod, RequestOptions, Response,
    ResponseBody,
};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext, ErrorKind};
