//! Core data types shared by both clients and every engine.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`RequestMethod`] | Closed set of dispatchable verbs, WebDAV extensions included |
//! | [`RequestOptions`] | Query parameters, headers and read-timeout override for one call |
//! | [`RequestBody`] | Opaque payload tagged with a content type |
//! | [`RequestDescriptor`] | Immutable, validated request handed to an engine |
//! | [`Response`] | Normalized response owned by the caller |
//!
//! ## Example
//!
//! ```rust
//! use unihttp::types::{Parameters, RequestBody, RequestOptions};
//! use std::time::Duration;
//!
//! let options = RequestOptions::new()
//!     .parameter("q", "1")
//!     .header("X-Trace", "abc")
//!     .read_timeout(Duration::from_secs(5));
//! let body = RequestBody::form(&Parameters::from([("name", "unihttp")]));
//! assert_eq!(body.content_type(), Some("application/x-www-form-urlencoded"));
//! # let _ = options;
//! ```

pub mod method;
pub mod request;
pub mod response;

pub use method::RequestMethod;
pub use request::{Header, IntoTarget, Parameters, RequestBody, RequestDescriptor, RequestOptions};
pub use response::{ProtocolVersion, Response, ResponseBody};
