//! Error classification: engine failures to the crate's [`ErrorKind`]s.
//!
//! Some engines only tell connect and read timeouts apart in their message
//! text, so the timeout split is text based. Every engine failure goes through
//! [`classify`]; nothing else inspects failure text.

use crate::transport::{FailureCategory, TransportFailure};
use crate::{Error, ErrorKind};

const CONNECT_TIMEOUT_PHRASE: &str = "connect timed out";
const READ_TIMEOUT_PHRASE: &str = "read timed out";

/// Kind a failure is reported as. Never [`ErrorKind::InvalidArgument`].
pub fn classify(failure: &TransportFailure) -> ErrorKind {
    match failure.category() {
        FailureCategory::SocketTimeout => {
            let text = failure.message().to_lowercase();
            if text.contains(CONNECT_TIMEOUT_PHRASE) {
                ErrorKind::ConnectTimeout
            } else if text.contains(READ_TIMEOUT_PHRASE) {
                ErrorKind::ReadTimeout
            } else {
                ErrorKind::GenericRequestFailure
            }
        }
        FailureCategory::UnknownHost => ErrorKind::HostResolutionFailure,
        FailureCategory::Io => ErrorKind::GenericRequestFailure,
    }
}

/// Convert an engine failure into the error surfaced to callers.
pub(crate) fn into_error(failure: TransportFailure) -> Error {
    let message = failure.message().to_string();
    match classify(&failure) {
        ErrorKind::ConnectTimeout => Error::ConnectTimeout { message },
        ErrorKind::ReadTimeout => Error::ReadTimeout { message },
        ErrorKind::HostResolutionFailure => Error::HostResolution {
            message,
            source: failure,
        },
        ErrorKind::GenericRequestFailure | ErrorKind::InvalidArgument => Error::Request {
            message,
            source: failure,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn connect_phrase_is_connect_timeout() {
        let f = TransportFailure::socket_timeout("Connect Timed Out after 1500ms");
        assert_eq!(classify(&f), ErrorKind::ConnectTimeout);
    }

    #[test]
    fn read_phrase_is_read_timeout() {
        let f = TransportFailure::socket_timeout("read timed out: operation timed out");
        assert_eq!(classify(&f), ErrorKind::ReadTimeout);
    }

    #[test]
    fn unphrased_timeout_is_generic() {
        let f = TransportFailure::socket_timeout("timeout");
        assert_eq!(classify(&f), ErrorKind::GenericRequestFailure);
    }

    #[test]
    fn timeout_phrases_outside_timeout_category_do_not_count() {
        let f = TransportFailure::io("upstream said: read timed out");
        assert_eq!(classify(&f), ErrorKind::GenericRequestFailure);
    }

    #[test]
    fn unresolved_host_keeps_its_cause() {
        let f = TransportFailure::unknown_host("failed to lookup address")
            .with_source(io::Error::new(io::ErrorKind::Other, "nxdomain"));
        assert_eq!(classify(&f), ErrorKind::HostResolutionFailure);
        let err = into_error(f);
        assert_eq!(err.kind(), ErrorKind::HostResolutionFailure);
        assert!(err.source().is_some());
    }

    #[test]
    fn other_io_wraps_the_cause() {
        let err = into_error(
            TransportFailure::io("connection refused")
                .with_source(io::Error::new(io::ErrorKind::ConnectionRefused, "refused")),
        );
        assert_eq!(err.kind(), ErrorKind::GenericRequestFailure);
        let cause = err.source().unwrap();
        assert_eq!(cause.to_string(), "connection refused");
        assert!(cause.source().is_some());
    }
}
