//! Engine failures surface as classified errors, never engine types.

mod common;

use std::error::Error as _;
use std::time::{Duration, Instant};
use unihttp::{ErrorKind, RequestOptions};

#[test]
fn stalled_response_is_a_read_timeout() {
    let addr = common::stalled_server();
    for engine in common::ENGINES {
        let client = common::client(engine);
        let started = Instant::now();
        let err = client
            .delete(
                format!("http://{}/slow", addr),
                RequestOptions::new().read_timeout(Duration::from_millis(200)),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReadTimeout, "{}: {}", engine, err);
        assert!(err.is_timeout());
        // The per-call override is shorter than the configured 5s read budget.
        assert!(started.elapsed() < Duration::from_secs(4), "{}", engine);
    }
}

#[test]
fn unresolvable_host_is_a_resolution_failure() {
    for engine in common::ENGINES {
        let err = common::client(engine)
            .get("http://unihttp-does-not-exist.invalid/", RequestOptions::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::HostResolutionFailure, "{}: {}", engine, err);
        assert!(err.source().is_some());
    }
}

#[test]
fn refused_connection_is_a_generic_failure() {
    let addr = common::closed_port();
    for engine in common::ENGINES {
        let err = common::client(engine)
            .get(format!("http://{}/", addr), RequestOptions::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::GenericRequestFailure, "{}: {}", engine, err);
        let cause = err.source().expect("engine failure kept as cause");
        assert!(!cause.to_string().is_empty());
    }
}

#[test]
fn classifier_reads_timeout_phrases() {
    use unihttp::client::classify;
    use unihttp::transport::TransportFailure;

    let cases = [
        (TransportFailure::socket_timeout("connect timed out"), ErrorKind::ConnectTimeout),
        (TransportFailure::socket_timeout("Read timed out"), ErrorKind::ReadTimeout),
        (TransportFailure::socket_timeout("timed out"), ErrorKind::GenericRequestFailure),
        (TransportFailure::unknown_host("example.invalid"), ErrorKind::HostResolutionFailure),
        (TransportFailure::io("broken pipe"), ErrorKind::GenericRequestFailure),
    ];
    for (failure, expected) in cases {
        assert_eq!(classify(&failure), expected, "{}", failure);
    }
}
