//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::io::Read;
use std::net::{SocketAddr, TcpListener};
use std::sync::Once;
use std::thread;
use std::time::Duration;
use unihttp::{BackendKind, Configuration, HttpAsyncClient, HttpClient, HttpClientBuilder};

pub const ENGINES: [BackendKind; 2] = [BackendKind::Reqwest, BackendKind::Ureq];

/// Install a fmt subscriber once; `RUST_LOG=unihttp=debug` shows engine logs.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn configuration(engine: BackendKind) -> Configuration {
    Configuration::new()
        .with_backend(engine)
        .with_connect_timeout(Duration::from_secs(2))
        .with_read_timeout(Duration::from_secs(5))
}

pub fn client(engine: BackendKind) -> HttpClient {
    init_tracing();
    HttpClientBuilder::new()
        .configuration(configuration(engine))
        .build()
}

pub fn async_client(engine: BackendKind) -> HttpAsyncClient {
    init_tracing();
    HttpClientBuilder::new()
        .configuration(configuration(engine))
        .build_async()
}

/// Listener that accepts connections and never answers.
///
/// Connections are held open until the process exits.
pub fn stalled_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stalled listener");
    let addr = listener.local_addr().expect("listener address");
    thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming().flatten() {
            let mut reader = stream.try_clone().expect("clone stream");
            thread::spawn(move || {
                let mut sink = [0u8; 1024];
                while matches!(reader.read(&mut sink), Ok(n) if n > 0) {}
            });
            held.push(stream);
        }
    });
    addr
}

/// Address nothing listens on.
pub fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("listener address");
    drop(listener);
    addr
}

/// Open file descriptors of this process, where the platform exposes them.
pub fn open_descriptors() -> Option<usize> {
    std::fs::read_dir("/proc/self/fd").ok().map(|dir| dir.count())
}
