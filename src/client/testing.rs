//! In-memory engine for dispatcher tests.

use crate::transport::{AsyncBackend, Completion, Outcome, SyncBackend, TransportFailure};
use crate::types::{ProtocolVersion, RequestDescriptor, RequestMethod, Response, ResponseBody};
use crate::Result;
use std::sync::Mutex;
use std::thread;

/// Records every request it receives and answers with a canned outcome.
///
/// Callback requests are completed from a fresh thread.
pub(crate) struct RecordingBackend {
    calls: Mutex<Vec<RequestDescriptor>>,
    respond: fn(&RequestDescriptor) -> Outcome,
}

impl RecordingBackend {
    pub(crate) fn ok() -> Self {
        Self::answering(|request| Ok(echo(request)))
    }

    pub(crate) fn answering(respond: fn(&RequestDescriptor) -> Outcome) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            respond,
        }
    }

    pub(crate) fn calls(&self) -> Vec<RequestDescriptor> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn methods(&self) -> Vec<RequestMethod> {
        self.calls().iter().map(RequestDescriptor::method).collect()
    }

    fn record(&self, request: &RequestDescriptor) -> Outcome {
        self.calls.lock().unwrap().push(request.clone());
        (self.respond)(request)
    }
}

/// 200 response whose body is the method name.
pub(crate) fn echo(request: &RequestDescriptor) -> Response {
    Response {
        status: 200,
        reason: Some("OK".into()),
        version: ProtocolVersion::Http11,
        headers: Vec::new(),
        body: ResponseBody::new(request.method().as_str().as_bytes().to_vec()),
    }
}

pub(crate) fn read_timeout(_: &RequestDescriptor) -> Outcome {
    Err(TransportFailure::socket_timeout("read timed out"))
}

impl SyncBackend for RecordingBackend {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn prepare(&self) -> Result<()> {
        Ok(())
    }

    fn execute(&self, request: &RequestDescriptor) -> Outcome {
        self.record(request)
    }
}

impl AsyncBackend for RecordingBackend {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn prepare(&self) -> Result<()> {
        Ok(())
    }

    fn submit(&self, request: RequestDescriptor, completion: Completion) {
        let outcome = self.record(&request);
        thread::Builder::new()
            .name("recording-worker".into())
            .spawn(move || completion.complete(outcome))
            .unwrap();
    }
}
