//! Execution adapter: the only path from a facade call to an engine.
//!
//! Validation happens here, before an engine sees anything, and every engine
//! failure is classified here before a caller sees it.

use super::callback::Callback;
use super::error_classification::into_error;
use crate::transport::{AsyncBackend, Completion, SyncBackend};
use crate::types::{IntoTarget, RequestBody, RequestDescriptor, RequestMethod, RequestOptions, Response};
use crate::{Error, ErrorContext, Result};
use tracing::{debug, debug_span, error, trace};
use uuid::Uuid;

/// Resolve a verb given by name.
///
/// A blank name is rejected. A name outside the verb set dispatches as GET.
pub(crate) fn resolve_named(name: &str) -> Result<RequestMethod> {
    if name.trim().is_empty() {
        return Err(Error::invalid_argument(
            "request method is required",
            ErrorContext::new()
                .with_field_path("method")
                .with_source("dispatch"),
        ));
    }
    Ok(name.parse().unwrap_or_else(|_| {
        debug!(method = name, "unrecognized method, dispatching as GET");
        RequestMethod::Get
    }))
}

fn describe_request<T: IntoTarget>(
    method: RequestMethod,
    target: T,
    body: Option<RequestBody>,
    options: RequestOptions,
) -> Result<RequestDescriptor> {
    let body = if method.carries_body() {
        body
    } else {
        if body.is_some() {
            debug!(%method, "verb carries no body, dropping it");
        }
        None
    };
    RequestDescriptor::new(method, target.into_target()?, body, options)
}

/// Send one request and block until it finishes.
pub(crate) fn execute<T: IntoTarget>(
    backend: &dyn SyncBackend,
    method: RequestMethod,
    target: T,
    body: Option<RequestBody>,
    options: RequestOptions,
) -> Result<Response> {
    let request = describe_request(method, target, body, options)?;
    backend.prepare()?;

    let request_id = Uuid::new_v4();
    let span = debug_span!("request", %request_id, %method, engine = backend.name());
    let _entered = span.enter();

    match backend.execute(&request) {
        Ok(response) => {
            trace!(status = response.status, "request completed");
            Ok(response)
        }
        Err(failure) => {
            let err = into_error(failure);
            error!(url = %request.url(), kind = ?err.kind(), error = %err, "request failed");
            Err(err)
        }
    }
}

/// Hand one request to the engine's workers and return.
///
/// Only invalid arguments are returned here; every other outcome reaches
/// `callback`, exactly once.
pub(crate) fn submit<T: IntoTarget>(
    backend: &dyn AsyncBackend,
    method: RequestMethod,
    target: T,
    body: Option<RequestBody>,
    options: RequestOptions,
    callback: Box<dyn Callback>,
) -> Result<()> {
    let request = describe_request(method, target, body, options)?;
    backend.prepare()?;

    let request_id = Uuid::new_v4();
    let url = request.url().to_string();
    let completion = Completion::new(move |outcome| match outcome {
        Ok(response) => {
            trace!(%request_id, status = response.status, "request completed");
            callback.completed(response);
        }
        Err(failure) => {
            let err = into_error(failure);
            error!(%request_id, %method, url = %url, kind = ?err.kind(), error = %err, "request failed");
            callback.failed(err);
        }
    });

    let span = debug_span!("request", %request_id, %method, engine = backend.name());
    let _entered = span.enter();
    backend.submit(request, completion);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn names_resolve_case_insensitively() {
        assert_eq!(resolve_named("propfind").unwrap(), RequestMethod::Propfind);
        assert_eq!(resolve_named(" Delete ").unwrap(), RequestMethod::Delete);
    }

    #[test]
    fn unknown_names_fall_back_to_get() {
        assert_eq!(resolve_named("FROBNICATE").unwrap(), RequestMethod::Get);
    }

    #[test]
    fn blank_names_are_invalid() {
        for name in ["", "   "] {
            let err = resolve_named(name).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
            assert_eq!(err.context().unwrap().field_path.as_deref(), Some("method"));
        }
    }

    #[test]
    fn bodiless_verbs_drop_the_body() {
        let request = describe_request(
            RequestMethod::Delete,
            "http://example.test/a",
            Some(RequestBody::text("x")),
            RequestOptions::new(),
        )
        .unwrap();
        assert!(request.body().is_none());
        assert!(request.headers().is_empty());
    }
}
