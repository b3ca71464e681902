use crate::transport::TransportFailure;
use thiserror::Error;

/// Structured error context for argument failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Argument or configuration key that caused the error (e.g., "target", "headers[2].name")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., the rejected value)
    pub details: Option<String>,
    /// Source of the error (e.g., "request_validation", "reqwest_backend")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Reported error category. Every failure surfaced by this crate belongs to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    ConnectTimeout,
    ReadTimeout,
    HostResolutionFailure,
    GenericRequestFailure,
}

/// Unified error type.
///
/// Engine-specific error types never escape this crate: the execution adapter
/// classifies them into one of these variants first.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid argument: {message}{}", format_context(.context))]
    InvalidArgument {
        message: String,
        context: ErrorContext,
    },

    #[error("Connect timeout: {message}")]
    ConnectTimeout { message: String },

    #[error("Read timeout: {message}")]
    ReadTimeout { message: String },

    #[error("Host resolution failed: {message}")]
    HostResolution {
        message: String,
        #[source]
        source: TransportFailure,
    },

    #[error("Request failed: {message}")]
    Request {
        message: String,
        #[source]
        source: TransportFailure,
    },
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Create a new invalid-argument error with structured context
    pub fn invalid_argument(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::InvalidArgument {
            message: msg.into(),
            context,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Error::ConnectTimeout { .. } => ErrorKind::ConnectTimeout,
            Error::ReadTimeout { .. } => ErrorKind::ReadTimeout,
            Error::HostResolution { .. } => ErrorKind::HostResolutionFailure,
            Error::Request { .. } => ErrorKind::GenericRequestFailure,
        }
    }

    /// True for both connect and read timeouts.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::ConnectTimeout { .. } | Error::ReadTimeout { .. })
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::InvalidArgument { context, .. } => Some(context),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_display_includes_context() {
        let err = Error::invalid_argument(
            "target is not a valid URI",
            ErrorContext::new()
                .with_field_path("target")
                .with_details("ht!tp://")
                .with_source("request_validation"),
        );
        assert_eq!(
            err.to_string(),
            "Invalid argument: target is not a valid URI (field: target, details: ht!tp://, source: request_validation)"
        );
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.context().is_some());
    }

    #[test]
    fn request_failure_keeps_low_level_cause() {
        let err = Error::Request {
            message: "connection reset".into(),
            source: TransportFailure::io("connection reset by peer"),
        };
        let cause = std::error::Error::source(&err).expect("cause");
        assert!(cause.to_string().contains("connection reset by peer"));
        assert_eq!(err.kind(), ErrorKind::GenericRequestFailure);
        assert!(!err.is_timeout());
    }
}
