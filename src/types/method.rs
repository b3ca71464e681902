//! Request verbs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every verb the clients can dispatch.
///
/// The set is closed: adding a verb means adding a variant here, and the
/// compiler then points at every dispatch `match` that must handle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Connect,
    Trace,
    Copy,
    Move,
    Head,
    Options,
    Link,
    Unlink,
    Purge,
    Lock,
    Unlock,
    Propfind,
    Proppatch,
    Report,
    View,
    Wrapped,
}

impl RequestMethod {
    pub const ALL: [RequestMethod; 21] = [
        RequestMethod::Get,
        RequestMethod::Post,
        RequestMethod::Put,
        RequestMethod::Patch,
        RequestMethod::Delete,
        RequestMethod::Connect,
        RequestMethod::Trace,
        RequestMethod::Copy,
        RequestMethod::Move,
        RequestMethod::Head,
        RequestMethod::Options,
        RequestMethod::Link,
        RequestMethod::Unlink,
        RequestMethod::Purge,
        RequestMethod::Lock,
        RequestMethod::Unlock,
        RequestMethod::Propfind,
        RequestMethod::Proppatch,
        RequestMethod::Report,
        RequestMethod::View,
        RequestMethod::Wrapped,
    ];

    /// Upper-case name as written on the request line.
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMethod::Get => "GET",
            RequestMethod::Post => "POST",
            RequestMethod::Put => "PUT",
            RequestMethod::Patch => "PATCH",
            RequestMethod::Delete => "DELETE",
            RequestMethod::Connect => "CONNECT",
            RequestMethod::Trace => "TRACE",
            RequestMethod::Copy => "COPY",
            RequestMethod::Move => "MOVE",
            RequestMethod::Head => "HEAD",
            RequestMethod::Options => "OPTIONS",
            RequestMethod::Link => "LINK",
            RequestMethod::Unlink => "UNLINK",
            RequestMethod::Purge => "PURGE",
            RequestMethod::Lock => "LOCK",
            RequestMethod::Unlock => "UNLOCK",
            RequestMethod::Propfind => "PROPFIND",
            RequestMethod::Proppatch => "PROPPATCH",
            RequestMethod::Report => "REPORT",
            RequestMethod::View => "VIEW",
            RequestMethod::Wrapped => "WRAPPED",
        }
    }

    /// Whether this verb forwards a request body.
    pub fn carries_body(&self) -> bool {
        matches!(
            self,
            RequestMethod::Post
                | RequestMethod::Put
                | RequestMethod::Patch
                | RequestMethod::Proppatch
                | RequestMethod::Report
        )
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown request method: {0}")]
pub struct UnknownMethod(pub String);

impl FromStr for RequestMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        RequestMethod::ALL
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownMethod(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique_and_parse_back() {
        let names: HashSet<&str> = RequestMethod::ALL.iter().map(|m| m.as_str()).collect();
        assert_eq!(names.len(), RequestMethod::ALL.len());
        for method in RequestMethod::ALL {
            assert_eq!(method.as_str().parse::<RequestMethod>().unwrap(), method);
            assert_eq!(
                method.as_str().to_lowercase().parse::<RequestMethod>().unwrap(),
                method
            );
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "BREW".parse::<RequestMethod>().unwrap_err();
        assert_eq!(err, UnknownMethod("BREW".into()));
    }

    #[test]
    fn body_verbs() {
        let with_body: Vec<_> = RequestMethod::ALL
            .iter()
            .filter(|m| m.carries_body())
            .map(|m| m.as_str())
            .collect();
        assert_eq!(with_body, vec!["POST", "PUT", "PATCH", "PROPPATCH", "REPORT"]);
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&RequestMethod::Propfind).unwrap();
        assert_eq!(json, "\"PROPFIND\"");
        let back: RequestMethod = serde_json::from_str("\"UNLOCK\"").unwrap();
        assert_eq!(back, RequestMethod::Unlock);
    }
}
