//! Typed error taxonomy for the request gateway.
//!
//! Every failed call maps to exactly one variant. Classification is a total
//! function over the observed transport status and application code: each
//! kind matches on the transport status first, then the application code,
//! and the first matching kind wins.

use std::fmt;

/// A classified gateway failure.
///
/// Variants carrying a `message` hold the server-supplied text when the
/// response included one; `Display` falls back to a fixed phrase per kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// No credential is available locally; the request was never sent.
    Unauthenticated,
    /// The transport failed before an HTTP response was received.
    Network { reason: String },
    /// 401: the session is no longer valid.
    Unauthorized { message: Option<String> },
    /// 403: the session is valid but lacks a specific right.
    Forbidden { message: Option<String> },
    /// 404: the requested resource does not exist.
    NotFound { message: Option<String> },
    /// 400: the request parameters were rejected.
    BadRequest { message: Option<String> },
    /// 500: the backend failed.
    ServerError { message: Option<String> },
    /// Any other status/code pairing, carrying the observed code.
    Unknown { code: i64, message: Option<String> },
}

impl GatewayError {
    /// Classifies a response outcome into exactly one variant.
    ///
    /// `status` is the transport status; `code` the application code from the
    /// response envelope, when one could be decoded.
    #[must_use]
    pub fn classify(status: u16, code: Option<i64>, message: Option<String>) -> Self {
        let is = |candidate: i64| i64::from(status) == candidate || code == Some(candidate);

        if is(401) {
            Self::Unauthorized { message }
        } else if is(403) {
            Self::Forbidden { message }
        } else if is(404) {
            Self::NotFound { message }
        } else if is(400) {
            Self::BadRequest { message }
        } else if is(500) {
            Self::ServerError { message }
        } else {
            Self::Unknown {
                code: code.unwrap_or_else(|| i64::from(status)),
                message,
            }
        }
    }

    /// Returns the server-supplied message, when one was present.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Unauthenticated => None,
            Self::Network { .. } => None,
            Self::Unauthorized { message }
            | Self::Forbidden { message }
            | Self::NotFound { message }
            | Self::BadRequest { message }
            | Self::ServerError { message }
            | Self::Unknown { message, .. } => message.as_deref(),
        }
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "not signed in, please log in first"),
            Self::Network { reason } => write!(f, "failed to reach server: {reason}"),
            Self::Unauthorized { message } => write!(
                f,
                "{}",
                message.as_deref().unwrap_or("unauthorized, please log in again")
            ),
            Self::Forbidden { message } => write!(
                f,
                "{}",
                message.as_deref().unwrap_or("insufficient permission for this resource")
            ),
            Self::NotFound { message } => write!(
                f,
                "{}",
                message.as_deref().unwrap_or("requested resource does not exist")
            ),
            Self::BadRequest { message } => write!(
                f,
                "{}",
                message.as_deref().unwrap_or("invalid request parameters")
            ),
            Self::ServerError { message } => write!(
                f,
                "{}",
                message.as_deref().unwrap_or("internal server error")
            ),
            Self::Unknown { code, message } => match message {
                Some(message) => write!(f, "{message}"),
                None => write!(f, "request failed ({code})"),
            },
        }
    }
}

impl std::error::Error for GatewayError {}
