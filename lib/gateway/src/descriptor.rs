//! Request descriptor types.
//!
//! A descriptor is everything the gateway needs to issue one call: path,
//! verb, optional body, whether credentials are required (the default), and
//! which upstream host to target.

use serde_json::Value;
use std::fmt;

/// Upstream host a request targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TargetHost {
    /// The primary API.
    #[default]
    Primary,
    /// The plugin-store API.
    Store,
}

/// HTTP verb for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    /// Returns the verb as its wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Body attached to a request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// JSON-encoded body.
    Json(Value),
    /// Raw bytes with an explicit content type (uploads).
    Bytes { content_type: String, data: Vec<u8> },
}

/// Everything the gateway needs to issue one call.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// Resource path, or a full URL when it already begins with a scheme.
    pub path: String,
    /// HTTP verb.
    pub verb: Verb,
    /// Optional request body.
    pub body: Option<RequestBody>,
    /// Whether a stored credential must be attached. Defaults to true.
    pub auth_required: bool,
    /// Which upstream host to resolve the path against.
    pub target_host: TargetHost,
}

impl RequestDescriptor {
    /// Creates an authenticated descriptor against the primary host.
    #[must_use]
    pub fn new(verb: Verb, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            verb,
            body: None,
            auth_required: true,
            target_host: TargetHost::Primary,
        }
    }

    /// Attaches a JSON body.
    #[must_use]
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    /// Attaches a raw byte body with the given content type.
    #[must_use]
    pub fn with_bytes(mut self, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        self.body = Some(RequestBody::Bytes {
            content_type: content_type.into(),
            data,
        });
        self
    }

    /// Marks the request as anonymous: no credential is attached.
    #[must_use]
    pub fn anonymous(mut self) -> Self {
        self.auth_required = false;
        self
    }

    /// Targets the plugin-store host instead of the primary API.
    #[must_use]
    pub fn on_store_host(mut self) -> Self {
        self.target_host = TargetHost::Store;
        self
    }
}
