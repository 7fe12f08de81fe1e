//! Transport seam between the gateway and the network.
//!
//! The gateway's classification logic runs over a [`Transport`], so it can be
//! exercised in tests without sockets. [`HttpTransport`] is the production
//! implementation over reqwest.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

use crate::descriptor::{RequestBody, Verb};

/// Default per-request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// A fully resolved outbound request.
#[derive(Debug, Clone)]
pub struct WireRequest {
    /// HTTP verb.
    pub verb: Verb,
    /// Absolute URL.
    pub url: String,
    /// Bearer credential to attach, when required.
    pub bearer: Option<String>,
    /// Optional body.
    pub body: Option<RequestBody>,
}

/// The raw outcome of a transport exchange.
#[derive(Debug, Clone)]
pub struct WireResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl WireResponse {
    /// Returns true for a 2xx status.
    #[must_use]
    pub fn is_transport_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failures below the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The connection could not be established or was dropped.
    ConnectionFailed { reason: String },
    /// No response arrived within the timeout.
    Timeout,
    /// The request could not be constructed (e.g. an unparsable URL).
    InvalidRequest { reason: String },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionFailed { reason } => {
                write!(f, "connection failed: {reason}")
            }
            Self::Timeout => write!(f, "request timed out"),
            Self::InvalidRequest { reason } => {
                write!(f, "invalid request: {reason}")
            }
        }
    }
}

impl std::error::Error for TransportError {}

/// Executes resolved requests against the network.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Executes one request and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns an error only for failures below the HTTP layer; a response
    /// with a failure status is still an `Ok`.
    async fn execute(&self, request: WireRequest) -> Result<WireResponse, TransportError>;
}

/// reqwest-backed transport.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with the default request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying client cannot be constructed.
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|err| TransportError::InvalidRequest {
                reason: err.to_string(),
            })?;
        Ok(Self { client })
    }

    /// Creates a transport over a caller-configured client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: WireRequest) -> Result<WireResponse, TransportError> {
        let method = match request.verb {
            Verb::Get => reqwest::Method::GET,
            Verb::Post => reqwest::Method::POST,
            Verb::Put => reqwest::Method::PUT,
            Verb::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, request.url.as_str());
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        match request.body {
            Some(RequestBody::Json(value)) => {
                builder = builder.json(&value);
            }
            Some(RequestBody::Bytes { content_type, data }) => {
                builder = builder
                    .header(reqwest::header::CONTENT_TYPE, content_type)
                    .body(data);
            }
            None => {}
        }

        let response = builder.send().await.map_err(classify_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(classify_reqwest_error)?
            .to_vec();

        Ok(WireResponse { status, body })
    }
}

fn classify_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_builder() || err.is_request() {
        TransportError::InvalidRequest {
            reason: err.to_string(),
        }
    } else {
        TransportError::ConnectionFailed {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_success_is_2xx() {
        let ok = WireResponse {
            status: 204,
            body: Vec::new(),
        };
        assert!(ok.is_transport_success());

        let redirect = WireResponse {
            status: 301,
            body: Vec::new(),
        };
        assert!(!redirect.is_transport_success());

        let failure = WireResponse {
            status: 500,
            body: Vec::new(),
        };
        assert!(!failure.is_transport_success());
    }

    #[test]
    fn transport_error_display() {
        let err = TransportError::ConnectionFailed {
            reason: "dns failure".to_string(),
        };
        assert!(err.to_string().contains("dns failure"));
        assert_eq!(TransportError::Timeout.to_string(), "request timed out");
    }
}
