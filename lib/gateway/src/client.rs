//! The request gateway: the single choke point for outbound calls.
//!
//! Every server call passes through [`Gateway::send`], which resolves the
//! target host, attaches the stored bearer credential when required,
//! classifies the outcome, and emits the matching access event. Side effects
//! are strictly additive to the returned error; the gateway never absorbs a
//! failure.

use std::sync::Arc;

use punchcard_access::SessionStore;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};

use crate::descriptor::{RequestDescriptor, TargetHost, Verb};
use crate::envelope::Envelope;
use crate::error::GatewayError;
use crate::event::{AccessEvent, AccessObserver};
use crate::transport::{Transport, WireRequest};

/// Base URLs of the two upstream hosts.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Primary API base URL.
    pub api_base_url: String,
    /// Plugin-store API base URL.
    pub store_base_url: String,
}

impl GatewayConfig {
    /// Creates a config from the two base URLs.
    #[must_use]
    pub fn new(api_base_url: impl Into<String>, store_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            store_base_url: store_base_url.into(),
        }
    }
}

/// An established session returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSession {
    /// The username the session was established for.
    pub username: String,
}

/// The `/login` response payload. The field capitalization is a literal
/// contract of the backend.
#[derive(Debug, Deserialize)]
struct LoginData {
    #[serde(rename = "AccessToken", default)]
    access_token: Option<String>,
}

/// The single point of outbound communication.
pub struct Gateway {
    config: GatewayConfig,
    store: Arc<SessionStore>,
    transport: Arc<dyn Transport>,
    observer: Arc<dyn AccessObserver>,
}

impl Gateway {
    /// Creates a gateway over the given session store, transport, and
    /// observer.
    #[must_use]
    pub fn new(
        config: GatewayConfig,
        store: Arc<SessionStore>,
        transport: Arc<dyn Transport>,
        observer: Arc<dyn AccessObserver>,
    ) -> Self {
        Self {
            config,
            store,
            transport,
            observer,
        }
    }

    /// Returns the session store this gateway reads credentials from.
    #[must_use]
    pub fn session_store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Issues one call described by `descriptor`.
    ///
    /// When credentials are required and none are stored, the call fails
    /// with [`GatewayError::Unauthenticated`] without touching the network.
    /// Success requires both transport-level success and application code
    /// 200; every other combination classifies into exactly one
    /// [`GatewayError`] variant and emits one access event before returning.
    ///
    /// # Errors
    ///
    /// Returns the classified failure.
    #[instrument(skip_all, fields(verb = %descriptor.verb, path = %descriptor.path))]
    pub async fn send(&self, descriptor: RequestDescriptor) -> Result<Envelope, GatewayError> {
        let url = self.resolve_url(&descriptor);

        let bearer = if descriptor.auth_required {
            match self.store.credential() {
                Some(token) => Some(token),
                None => return Err(self.report(GatewayError::Unauthenticated)),
            }
        } else {
            None
        };

        let request = WireRequest {
            verb: descriptor.verb,
            url,
            bearer,
            body: descriptor.body,
        };
        let response = match self.transport.execute(request).await {
            Ok(response) => response,
            Err(err) => {
                return Err(self.report(GatewayError::Network {
                    reason: err.to_string(),
                }));
            }
        };

        let envelope: Envelope = match serde_json::from_slice(&response.body) {
            Ok(envelope) => envelope,
            Err(err) => {
                debug!(status = response.status, error = %err, "undecodable response payload");
                return Err(self.report(GatewayError::Unknown {
                    code: i64::from(response.status),
                    message: Some("invalid response payload".to_string()),
                }));
            }
        };

        // Both the transport status and the application code must agree.
        if response.is_transport_success() && envelope.is_success() {
            return Ok(envelope);
        }

        let err = GatewayError::classify(response.status, Some(envelope.code), envelope.message);
        Err(self.report(err))
    }

    /// Issues an authenticated GET against the primary host.
    ///
    /// # Errors
    ///
    /// Returns the classified failure.
    pub async fn get(&self, path: &str) -> Result<Envelope, GatewayError> {
        self.send(RequestDescriptor::new(Verb::Get, path)).await
    }

    /// Issues an authenticated POST with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns the classified failure.
    pub async fn post(&self, path: &str, body: Value) -> Result<Envelope, GatewayError> {
        self.send(RequestDescriptor::new(Verb::Post, path).with_json(body))
            .await
    }

    /// Issues an authenticated PUT with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns the classified failure.
    pub async fn put(&self, path: &str, body: Value) -> Result<Envelope, GatewayError> {
        self.send(RequestDescriptor::new(Verb::Put, path).with_json(body))
            .await
    }

    /// Issues an authenticated DELETE.
    ///
    /// # Errors
    ///
    /// Returns the classified failure.
    pub async fn delete(&self, path: &str) -> Result<Envelope, GatewayError> {
        self.send(RequestDescriptor::new(Verb::Delete, path)).await
    }

    /// Issues an authenticated POST with a raw byte body (uploads).
    ///
    /// # Errors
    ///
    /// Returns the classified failure.
    pub async fn post_bytes(
        &self,
        path: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<Envelope, GatewayError> {
        self.send(RequestDescriptor::new(Verb::Post, path).with_bytes(content_type, data))
            .await
    }

    /// Fetches an authenticated file download from the primary host.
    ///
    /// Downloads bypass envelope parsing: a 2xx response returns the raw
    /// bytes, anything else classifies from the transport status alone.
    ///
    /// # Errors
    ///
    /// Returns the classified failure.
    pub async fn download(&self, path: &str) -> Result<Vec<u8>, GatewayError> {
        let descriptor = RequestDescriptor::new(Verb::Get, path);
        let url = self.resolve_url(&descriptor);
        let Some(token) = self.store.credential() else {
            return Err(self.report(GatewayError::Unauthenticated));
        };

        let request = WireRequest {
            verb: Verb::Get,
            url,
            bearer: Some(token),
            body: None,
        };
        let response = match self.transport.execute(request).await {
            Ok(response) => response,
            Err(err) => {
                return Err(self.report(GatewayError::Network {
                    reason: err.to_string(),
                }));
            }
        };

        if !response.is_transport_success() {
            let err = GatewayError::classify(response.status, None, None);
            return Err(self.report(err));
        }

        Ok(response.body)
    }

    /// Signs in against the primary host.
    ///
    /// Issued anonymously. On application success with an access credential
    /// in the payload, the credential, logged-in flag, and username are
    /// persisted before this method returns, so any later profile fetch
    /// observes them. A success payload without a credential fails with the
    /// server message or a fixed phrase, and writes nothing.
    ///
    /// # Errors
    ///
    /// Returns the classified failure; no session fields are written on any
    /// error path.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginSession, GatewayError> {
        let descriptor = RequestDescriptor::new(Verb::Post, "/login")
            .with_json(json!({ "username": username, "password": password }))
            .anonymous();
        let envelope = self.send(descriptor).await?;

        // An absent or unexpected payload is the same contract violation as
        // a missing credential field.
        let data: Option<LoginData> = match envelope.data_as() {
            Ok(data) => data,
            Err(err) => return Err(self.report(err)),
        };
        let Some(token) = data.and_then(|data| data.access_token) else {
            let err = GatewayError::Unknown {
                code: envelope.code,
                message: Some(
                    envelope
                        .message
                        .unwrap_or_else(|| "login failed".to_string()),
                ),
            };
            return Err(self.report(err));
        };

        if let Err(err) = self.store.set_session(&token, username) {
            warn!(error = %err, "failed to persist session state");
        }
        info!(username, "login succeeded");

        Ok(LoginSession {
            username: username.to_string(),
        })
    }

    /// Signs out locally: clears the persisted session and emits
    /// [`AccessEvent::LoggedOut`]. No network call is made.
    pub fn logout(&self) {
        if let Err(err) = self.store.clear_session() {
            warn!(error = %err, "failed to clear session state");
        }
        self.observer.on_event(AccessEvent::LoggedOut);
    }

    /// Applies the side effects for a classified failure and returns it.
    ///
    /// Exactly one event is emitted per failed call, and a rejected session
    /// is cleared before the event fires.
    fn report(&self, err: GatewayError) -> GatewayError {
        let message = err.to_string();
        match &err {
            GatewayError::Unauthenticated => {
                self.observer.on_event(AccessEvent::LoginRequired { message });
            }
            GatewayError::Unauthorized { .. } => {
                if let Err(store_err) = self.store.clear_session() {
                    warn!(error = %store_err, "failed to clear rejected session");
                }
                self.observer
                    .on_event(AccessEvent::SessionInvalidated { message });
            }
            GatewayError::Forbidden { .. } => {
                self.observer
                    .on_event(AccessEvent::PermissionDenied { message });
            }
            GatewayError::Network { .. } => {
                self.observer
                    .on_event(AccessEvent::NetworkFailure { message });
            }
            GatewayError::NotFound { .. }
            | GatewayError::BadRequest { .. }
            | GatewayError::ServerError { .. }
            | GatewayError::Unknown { .. } => {
                self.observer.on_event(AccessEvent::RequestFailed { message });
            }
        }
        err
    }

    fn resolve_url(&self, descriptor: &RequestDescriptor) -> String {
        // Paths that already carry a scheme are used verbatim.
        if descriptor.path.starts_with("http") {
            return descriptor.path.clone();
        }
        let base = match descriptor.target_host {
            TargetHost::Primary => &self.config.api_base_url,
            TargetHost::Store => &self.config.store_base_url,
        };
        format!("{base}{}", descriptor.path)
    }
}
