//! Access events emitted by the gateway.
//!
//! The gateway classifies each failure and emits exactly one event for it,
//! then rethrows the error. Navigation and notification policy belong to the
//! observer, which keeps the dependency pointing from UI policy toward data
//! access rather than the reverse.

use tracing::info;

/// A user-visible consequence of a gateway outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessEvent {
    /// An authenticated call was attempted with no stored credential; the
    /// user must sign in.
    LoginRequired { message: String },
    /// The backend rejected the session; it has been cleared locally and the
    /// user should be sent to the login view (after the notification has had
    /// a moment to be seen).
    SessionInvalidated { message: String },
    /// The backend denied a specific permission; the session stays valid.
    PermissionDenied { message: String },
    /// The transport could not reach the backend.
    NetworkFailure { message: String },
    /// Any other classified failure.
    RequestFailed { message: String },
    /// The user signed out locally.
    LoggedOut,
}

/// Observes gateway access events.
///
/// Implementations decide how events surface: a notification, a redirect, or
/// nothing at all. Observers must not block.
pub trait AccessObserver: Send + Sync {
    /// Called once per emitted event.
    fn on_event(&self, event: AccessEvent);
}

/// Observer that records events in the log and nothing else.
#[derive(Debug, Default)]
pub struct LogObserver;

impl AccessObserver for LogObserver {
    fn on_event(&self, event: AccessEvent) {
        info!(?event, "access event");
    }
}
