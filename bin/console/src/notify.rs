//! Renders access events as terminal notifications.
//!
//! The gateway emits one event per failed call; this observer owns the
//! notification and navigation-hint policy for the terminal.

use punchcard_gateway::{AccessEvent, AccessObserver};

/// Prints each event as a transient title + description notification on
/// stderr.
#[derive(Debug, Default)]
pub struct ConsoleObserver;

fn notify(title: &str, description: &str) {
    eprintln!("[{title}] {description}");
}

impl AccessObserver for ConsoleObserver {
    fn on_event(&self, event: AccessEvent) {
        match event {
            AccessEvent::LoginRequired { message } => {
                notify("Not signed in", &message);
                notify("Sign in", "run `punchcard login <username> <password>`");
            }
            AccessEvent::SessionInvalidated { message } => {
                notify("Session expired", &message);
                notify("Sign in", "your session was cleared; run `punchcard login` again");
            }
            AccessEvent::PermissionDenied { message } => {
                notify("Insufficient permission", &message);
            }
            AccessEvent::NetworkFailure { message } => {
                notify("Network error", &message);
            }
            AccessEvent::RequestFailed { message } => {
                notify("Request failed", &message);
            }
            AccessEvent::LoggedOut => {
                notify("Signed out", "local session cleared");
            }
        }
    }
}
