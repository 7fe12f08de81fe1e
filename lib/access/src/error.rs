//! Error types for the access crate.

use std::fmt;

/// Errors from session storage and profile loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// Reading or writing the session state file failed.
    StoreIo { path: String, reason: String },
    /// The session state file could not be encoded or decoded.
    StoreSerialization { reason: String },
    /// Fetching the user profile from the backend failed.
    ProfileFetch { reason: String },
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StoreIo { path, reason } => {
                write!(f, "session store i/o failed for '{path}': {reason}")
            }
            Self::StoreSerialization { reason } => {
                write!(f, "session store serialization failed: {reason}")
            }
            Self::ProfileFetch { reason } => {
                write!(f, "profile fetch failed: {reason}")
            }
        }
    }
}

impl std::error::Error for AccessError {}
