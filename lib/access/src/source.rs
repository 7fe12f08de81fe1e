//! Profile fetching seam.
//!
//! The access layer does not speak HTTP itself; it asks a [`ProfileSource`]
//! for the signed-in user's profile. The auth resource API implements this
//! trait over the request gateway, which keeps the dependency pointing from
//! the data-access layer toward this crate rather than the reverse.

use async_trait::async_trait;

use crate::error::AccessError;
use crate::profile::ProfilePayload;

/// Fetches the signed-in user's profile from the backend.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// Fetches the profile, role, permission, and menu grants.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::ProfileFetch`] when the backend call fails.
    async fn fetch_profile(&self) -> Result<ProfilePayload, AccessError>;
}
