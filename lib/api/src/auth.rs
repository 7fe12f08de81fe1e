//! Authentication and account resource API.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use punchcard_access::{AccessContext, AccessError, ProfilePayload, ProfileSource};
use punchcard_gateway::{Gateway, GatewayError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

/// Result of a login attempt.
///
/// The profile load after login is best-effort: its failure never fails the
/// login, it is downgraded to a log entry and surfaced here so callers and
/// tests can observe it deterministically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    /// The username the session was established for.
    pub username: String,
    /// Whether the profile was loaded as part of the login.
    pub profile_loaded: bool,
    /// The profile-load failure, when one occurred.
    pub profile_error: Option<String>,
}

/// Fields of the signed-in user's profile that can be updated.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    /// New display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nick_name: Option<String>,
    /// New avatar reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl ProfileUpdate {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_nick_name(mut self, nick_name: impl Into<String>) -> Self {
        self.nick_name = Some(nick_name.into());
        self
    }

    /// Sets the avatar reference.
    #[must_use]
    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }
}

/// The `/user/avatar` response payload.
#[derive(Debug, Deserialize)]
struct AvatarData {
    avatar: String,
}

/// Authentication, profile, and account operations.
pub struct AuthApi {
    gateway: Arc<Gateway>,
}

impl AuthApi {
    /// Creates the API over a gateway.
    #[must_use]
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// Signs in and loads the user's profile into `access`.
    ///
    /// Credential persistence happens before the profile fetch, so the fetch
    /// goes out authenticated. The profile load is best-effort; see
    /// [`LoginOutcome`].
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the login call itself.
    pub async fn login(
        &self,
        access: &AccessContext,
        username: &str,
        password: &str,
    ) -> Result<LoginOutcome, GatewayError> {
        let session = self.gateway.login(username, password).await?;

        let (profile_loaded, profile_error) = match access.load_profile(self).await {
            Ok(()) => (access.profile().is_some(), None),
            Err(err) => {
                warn!(error = %err, "profile load after login failed");
                (false, Some(err.to_string()))
            }
        };

        Ok(LoginOutcome {
            username: session.username,
            profile_loaded,
            profile_error,
        })
    }

    /// Signs out: clears the cached authorization data and the persisted
    /// session. No network call is made.
    pub fn logout(&self, access: &AccessContext) {
        access.clear();
        self.gateway.logout();
    }

    /// Fetches the signed-in user's profile, roles, permissions, and menus.
    ///
    /// # Errors
    ///
    /// Returns the classified failure.
    pub async fn get_user_info(&self) -> Result<ProfilePayload, GatewayError> {
        self.gateway.get("/user/info").await?.data_as()
    }

    /// Updates the signed-in user's profile fields.
    ///
    /// # Errors
    ///
    /// Returns the classified failure.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<(), GatewayError> {
        let body = serde_json::to_value(update).map_err(|err| GatewayError::Unknown {
            code: 0,
            message: Some(format!("unencodable profile update: {err}")),
        })?;
        self.gateway.put("/user/profile", body).await?;
        Ok(())
    }

    /// Changes the signed-in user's password.
    ///
    /// # Errors
    ///
    /// Returns the classified failure.
    pub async fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), GatewayError> {
        self.gateway
            .put(
                "/user/password",
                json!({ "oldPassword": old_password, "newPassword": new_password }),
            )
            .await?;
        Ok(())
    }

    /// Uploads a new avatar image and returns its reference.
    ///
    /// The image is sent base64-encoded in a JSON body.
    ///
    /// # Errors
    ///
    /// Returns the classified failure.
    pub async fn upload_avatar(
        &self,
        file_name: &str,
        image: &[u8],
    ) -> Result<String, GatewayError> {
        let envelope = self
            .gateway
            .post(
                "/user/avatar",
                json!({ "fileName": file_name, "content": BASE64.encode(image) }),
            )
            .await?;
        let data: AvatarData = envelope.data_as()?;
        Ok(data.avatar)
    }
}

#[async_trait]
impl ProfileSource for AuthApi {
    async fn fetch_profile(&self) -> Result<ProfilePayload, AccessError> {
        self.get_user_info()
            .await
            .map_err(|err| AccessError::ProfileFetch {
                reason: err.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{Fixture, json_response};
    use punchcard_gateway::AccessEvent;

    #[tokio::test]
    async fn login_loads_profile_best_effort() {
        let f = Fixture::new(&[
            json_response(200, r#"{"code": 200, "data": {"AccessToken": "tok1"}}"#),
            json_response(
                200,
                r#"{"code": 200, "data": {
                    "userId": "u1", "username": "alice",
                    "roles": [{"roleKey": "admin"}],
                    "permissions": ["tasks.edit"]
                }}"#,
            ),
        ]);
        let auth = AuthApi::new(f.gateway.clone());

        let outcome = auth
            .login(&f.access, "alice", "x")
            .await
            .expect("login");

        assert_eq!(outcome.username, "alice");
        assert!(outcome.profile_loaded);
        assert!(outcome.profile_error.is_none());
        assert!(f.access.has_permission("anything.at.all"));

        // The profile fetch went out with the freshly persisted credential.
        let request = f.transport.last_request();
        assert_eq!(request.url, "https://api.example.com/api/user/info");
        assert_eq!(request.bearer.as_deref(), Some("tok1"));
    }

    #[tokio::test]
    async fn failed_profile_load_does_not_fail_login() {
        let f = Fixture::new(&[
            json_response(200, r#"{"code": 200, "data": {"AccessToken": "tok1"}}"#),
            json_response(500, r#"{"code": 500, "message": "profile backend down"}"#),
        ]);
        let auth = AuthApi::new(f.gateway.clone());

        let outcome = auth
            .login(&f.access, "alice", "x")
            .await
            .expect("login should still succeed");

        assert!(!outcome.profile_loaded);
        assert!(
            outcome
                .profile_error
                .as_deref()
                .is_some_and(|e| e.contains("profile backend down"))
        );
        assert_eq!(f.store.credential().as_deref(), Some("tok1"));
    }

    #[tokio::test]
    async fn rejected_login_performs_no_profile_fetch() {
        let f = Fixture::new(&[json_response(
            200,
            r#"{"code": 401, "message": "bad credentials"}"#,
        )]);
        let auth = AuthApi::new(f.gateway.clone());

        let err = auth
            .login(&f.access, "alice", "wrong")
            .await
            .expect_err("login should fail");

        assert_eq!(err.to_string(), "bad credentials");
        assert_eq!(f.transport.calls(), 1);
        assert!(f.access.profile().is_none());
    }

    #[tokio::test]
    async fn logout_clears_profile_and_session() {
        let f = Fixture::signed_in(&[]);
        let auth = AuthApi::new(f.gateway.clone());

        auth.logout(&f.access);

        assert!(f.store.credential().is_none());
        assert!(f.access.profile().is_none());
        assert!(matches!(
            f.observer.events().as_slice(),
            [AccessEvent::LoggedOut]
        ));
    }

    #[tokio::test]
    async fn change_password_hits_user_password() {
        let f = Fixture::signed_in(&[json_response(200, r#"{"code": 200}"#)]);
        let auth = AuthApi::new(f.gateway.clone());

        auth.change_password("old", "new").await.expect("change");

        assert_eq!(
            f.transport.last_request().url,
            "https://api.example.com/api/user/password"
        );
    }

    #[tokio::test]
    async fn upload_avatar_returns_reference() {
        let f = Fixture::signed_in(&[json_response(
            200,
            r#"{"code": 200, "data": {"avatar": "avatars/alice.png"}}"#,
        )]);
        let auth = AuthApi::new(f.gateway.clone());

        let avatar = auth
            .upload_avatar("alice.png", b"\x89PNG")
            .await
            .expect("upload");

        assert_eq!(avatar, "avatars/alice.png");
    }
}
