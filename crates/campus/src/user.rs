//! The signed-in user's profile.

use std::sync::{Mutex, MutexGuard, PoisonError};

use campus_client::{ApiClient, RequestOptions};
use campus_protocol::Envelope;
use campus_transport::Transport;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::Role;

/// Notice shown when `/me` answers without a usable profile.
pub const USER_FETCH_FAILED_NOTICE: &str = "Failed to fetch user information";

/// Path of the "who am I" endpoint.
pub const ME_PATH: &str = "/me";

/// Profile of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub role_id: u64,
    /// Raw role name from the backend; see [`UserProfile::role`].
    pub role_name: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl UserProfile {
    /// The parsed role, `None` for a role name this client does not know.
    pub fn role(&self) -> Option<Role> {
        self.role_name.parse().ok()
    }
}

// ---------------------------------------------------------------------------
// Wire shape of GET /me
// ---------------------------------------------------------------------------

/// `data` of the `/me` envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct MeResponse {
    pub info: MeInfo,
    pub role: MeRole,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeInfo {
    pub id: u64,
    pub name: String,
    pub user_name: String,
    pub email: String,
    pub role_id: u64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeRole {
    pub id: u64,
    pub name: String,
}

impl From<MeResponse> for UserProfile {
    fn from(me: MeResponse) -> Self {
        Self {
            id: me.info.id,
            name: me.info.name,
            username: me.info.user_name,
            email: me.info.email,
            role_id: me.info.role_id,
            role_name: me.role.name,
            created_at: me.info.created_at,
            updated_at: me.info.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// UserStore
// ---------------------------------------------------------------------------

/// Holds the profile of whoever is signed in.
pub struct UserStore<T: Transport> {
    api: ApiClient<T>,
    profile: Mutex<Option<UserProfile>>,
}

impl<T: Transport> UserStore<T> {
    pub fn new(api: ApiClient<T>) -> Self {
        Self {
            api,
            profile: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<UserProfile>> {
        self.profile.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Loads the profile from `/me`.
    ///
    /// An unsuccessful envelope shows a notice; a failed request is only
    /// logged (the API client has already notified). Either way the
    /// current profile is kept and `None` is returned.
    pub async fn fetch(&self) -> Option<UserProfile> {
        let envelope = match self
            .api
            .get::<Envelope<MeResponse>>(ME_PATH, RequestOptions::new())
            .await
        {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = %e, "fetching user profile failed");
                return None;
            }
        };

        match envelope.into_success() {
            Some(me) => {
                let profile = UserProfile::from(me);
                info!(user_id = profile.id, role = %profile.role_name, "user profile loaded");
                self.set(profile.clone());
                Some(profile)
            }
            None => {
                self.api.notifier().error(USER_FETCH_FAILED_NOTICE);
                None
            }
        }
    }

    pub fn set(&self, profile: UserProfile) {
        *self.lock() = Some(profile);
    }

    pub fn clear(&self) {
        *self.lock() = None;
    }

    pub fn profile(&self) -> Option<UserProfile> {
        self.lock().clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.lock().is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.lock().as_ref().and_then(UserProfile::role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_me_response_maps_user_name() {
        let me: MeResponse = serde_json::from_value(json!({
            "info": {
                "id": 7,
                "name": "Lan Tran",
                "user_name": "lantran",
                "email": "lan@example.edu",
                "role_id": 3,
                "created_at": "2024-09-01T00:00:00Z",
                "updated_at": null
            },
            "role": {"id": 3, "name": "STUDENT", "active": "1"}
        }))
        .unwrap();

        let profile = UserProfile::from(me);
        assert_eq!(profile.username, "lantran");
        assert_eq!(profile.role(), Some(Role::Student));
        assert_eq!(profile.updated_at, None);
    }

    #[test]
    fn test_unknown_role_name_has_no_role() {
        let profile = UserProfile {
            id: 1,
            name: "x".into(),
            username: "x".into(),
            email: "x@example.edu".into(),
            role_id: 9,
            role_name: "GUEST".into(),
            created_at: None,
            updated_at: None,
        };
        assert_eq!(profile.role(), None);
    }
}
