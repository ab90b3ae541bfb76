//! Back-office user accounts.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::entities::{Resource, ToggleAction};
use crate::types::{DbId, Timestamp};

/// A user row as returned by the list endpoint (no credentials).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    /// Resolved role name (e.g. `"admin"`).
    pub role: String,
    pub role_id: DbId,
    pub store_id: Option<DbId>,
    pub is_active: bool,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default)]
    pub last_login_at: Option<Timestamp>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

/// Create/edit form for a user.
///
/// `password` is only sent on create; edits leave it `None`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,
    #[validate(email(message = "Email address is not valid"))]
    pub email: String,
    #[validate(length(max = 100))]
    pub full_name: Option<String>,
    pub role_id: DbId,
    pub store_id: Option<DbId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,
}

impl Resource for User {
    type Payload = UserPayload;

    const KIND: &'static str = "user";
    const PATH: &'static str = "users";
    const DEFAULT_SORT: &'static str = "username";

    fn id(&self) -> DbId {
        self.id
    }

    fn supported_toggles() -> &'static [ToggleAction] {
        &[ToggleAction::ToggleActive, ToggleAction::ToggleLock]
    }

    fn to_payload(&self) -> UserPayload {
        UserPayload {
            username: self.username.clone(),
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            role_id: self.role_id,
            store_id: self.store_id,
            password: None,
        }
    }
}
