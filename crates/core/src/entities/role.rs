//! Roles and their permission sets.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::entities::Resource;
use crate::types::DbId;

/// Built-in role names seeded by the backend. These cannot be toggled.
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MANAGER: &str = "manager";

pub const SYSTEM_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_MANAGER];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub is_active: bool,
    /// Server-side flag for roles the platform depends on.
    #[serde(default)]
    pub system: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RolePayload {
    #[validate(length(min = 2, max = 50, message = "Role name must be 2-50 characters"))]
    pub name: String,
    #[validate(length(max = 255))]
    pub description: Option<String>,
    pub permissions: Vec<String>,
}

impl Resource for Role {
    type Payload = RolePayload;

    const KIND: &'static str = "role";
    const PATH: &'static str = "roles";
    const DEFAULT_SORT: &'static str = "name";

    fn id(&self) -> DbId {
        self.id
    }

    fn is_protected(&self) -> bool {
        self.system || SYSTEM_ROLES.contains(&self.name.to_ascii_lowercase().as_str())
    }

    fn to_payload(&self) -> RolePayload {
        RolePayload {
            name: self.name.clone(),
            description: self.description.clone(),
            permissions: self.permissions.clone(),
        }
    }
}
