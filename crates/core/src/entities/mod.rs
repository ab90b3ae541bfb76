//! Entities administered through the back-office screens.
//!
//! Each entity implements [`Resource`], which is all the generic list
//! controller and toggle coordinator need to know about it.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::DbId;

pub mod event_origin;
pub mod operation;
pub mod role;
pub mod sales_target;
pub mod store;
pub mod user;

pub use event_origin::{EventOrigin, EventOriginPayload};
pub use operation::{Operation, OperationPayload};
pub use role::{Role, RolePayload};
pub use sales_target::{SalesTargetConfig, SalesTargetConfigPayload};
pub use store::{Store, StorePayload};
pub use user::{User, UserPayload};

// ---------------------------------------------------------------------------
// Toggle actions
// ---------------------------------------------------------------------------

/// A boolean-status flip on a single resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToggleAction {
    ToggleActive,
    ToggleLock,
}

impl ToggleAction {
    /// Path segment appended to `/{PATH}/{id}/` by the toggle endpoint.
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::ToggleActive => "toggle-active",
            Self::ToggleLock => "toggle-lock",
        }
    }
}

impl fmt::Display for ToggleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl FromStr for ToggleAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" | "toggle-active" => Ok(Self::ToggleActive),
            "lock" | "toggle-lock" => Ok(Self::ToggleLock),
            other => Err(CoreError::Validation(format!("unknown toggle action '{other}'"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Resource
// ---------------------------------------------------------------------------

/// An entity the admin screens list, edit and toggle.
pub trait Resource: Clone + fmt::Debug + Send + Sync + DeserializeOwned + Serialize + 'static {
    /// Create/update form body.
    type Payload: Clone + Default + fmt::Debug + Send + Sync + Serialize + Validate + 'static;

    /// Singular name used in logs, e.g. `"user"`.
    const KIND: &'static str;

    /// Collection path relative to the API base, e.g. `"users"`.
    const PATH: &'static str;

    /// Sort column the screen starts with.
    const DEFAULT_SORT: &'static str = "id";

    fn id(&self) -> DbId;

    /// System-protected rows that must never be toggled.
    fn is_protected(&self) -> bool {
        false
    }

    /// Status flips the backend supports for this entity.
    fn supported_toggles() -> &'static [ToggleAction] {
        &[ToggleAction::ToggleActive]
    }

    /// Snapshot of the resource as an edit form.
    fn to_payload(&self) -> Self::Payload;
}
