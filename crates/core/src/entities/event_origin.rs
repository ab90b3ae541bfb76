//! Event origins: the channels a sale or operation can be attributed to.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::entities::Resource;
use crate::types::DbId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventOrigin {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EventOriginPayload {
    #[validate(length(min = 1, max = 20))]
    pub code: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

impl Resource for EventOrigin {
    type Payload = EventOriginPayload;

    const KIND: &'static str = "event_origin";
    const PATH: &'static str = "event-origins";
    const DEFAULT_SORT: &'static str = "name";

    fn id(&self) -> DbId {
        self.id
    }

    fn to_payload(&self) -> EventOriginPayload {
        EventOriginPayload {
            code: self.code.clone(),
            name: self.name.clone(),
        }
    }
}
