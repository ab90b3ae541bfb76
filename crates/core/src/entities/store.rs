//! Retail stores.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::entities::Resource;
use crate::types::DbId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StorePayload {
    #[validate(length(min = 1, max = 20, message = "Store code is required"))]
    pub code: String,
    #[validate(length(min = 1, max = 100, message = "Store name is required"))]
    pub name: String,
    #[validate(length(max = 255))]
    pub address: Option<String>,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
}

impl Resource for Store {
    type Payload = StorePayload;

    const KIND: &'static str = "store";
    const PATH: &'static str = "stores";
    const DEFAULT_SORT: &'static str = "name";

    fn id(&self) -> DbId {
        self.id
    }

    fn to_payload(&self) -> StorePayload {
        StorePayload {
            code: self.code.clone(),
            name: self.name.clone(),
            address: self.address.clone(),
            phone: self.phone.clone(),
        }
    }
}
