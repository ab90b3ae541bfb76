//! Catalogue operations (sale, refund, exchange, ...).

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::entities::Resource;
use crate::types::DbId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OperationPayload {
    #[validate(length(min = 1, max = 20))]
    pub code: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 255))]
    pub description: Option<String>,
}

impl Resource for Operation {
    type Payload = OperationPayload;

    const KIND: &'static str = "operation";
    const PATH: &'static str = "operations";
    const DEFAULT_SORT: &'static str = "code";

    fn id(&self) -> DbId {
        self.id
    }

    fn to_payload(&self) -> OperationPayload {
        OperationPayload {
            code: self.code.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}
