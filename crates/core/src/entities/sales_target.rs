//! Sales target configuration per store and period.
//!
//! A config without `store_id` applies to all stores; one without `month`
//! is a yearly target.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::entities::Resource;
use crate::types::DbId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesTargetConfig {
    pub id: DbId,
    pub store_id: Option<DbId>,
    pub store_name: Option<String>,
    pub year: i32,
    pub month: Option<u32>,
    pub target_amount: f64,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SalesTargetConfigPayload {
    pub store_id: Option<DbId>,
    #[validate(range(min = 2000, max = 2100, message = "Year is out of range"))]
    pub year: i32,
    #[validate(range(min = 1, max = 12, message = "Month must be 1-12"))]
    pub month: Option<u32>,
    #[validate(range(min = 0.0, message = "Target amount cannot be negative"))]
    pub target_amount: f64,
}

impl Resource for SalesTargetConfig {
    type Payload = SalesTargetConfigPayload;

    const KIND: &'static str = "sales_target_config";
    const PATH: &'static str = "sales-target-configs";
    const DEFAULT_SORT: &'static str = "year";

    fn id(&self) -> DbId {
        self.id
    }

    fn to_payload(&self) -> SalesTargetConfigPayload {
        SalesTargetConfigPayload {
            store_id: self.store_id,
            year: self.year,
            month: self.month,
            target_amount: self.target_amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> SalesTargetConfigPayload {
        SalesTargetConfigPayload {
            store_id: Some(3),
            year: 2026,
            month: Some(4),
            target_amount: 15_000.0,
        }
    }

    #[test]
    fn valid_monthly_target() {
        assert!(payload().validate().is_ok());
    }

    #[test]
    fn month_thirteen_is_rejected() {
        let p = SalesTargetConfigPayload {
            month: Some(13),
            ..payload()
        };
        assert!(p.validate().is_err());
    }

    #[test]
    fn negative_amount_is_rejected() {
        let p = SalesTargetConfigPayload {
            target_amount: -1.0,
            ..payload()
        };
        assert!(p.validate().is_err());
    }

    #[test]
    fn yearly_target_for_all_stores() {
        let p = SalesTargetConfigPayload {
            store_id: None,
            month: None,
            ..payload()
        };
        assert!(p.validate().is_ok());
    }
}
