//! Sales report DTOs.
//!
//! Summary metrics (best/worst period, active scopes) are computed by the
//! server and passed through untouched.

use serde::{Deserialize, Serialize};

use crate::period::{Granularity, PeriodRange};
use crate::types::DbId;

/// Which stores a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "storeId")]
pub enum ReportScope {
    #[default]
    All,
    Store(DbId),
}

impl ReportScope {
    pub fn store_id(self) -> Option<DbId> {
        match self {
            Self::All => None,
            Self::Store(id) => Some(id),
        }
    }
}

/// A report request: one range at one granularity, optionally scoped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportRequest {
    pub range: PeriodRange,
    pub scope: ReportScope,
}

impl ReportRequest {
    pub fn new(range: PeriodRange, scope: ReportScope) -> Self {
        Self { range, scope }
    }

    pub fn granularity(&self) -> Granularity {
        self.range.granularity()
    }

    /// Query parameters for the report endpoint.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("start".to_string(), self.range.start().to_string()),
            ("end".to_string(), self.range.end().to_string()),
        ];
        if let Some(id) = self.scope.store_id() {
            pairs.push(("storeId".to_string(), id.to_string()));
        }
        pairs
    }
}

/// One bucket of the time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPoint {
    /// Period label in the report's granularity, e.g. `"2024-03"`.
    pub period: String,
    pub total_sales: f64,
    #[serde(default)]
    pub order_count: u64,
    #[serde(default)]
    pub target_amount: Option<f64>,
}

/// Server-computed aggregates shown above the chart.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    #[serde(default)]
    pub total_sales: f64,
    #[serde(default)]
    pub best_period: Option<String>,
    #[serde(default)]
    pub worst_period: Option<String>,
    #[serde(default)]
    pub active_scopes: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    #[serde(default)]
    pub series: Vec<ReportPoint>,
    #[serde(default)]
    pub summary: ReportSummary,
}
