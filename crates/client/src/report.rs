//! REST client for the sales report endpoint.
//!
//! `GET /reports/sales/{daily|monthly|yearly}?start=&end=[&storeId=]`

use async_trait::async_trait;
use backoffice_core::api::ReportApi;
use backoffice_core::error::RemoteError;
use backoffice_core::report::{ReportRequest, ReportResponse};

use crate::http::ApiClient;

#[derive(Debug, Clone)]
pub struct HttpReportApi {
    client: ApiClient,
}

impl HttpReportApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReportApi for HttpReportApi {
    async fn fetch_report(&self, request: &ReportRequest) -> Result<ReportResponse, RemoteError> {
        let path = format!("reports/sales/{}", request.granularity().report_segment());
        tracing::debug!(range = %request.range, scope = ?request.scope, "Fetching sales report");
        self.client
            .get_json(&path, &request.to_query_pairs())
            .await
    }
}
