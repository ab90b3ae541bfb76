//! Remote API seams consumed by the controllers.
//!
//! The HTTP implementations live in `backoffice-client`; tests supply
//! in-memory fakes. Every method is a suspension point.

use async_trait::async_trait;

use crate::entities::{Resource, ToggleAction};
use crate::error::RemoteError;
use crate::page::PageResult;
use crate::query::QueryState;
use crate::report::{ReportRequest, ReportResponse};
use crate::types::DbId;

/// List / create / update / delete for one entity.
#[async_trait]
pub trait ResourceApi: Send + Sync {
    type Resource: Resource;

    async fn list(&self, query: &QueryState) -> Result<PageResult<Self::Resource>, RemoteError>;

    async fn create(
        &self,
        payload: &<Self::Resource as Resource>::Payload,
    ) -> Result<Self::Resource, RemoteError>;

    async fn update(
        &self,
        id: DbId,
        payload: &<Self::Resource as Resource>::Payload,
    ) -> Result<Self::Resource, RemoteError>;

    async fn delete(&self, id: DbId) -> Result<(), RemoteError>;
}

/// Boolean status flips (activate/deactivate, lock/unlock) on one resource.
#[async_trait]
pub trait ToggleApi: Send + Sync {
    async fn toggle(&self, id: DbId, action: ToggleAction) -> Result<(), RemoteError>;
}

/// Sales report / chart series.
#[async_trait]
pub trait ReportApi: Send + Sync {
    async fn fetch_report(&self, request: &ReportRequest) -> Result<ReportResponse, RemoteError>;
}
