//! REST client for one administered entity.
//!
//! | Operation | Request                                   |
//! |-----------|-------------------------------------------|
//! | list      | `GET    /{PATH}?page=&size=&sortBy=&sortDir=&<filters>` |
//! | create    | `POST   /{PATH}`                          |
//! | update    | `PUT    /{PATH}/{id}`                     |
//! | delete    | `DELETE /{PATH}/{id}`                     |
//! | toggle    | `PATCH  /{PATH}/{id}/{toggle-active,toggle-lock}` |

use std::marker::PhantomData;

use async_trait::async_trait;
use backoffice_core::api::{ResourceApi, ToggleApi};
use backoffice_core::entities::{Resource, ToggleAction};
use backoffice_core::error::RemoteError;
use backoffice_core::page::PageResult;
use backoffice_core::query::QueryState;
use backoffice_core::types::DbId;
use reqwest::Method;

use crate::http::ApiClient;
use crate::wire::PageEnvelope;

/// HTTP implementation of [`ResourceApi`] and [`ToggleApi`] for `R`.
pub struct HttpResourceApi<R> {
    client: ApiClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> HttpResourceApi<R> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }

    fn item_path(id: DbId) -> String {
        format!("{}/{id}", R::PATH)
    }
}

impl<R> Clone for HttpResourceApi<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _resource: PhantomData,
        }
    }
}

#[async_trait]
impl<R: Resource> ResourceApi for HttpResourceApi<R> {
    type Resource = R;

    async fn list(&self, query: &QueryState) -> Result<PageResult<R>, RemoteError> {
        tracing::debug!(
            resource = R::KIND,
            page = query.page(),
            size = query.page_size(),
            sort_by = query.sort_by(),
            sort_dir = %query.sort_dir(),
            "Listing resources",
        );
        let envelope: PageEnvelope<R> = self
            .client
            .get_json(R::PATH, &query.to_query_pairs())
            .await?;
        Ok(envelope.into_page())
    }

    async fn create(&self, payload: &R::Payload) -> Result<R, RemoteError> {
        self.client.send_json(Method::POST, R::PATH, payload).await
    }

    async fn update(&self, id: DbId, payload: &R::Payload) -> Result<R, RemoteError> {
        self.client
            .send_json(Method::PUT, &Self::item_path(id), payload)
            .await
    }

    async fn delete(&self, id: DbId) -> Result<(), RemoteError> {
        self.client
            .send_empty(Method::DELETE, &Self::item_path(id))
            .await
    }
}

#[async_trait]
impl<R: Resource> ToggleApi for HttpResourceApi<R> {
    async fn toggle(&self, id: DbId, action: ToggleAction) -> Result<(), RemoteError> {
        let path = format!("{}/{}", Self::item_path(id), action.path_segment());
        self.client.send_empty(Method::PATCH, &path).await
    }
}
