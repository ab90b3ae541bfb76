//! Generic paginated-resource controller.
//!
//! [`ResourceListController`] owns a screen's [`QueryState`], the last page
//! fetched for it and the create/edit modal. Every mutator that changes the
//! query reloads the list. Remote failures never escape as errors from the
//! fetch path: they land in [`ListSnapshot::error`].
//!
//! Overlapping loads are resolved by request sequence: each `load()` takes a
//! new sequence number and only the response for the most recently issued
//! request is applied. Responses to superseded requests are dropped.

use std::sync::Arc;

use async_trait::async_trait;
use backoffice_core::api::ResourceApi;
use backoffice_core::entities::Resource;
use backoffice_core::error::CoreError;
use backoffice_core::page::PageResult;
use backoffice_core::query::{Filters, QueryState, DEFAULT_PAGE_SIZE};
use backoffice_core::types::DbId;
use tokio::sync::RwLock;
use validator::Validate;

use crate::modal::ModalState;

type PayloadOf<A> = <<A as ResourceApi>::Resource as Resource>::Payload;

/// Something that can re-fetch its data, e.g. the list a toggle belongs to.
#[async_trait]
pub trait Reload: Send + Sync {
    async fn reload(&self);
}

/// Point-in-time copy of a list controller's state for rendering.
#[derive(Debug, Clone)]
pub struct ListSnapshot<R: Resource> {
    pub query: QueryState,
    pub page: PageResult<R>,
    pub is_loading: bool,
    /// Message from the last failed fetch, delete or toggle refresh.
    pub error: Option<String>,
    pub modal: ModalState<R::Payload>,
    pub is_submitting: bool,
    /// Inline message for the open form (validation or submit failure).
    pub form_error: Option<String>,
}

struct ListState<R: Resource> {
    query: QueryState,
    page: PageResult<R>,
    is_loading: bool,
    error: Option<String>,
    /// Sequence number of the most recently issued fetch.
    latest_request: u64,
    modal: ModalState<R::Payload>,
    /// Bumped on every open/close so late submit results can be recognised.
    modal_session: u64,
    is_submitting: bool,
    form_error: Option<String>,
}

impl<R: Resource> ListState<R> {
    fn snapshot(&self) -> ListSnapshot<R> {
        ListSnapshot {
            query: self.query.clone(),
            page: self.page.clone(),
            is_loading: self.is_loading,
            error: self.error.clone(),
            modal: self.modal.clone(),
            is_submitting: self.is_submitting,
            form_error: self.form_error.clone(),
        }
    }

    fn set_modal(&mut self, modal: ModalState<R::Payload>) {
        self.modal = modal;
        self.modal_session += 1;
        self.is_submitting = false;
        self.form_error = None;
    }
}

/// List controller for one screen, generic over the entity's remote API.
pub struct ResourceListController<A: ResourceApi> {
    api: Arc<A>,
    state: RwLock<ListState<A::Resource>>,
}

impl<A: ResourceApi> ResourceListController<A> {
    const KIND: &'static str = <A::Resource as Resource>::KIND;

    /// Controller starting on page 0 of the entity's default sort.
    pub fn new(api: Arc<A>) -> Self {
        Self::with_query(
            api,
            QueryState::new(<A::Resource as Resource>::DEFAULT_SORT, DEFAULT_PAGE_SIZE),
        )
    }

    pub fn with_query(api: Arc<A>, query: QueryState) -> Self {
        Self {
            api,
            state: RwLock::new(ListState {
                query,
                page: PageResult::empty(),
                is_loading: false,
                error: None,
                latest_request: 0,
                modal: ModalState::Closed,
                modal_session: 0,
                is_submitting: false,
                form_error: None,
            }),
        }
    }

    /// The remote API this controller talks to.
    pub fn api(&self) -> Arc<A> {
        Arc::clone(&self.api)
    }

    pub async fn snapshot(&self) -> ListSnapshot<A::Resource> {
        self.state.read().await.snapshot()
    }

    pub async fn query(&self) -> QueryState {
        self.state.read().await.query.clone()
    }

    // -----------------------------------------------------------------------
    // Query mutators
    // -----------------------------------------------------------------------

    /// Replace filters wholesale, rewind to page 0 and reload.
    pub async fn set_filters(&self, filters: Filters) {
        self.update_query(|q| q.with_filters(filters)).await;
    }

    pub async fn clear_filters(&self) {
        self.set_filters(Filters::new()).await;
    }

    /// Jump to `page` and reload. Other query fields are untouched.
    pub async fn change_page(&self, page: u32) {
        self.update_query(|q| q.with_page(page)).await;
    }

    /// Change the page size, rewind to page 0 and reload.
    pub async fn change_page_size(&self, page_size: u32) {
        self.update_query(|q| q.with_page_size(page_size)).await;
    }

    /// Column-header click: flip direction on the current field, otherwise
    /// sort ascending by `field`. Rewinds to page 0 and reloads.
    pub async fn handle_sort(&self, field: &str) {
        self.update_query(|q| q.with_sort(field)).await;
    }

    async fn update_query(&self, f: impl FnOnce(&QueryState) -> QueryState) {
        {
            let mut state = self.state.write().await;
            let next = f(&state.query);
            state.query = next;
        }
        self.load().await;
    }

    // -----------------------------------------------------------------------
    // Fetching
    // -----------------------------------------------------------------------

    /// Fetch the page for the current query.
    ///
    /// If another `load()` is issued before this one resolves, this one's
    /// response is discarded.
    pub async fn load(&self) {
        let (request_seq, query) = {
            let mut state = self.state.write().await;
            state.latest_request += 1;
            state.is_loading = true;
            state.error = None;
            (state.latest_request, state.query.clone())
        };

        let result = self.api.list(&query).await;

        let mut state = self.state.write().await;
        if request_seq != state.latest_request {
            tracing::debug!(
                resource = Self::KIND,
                request_seq,
                latest = state.latest_request,
                "Discarding stale list response",
            );
            return;
        }

        state.is_loading = false;
        match result {
            Ok(page) => {
                tracing::debug!(
                    resource = Self::KIND,
                    request_seq,
                    page = page.current_page,
                    total = page.total_elements,
                    "List loaded",
                );
                state.page = page;
            }
            Err(e) => {
                tracing::warn!(
                    resource = Self::KIND,
                    request_seq,
                    error = %e,
                    "List fetch failed",
                );
                // Previous content stays on screen alongside the message.
                state.error = Some(e.user_message());
            }
        }
    }

    // -----------------------------------------------------------------------
    // Modal lifecycle
    // -----------------------------------------------------------------------

    pub async fn open_create_modal(&self) {
        self.state
            .write()
            .await
            .set_modal(ModalState::Create {
                form: <PayloadOf<A> as Default>::default(),
            });
    }

    /// Open the edit form pre-filled with a snapshot of `resource`.
    pub async fn open_edit_modal(&self, resource: &A::Resource) {
        self.state.write().await.set_modal(ModalState::Edit {
            id: resource.id(),
            form: resource.to_payload(),
        });
    }

    /// Close the form. An in-flight submit is not cancelled; its result
    /// simply no longer affects the modal.
    pub async fn close_modal(&self) {
        self.state.write().await.set_modal(ModalState::Closed);
    }

    /// Validate and send the open form as a create or update.
    ///
    /// Validation failures never reach the network. On success the modal
    /// closes (if it is still the same modal) and the list reloads.
    pub async fn submit(&self, payload: PayloadOf<A>) -> Result<A::Resource, CoreError> {
        let (session, editing) = {
            let mut state = self.state.write().await;
            let editing = match &state.modal {
                ModalState::Closed => {
                    return Err(CoreError::Validation("No form is open".to_string()));
                }
                ModalState::Create { .. } => None,
                ModalState::Edit { id, .. } => Some(*id),
            };
            state.modal.replace_form(payload.clone());
            if let Err(errors) = payload.validate() {
                let err = CoreError::from(errors);
                state.form_error = Some(err.user_message());
                return Err(err);
            }
            state.is_submitting = true;
            state.form_error = None;
            (state.modal_session, editing)
        };

        let result = match editing {
            None => self.api.create(&payload).await,
            Some(id) => self.api.update(id, &payload).await,
        };

        {
            let mut state = self.state.write().await;
            if state.modal_session == session {
                match &result {
                    Ok(_) => state.set_modal(ModalState::Closed),
                    Err(e) => {
                        state.is_submitting = false;
                        state.form_error = Some(e.user_message());
                    }
                }
            } else {
                tracing::debug!(
                    resource = Self::KIND,
                    "Submit resolved after its modal closed; leaving modal state alone",
                );
            }
        }

        match result {
            Ok(saved) => {
                tracing::info!(
                    resource = Self::KIND,
                    resource_id = saved.id(),
                    created = editing.is_none(),
                    "Resource saved",
                );
                self.load().await;
                Ok(saved)
            }
            Err(e) => {
                tracing::warn!(
                    resource = Self::KIND,
                    error = %e,
                    "Resource save failed",
                );
                Err(e.into())
            }
        }
    }

    /// Delete a resource and reload the list.
    pub async fn delete(&self, id: DbId) -> Result<(), CoreError> {
        match self.api.delete(id).await {
            Ok(()) => {
                tracing::info!(
                    resource = Self::KIND,
                    resource_id = id,
                    "Resource deleted",
                );
                self.load().await;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    resource = Self::KIND,
                    resource_id = id,
                    error = %e,
                    "Resource delete failed",
                );
                self.state.write().await.error = Some(e.user_message());
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl<A: ResourceApi> Reload for ResourceListController<A> {
    async fn reload(&self) {
        self.load().await;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
