//! Response envelopes accepted from list endpoints.
//!
//! Older endpoints answer with a Spring-style page (`content`,
//! `totalElements`, `totalPages`, `number`); newer ones with a compact
//! `items`/`total`/`page`/`size` body, sometimes wrapped in `{ "data": ... }`.
//! Both normalise to [`PageResult`] with the navigation flags re-derived.

use backoffice_core::page::PageResult;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum PageEnvelope<T> {
    Spring(SpringPage<T>),
    Compact(CompactPage<T>),
    Wrapped { data: Box<PageEnvelope<T>> },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SpringPage<T> {
    content: Vec<T>,
    total_elements: u64,
    total_pages: u32,
    #[serde(alias = "number", default)]
    current_page: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompactPage<T> {
    items: Vec<T>,
    total: u64,
    page: u32,
    size: u32,
}

impl<T> PageEnvelope<T> {
    pub(crate) fn into_page(self) -> PageResult<T> {
        match self {
            Self::Spring(p) => {
                PageResult::from_parts(p.content, p.total_elements, p.total_pages, p.current_page)
            }
            Self::Compact(p) => PageResult::from_total(p.items, p.total, p.size, p.page),
            Self::Wrapped { data } => data.into_page(),
        }
    }
}
