//! One page of resources plus pagination metadata.

use serde::{Deserialize, Serialize};

/// A page returned by a list endpoint.
///
/// `has_next` and `has_previous` are always derived from `current_page` and
/// `total_pages`; use [`PageResult::from_parts`] or [`PageResult::normalized`]
/// rather than trusting flags reported by a server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub current_page: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> PageResult<T> {
    pub fn from_parts(content: Vec<T>, total_elements: u64, total_pages: u32, current_page: u32) -> Self {
        Self {
            content,
            total_elements,
            total_pages,
            current_page,
            has_next: current_page.saturating_add(1) < total_pages,
            has_previous: current_page > 0,
        }
    }

    /// Build a page when only the element count and page size are known.
    pub fn from_total(content: Vec<T>, total_elements: u64, page_size: u32, current_page: u32) -> Self {
        let total_pages = total_pages_for(total_elements, page_size);
        Self::from_parts(content, total_elements, total_pages, current_page)
    }

    /// An empty first page.
    pub fn empty() -> Self {
        Self::from_parts(Vec::new(), 0, 0, 0)
    }

    /// Re-derive the navigation flags from `current_page` / `total_pages`.
    pub fn normalized(self) -> Self {
        Self::from_parts(
            self.content,
            self.total_elements,
            self.total_pages,
            self.current_page,
        )
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Number of pages needed for `total_elements` rows at `page_size` per page.
pub fn total_pages_for(total_elements: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let pages = total_elements.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}
