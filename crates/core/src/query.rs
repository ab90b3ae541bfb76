//! Filter / sort / page parameters that drive a list fetch.
//!
//! [`QueryState`] is an immutable value: every transition returns a new
//! state. Changing filters, sort or page size always rewinds to page 0;
//! changing the page alone leaves everything else untouched.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Pagination defaults
// ---------------------------------------------------------------------------

/// Default number of rows per page on the admin screens.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page size a list request may ask for.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Sort column used when a screen does not pick one.
pub const DEFAULT_SORT_FIELD: &str = "id";

/// Clamp a user-provided page size to `1..=MAX_PAGE_SIZE`.
pub fn clamp_page_size(size: u32) -> u32 {
    size.clamp(1, MAX_PAGE_SIZE)
}

// ---------------------------------------------------------------------------
// Sort direction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    pub fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// A single filter value. An absent key means "no filter".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Flag(bool),
    Text(String),
}

impl FilterValue {
    /// Blank text filters carry no constraint.
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.trim().is_empty())
    }

    /// Wire representation used in the list request query string.
    pub fn to_param(&self) -> String {
        match self {
            Self::Flag(b) => b.to_string(),
            Self::Text(s) => s.trim().to_string(),
        }
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Entity-specific filters keyed by request parameter name.
///
/// A `BTreeMap` keeps keys unique and the request parameters in a stable order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Filters(BTreeMap<String, FilterValue>);

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter, builder style. Blank text values are dropped.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.set(key, Some(value.into()));
        self
    }

    /// Set or remove a filter. `None` and blank text both remove the key.
    pub fn set(&mut self, key: impl Into<String>, value: Option<FilterValue>) {
        let key = key.into();
        match value {
            Some(v) if !v.is_blank() => {
                self.0.insert(key, v);
            }
            _ => {
                self.0.remove(&key);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FilterValue)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<FilterValue>> FromIterator<(K, V)> for Filters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |filters, (k, v)| filters.with(k, v))
    }
}

// ---------------------------------------------------------------------------
// QueryState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryState {
    filters: Filters,
    sort_by: String,
    sort_dir: SortDir,
    page: u32,
    page_size: u32,
}

impl Default for QueryState {
    fn default() -> Self {
        Self::new(DEFAULT_SORT_FIELD, DEFAULT_PAGE_SIZE)
    }
}

impl QueryState {
    /// Unfiltered first page sorted ascending by `sort_by`.
    pub fn new(sort_by: impl Into<String>, page_size: u32) -> Self {
        Self {
            filters: Filters::new(),
            sort_by: sort_by.into(),
            sort_dir: SortDir::Asc,
            page: 0,
            page_size: clamp_page_size(page_size),
        }
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn sort_by(&self) -> &str {
        &self.sort_by
    }

    pub fn sort_dir(&self) -> SortDir {
        self.sort_dir
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Replace filters wholesale and rewind to page 0.
    pub fn with_filters(&self, filters: Filters) -> Self {
        Self {
            filters,
            page: 0,
            ..self.clone()
        }
    }

    /// Jump to `page`. No bound check: the server reports what exists.
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    /// Change the page size (clamped) and rewind to page 0.
    pub fn with_page_size(&self, page_size: u32) -> Self {
        Self {
            page_size: clamp_page_size(page_size),
            page: 0,
            ..self.clone()
        }
    }

    /// Column-header click: same field flips direction, a new field sorts
    /// ascending. Always rewinds to page 0.
    pub fn with_sort(&self, field: &str) -> Self {
        let sort_dir = if self.sort_by == field {
            self.sort_dir.flipped()
        } else {
            SortDir::Asc
        };
        Self {
            sort_by: field.to_string(),
            sort_dir,
            page: 0,
            ..self.clone()
        }
    }

    /// Explicit sort field and direction. Rewinds to page 0.
    pub fn with_sort_dir(&self, field: &str, sort_dir: SortDir) -> Self {
        Self {
            sort_by: field.to_string(),
            sort_dir,
            page: 0,
            ..self.clone()
        }
    }

    /// Parameters for the list endpoint: `page`, `size`, `sortBy`,
    /// `sortDir`, then filters in key order.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("size".to_string(), self.page_size.to_string()),
            ("sortBy".to_string(), self.sort_by.clone()),
            ("sortDir".to_string(), self.sort_dir.to_string()),
        ];
        pairs.extend(
            self.filters
                .iter()
                .map(|(k, v)| (k.clone(), v.to_param())),
        );
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> QueryState {
        QueryState::new("name", 10).with_page(3)
    }

    // -- page reset ----------------------------------------------------------

    #[test]
    fn filters_reset_page() {
        let q = base().with_filters(Filters::new().with("active", true));
        assert_eq!(q.page(), 0);
        assert_eq!(q.filters().get("active"), Some(&FilterValue::Flag(true)));
    }

    #[test]
    fn page_size_resets_page() {
        let q = base().with_page_size(25);
        assert_eq!(q.page(), 0);
        assert_eq!(q.page_size(), 25);
    }

    #[test]
    fn sort_resets_page() {
        assert_eq!(base().with_sort("email").page(), 0);
        assert_eq!(base().with_sort("name").page(), 0);
    }

    #[test]
    fn page_change_touches_nothing_else() {
        let before = QueryState::new("name", 20)
            .with_filters(Filters::new().with("role", "admin"))
            .with_sort("name")
            .with_sort("name");
        let after = before.with_page(4);

        assert_eq!(after.page(), 4);
        assert_eq!(after.filters(), before.filters());
        assert_eq!(after.sort_by(), before.sort_by());
        assert_eq!(after.sort_dir(), before.sort_dir());
        assert_eq!(after.page_size(), before.page_size());
    }

    // -- sorting -------------------------------------------------------------

    #[test]
    fn same_field_flips_direction() {
        let q = QueryState::new("id", 10).with_sort("name");
        assert_eq!(q.sort_dir(), SortDir::Asc);
        let q = q.with_sort("name");
        assert_eq!(q.sort_by(), "name");
        assert_eq!(q.sort_dir(), SortDir::Desc);
        let q = q.with_sort("name");
        assert_eq!(q.sort_dir(), SortDir::Asc);
    }

    #[test]
    fn new_field_sorts_ascending() {
        let q = QueryState::new("name", 10).with_sort("name");
        assert_eq!(q.sort_dir(), SortDir::Desc);
        let q = q.with_sort("email");
        assert_eq!(q.sort_by(), "email");
        assert_eq!(q.sort_dir(), SortDir::Asc);
    }

    // -- filters -------------------------------------------------------------

    #[test]
    fn blank_text_filter_is_absent() {
        let f = Filters::new().with("name", "   ").with("active", false);
        assert_eq!(f.len(), 1);
        assert!(f.get("name").is_none());
    }

    #[test]
    fn setting_none_removes_key() {
        let mut f = Filters::new().with("name", "bob");
        f.set("name", None);
        assert!(f.is_empty());
    }

    // -- page size -----------------------------------------------------------

    #[test]
    fn page_size_is_clamped() {
        assert_eq!(QueryState::new("id", 0).page_size(), 1);
        assert_eq!(QueryState::new("id", 500).page_size(), MAX_PAGE_SIZE);
    }

    // -- request parameters --------------------------------------------------

    #[test]
    fn query_pairs_carry_sort_and_filters() {
        let q = QueryState::new("name", 10)
            .with_filters(Filters::new().with("active", true).with("email", " a@b.c "));
        let pairs = q.to_query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("page".to_string(), "0".to_string()),
                ("size".to_string(), "10".to_string()),
                ("sortBy".to_string(), "name".to_string()),
                ("sortDir".to_string(), "asc".to_string()),
                ("active".to_string(), "true".to_string()),
                ("email".to_string(), "a@b.c".to_string()),
            ]
        );
    }
}
