//! # Pagination
//!
//! `Pager` carries the request-side parameters; after a call it also holds
//! the server-reported total and the cursor key for cursor-only backends.
//! A bounded slice of results plus that metadata is a `Page`.

use crate::object::GenericObject;

/// Default page size
pub const DEFAULT_LIMIT: u64 = 30;

/// Pagination parameters for list and search operations
#[derive(Debug, Clone)]
pub struct Pager {
    /// Page number, starting at 1
    pub page: u64,
    /// Maximum items per page
    pub limit: u64,
    /// Field to sort by
    pub sortby: Option<String>,
    /// Descending sort order
    pub desc: bool,
    /// Cursor key returned by the previous page, for cursor-based backends
    pub last_key: Option<String>,
    /// Restrict returned objects to these fields
    pub select: Option<Vec<String>>,
    /// Total number of results, as reported by the server. May stay `None`
    /// for cursor-only backends.
    pub count: Option<u64>,
}

impl Default for Pager {
    fn default() -> Self {
        Pager {
            page: 1,
            limit: DEFAULT_LIMIT,
            sortby: Some("timestamp".to_string()),
            desc: true,
            last_key: None,
            select: None,
            count: None,
        }
    }
}

impl Pager {
    /// Create a pager for a given page and page size
    pub fn new(page: u64, limit: u64) -> Self {
        Pager {
            page,
            limit,
            ..Default::default()
        }
    }

    /// Sort by a specific field
    pub fn sorted_by(mut self, field: &str, desc: bool) -> Self {
        self.sortby = Some(field.to_string());
        self.desc = desc;
        self
    }

    /// Convert to query parameters
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("page".to_string(), self.page.to_string()),
            ("desc".to_string(), self.desc.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];
        if let Some(key) = &self.last_key {
            params.push(("lastKey".to_string(), key.clone()));
        }
        if let Some(sortby) = &self.sortby {
            params.push(("sort".to_string(), sortby.clone()));
        }
        if let Some(select) = &self.select {
            for field in select {
                params.push(("select".to_string(), field.clone()));
            }
        }
        params
    }
}

/// One page of results
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Objects on this page, in server order
    pub items: Vec<GenericObject>,
    /// Total result count across all pages, when the server reports one
    pub total: Option<u64>,
    /// Cursor for the next page, when the server paginates by cursor
    pub last_key: Option<String>,
}

impl Page {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
