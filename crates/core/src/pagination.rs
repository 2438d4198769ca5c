//! Offset pagination arithmetic
//!
//! Pure helpers used by the shell's auto-pagination loop: page size clamping, the
//! `limit`/`offset` window of a page, and the decision whether another page is worth
//! fetching.

use serde_json::Value;

/// Largest page the API accepts
pub const MAX_PAGE_SIZE: usize = 100;

/// Page size used when the caller does not pick one
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Page ceiling used when the caller does not pick one
pub const DEFAULT_MAX_PAGES: usize = 10;

/// The `limit`/`offset` window for one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: usize,
    pub offset: usize,
}

/// Clamp a requested page size to `1..=MAX_PAGE_SIZE`
pub fn clamp_page_size(page_size: usize) -> usize {
    page_size.clamp(1, MAX_PAGE_SIZE)
}

/// Window for the zero-based `page`
pub fn page_window(page: usize, page_size: usize) -> PageWindow {
    PageWindow {
        limit: page_size,
        offset: page * page_size,
    }
}

/// Items carried by one page response, and whether the loop must stop after it
#[derive(Debug, Clone, PartialEq)]
pub struct PageContents {
    pub items: Vec<Value>,
    pub last: bool,
}

/// Split a page response into items.
///
/// - `None`, `null` or `[]` yield no items and end the loop
/// - an array shorter than `page_size` is the last page
/// - any other value is a single item and ends the loop
pub fn split_page(response: Option<Value>, page_size: usize) -> PageContents {
    match response {
        None | Some(Value::Null) => PageContents {
            items: Vec::new(),
            last: true,
        },
        Some(Value::Array(items)) => {
            let last = items.len() < page_size;
            PageContents { items, last }
        }
        Some(other) => PageContents {
            items: vec![other],
            last: true,
        },
    }
}
