use boardkit_core::pagination::{
    clamp_page_size, page_window, split_page, DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE,
};
use boardkit_core::shaping::shape;
use serde_json::Value;

use super::{RequestExecutor, RequestSpec, Transport};
use crate::error::ApiError;

/// How [`fetch_all`] walks and shapes a collection
#[derive(Debug, Clone, PartialEq)]
pub struct PageOptions {
    /// Items per request, clamped to `1..=100`
    pub page_size: usize,
    /// Hard ceiling on the number of requests
    pub max_pages: usize,
    pub compact: bool,
    /// Comma-separated field list applied to each item
    pub fields: Option<String>,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            compact: true,
            fields: None,
        }
    }
}

/// Fetch every page of an offset-paginated collection.
///
/// Stops on an empty page, on a page shorter than `page_size`, or after
/// `max_pages` requests, whichever comes first. The aggregate is compacted, then
/// field-selected.
pub async fn fetch_all<T: Transport>(
    executor: &RequestExecutor<T>,
    base: &RequestSpec,
    options: &PageOptions,
) -> Result<Vec<Value>, ApiError> {
    let page_size = clamp_page_size(options.page_size);
    let mut items: Vec<Value> = Vec::new();

    for page in 0..options.max_pages {
        let window = page_window(page, page_size);
        let mut spec = base.clone();
        spec.set_param("limit", window.limit);
        spec.set_param("offset", window.offset);

        let contents = split_page(executor.execute(&spec).await?, page_size);
        log::debug!(
            "{} page {} returned {} item(s)",
            base.path,
            page + 1,
            contents.items.len()
        );

        items.extend(contents.items);
        if contents.last {
            break;
        }
    }

    match shape(Value::Array(items), options.compact, options.fields.as_deref()) {
        Value::Array(items) => Ok(items),
        other => Ok(vec![other]),
    }
}
