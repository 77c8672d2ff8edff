//! List options and the state a controller owns.

use std::collections::HashSet;
use std::time::Duration;

use campus_protocol::Filters;
use serde_json::Value;

use crate::{ListError, RecordId};

// ---------------------------------------------------------------------------
// ListOptions
// ---------------------------------------------------------------------------

/// How a [`ListController`](crate::ListController) is set up.
#[derive(Debug, Clone, PartialEq)]
pub struct ListOptions {
    /// Path of the listing, relative to the API base URL (e.g. `/majors`).
    pub endpoint: String,

    /// Filters in place before the first fetch.
    pub initial_filters: Filters,

    /// Expect `{data: {data, from, total}}` pages. Default: `true`.
    pub paginated: bool,

    /// Schedule a (debounced) fetch as soon as the controller exists.
    /// Default: `true`.
    pub fetch_on_construction: bool,

    /// Rows per page. Default: 10.
    pub page_size: u32,

    /// Quiet window before a fetch fires. Default: 500ms.
    pub debounce: Duration,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            initial_filters: Filters::new(),
            paginated: true,
            fetch_on_construction: true,
            page_size: 10,
            debounce: Duration::from_millis(500),
        }
    }
}

impl ListOptions {
    /// Default options for `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    pub fn filters(mut self, filters: Filters) -> Self {
        self.initial_filters = filters;
        self
    }

    pub fn paginated(mut self, paginated: bool) -> Self {
        self.paginated = paginated;
        self
    }

    pub fn fetch_on_construction(mut self, fetch: bool) -> Self {
        self.fetch_on_construction = fetch;
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

// ---------------------------------------------------------------------------
// ListState
// ---------------------------------------------------------------------------

/// Everything a view renders for one listing.
///
/// Returned by value from [`ListController::snapshot`](crate::ListController::snapshot).
#[derive(Debug, Clone, PartialEq)]
pub struct ListState {
    /// Rows of the current page (or the whole listing when unpaginated).
    pub items: Vec<Value>,
    /// Total row count reported by the backend; `0` when it sends none.
    pub total: u64,
    /// 1-based page index, never 0.
    pub current_page: u32,
    /// Rows per page, never 0.
    pub page_size: u32,
    /// 1-based offset of the first row on the page.
    pub from: u64,
    pub filters: Filters,
    /// Cleared whenever a new page arrives in paginated mode.
    pub selected_ids: HashSet<RecordId>,
    /// `true` only while a fetch is in flight. With two fetches overlapping,
    /// the first to settle clears it while the other is still running.
    pub is_loading: bool,
    pub last_error: Option<ListError>,
}

impl ListState {
    pub(crate) fn new(options: &ListOptions) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            current_page: 1,
            page_size: options.page_size.max(1),
            from: 1,
            filters: options.initial_filters.clone(),
            selected_ids: HashSet::new(),
            is_loading: false,
            last_error: None,
        }
    }

    /// Query parameters for the next fetch: paging first, then filters
    /// (filters win on collision).
    pub fn params(&self) -> Filters {
        let mut params = Filters::new();
        params.insert("per_page".to_string(), self.page_size.into());
        params.insert("page".to_string(), self.current_page.into());
        params.extend(self.filters.iter().map(|(k, v)| (k.clone(), v.clone())));
        params
    }

    /// Number of the last page, at least 1.
    pub fn page_count(&self) -> u64 {
        self.total.div_ceil(u64::from(self.page_size)).max(1)
    }
}
