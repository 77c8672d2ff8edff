//! The list controller.
//!
//! One controller drives one remote listing. Views mutate filters, the
//! page or the page size through explicit methods; each mutation that
//! changes something restarts a 500ms quiet window, and the fetch that
//! finally fires reads whatever state is current at that moment.
//!
//! ```text
//! set_filter ─┐
//! set_page ───┼──▶ Debouncer (500ms) ──▶ fetch_data ──▶ ApiClient::get
//! set_page_size┘                              │
//!                                             ▼
//!                               items / total / from / selected_ids
//! ```

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use campus_client::{ApiClient, RequestOptions};
use campus_protocol::{Filters, Page, ParamValue, coerce_rows, has_meaningful, is_truthy};
use campus_timer::Debouncer;
use campus_transport::Transport;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{ListError, ListOptions, ListState, RecordId};

/// Notice for a response without a truthy `status` or without `data`.
pub const FETCH_FAILED_NOTICE: &str = "Failed to fetch data";

/// Notice for a request that failed outright.
pub const REQUEST_FAILED_NOTICE: &str = "Something went wrong!";

struct Inner<T: Transport> {
    api: ApiClient<T>,
    endpoint: String,
    paginated: bool,
    state: Mutex<ListState>,
    debouncer: Mutex<Debouncer>,
}

/// Drives one paginated (or unpaginated) remote listing.
///
/// Cheap to clone; clones share one state. Dropping the last handle
/// cancels a pending fetch. Construction and every mutating method must
/// run inside a Tokio runtime.
pub struct ListController<T: Transport> {
    inner: Arc<Inner<T>>,
}

impl<T: Transport> Clone for ListController<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Keeps `is_loading` set until dropped.
struct LoadingFlag<'a> {
    state: &'a Mutex<ListState>,
}

impl Drop for LoadingFlag<'_> {
    fn drop(&mut self) {
        lock(self.state).is_loading = false;
    }
}

fn lock(state: &Mutex<ListState>) -> MutexGuard<'_, ListState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T: Transport> ListController<T> {
    /// Creates a controller for `options.endpoint`.
    ///
    /// With `fetch_on_construction` (the default) the first fetch is
    /// already scheduled when this returns.
    pub fn new(api: ApiClient<T>, options: ListOptions) -> Self {
        let controller = Self {
            inner: Arc::new(Inner {
                api,
                endpoint: options.endpoint.clone(),
                paginated: options.paginated,
                state: Mutex::new(ListState::new(&options)),
                debouncer: Mutex::new(Debouncer::new("list-fetch", options.debounce)),
            }),
        };
        debug!(
            endpoint = %options.endpoint,
            paginated = options.paginated,
            "list controller created"
        );
        if options.fetch_on_construction {
            controller.debounced_fetch();
        }
        controller
    }

    fn state(&self) -> MutexGuard<'_, ListState> {
        lock(&self.inner.state)
    }

    // -----------------------------------------------------------------------
    // Fetching
    // -----------------------------------------------------------------------

    /// Fetches the current page right away.
    ///
    /// Never fails from the caller's point of view: problems end up in
    /// `last_error` and as a user notice, and the listing keeps its
    /// previous rows.
    pub async fn fetch_data(&self) {
        let params = {
            let mut state = self.state();
            state.is_loading = true;
            state.last_error = None;
            state.params()
        };
        let _loading = LoadingFlag {
            state: &self.inner.state,
        };

        let endpoint = &self.inner.endpoint;
        debug!(%endpoint, page = ?params.get("page"), "fetching list");
        let result = self
            .inner
            .api
            .get::<Value>(endpoint, RequestOptions::new().params(&params))
            .await;

        match result {
            Ok(body) => self.apply(body),
            Err(e) => {
                warn!(%endpoint, error = %e, "list fetch failed");
                self.state().last_error = Some(ListError::Client(e));
                self.inner.api.notifier().error(REQUEST_FAILED_NOTICE);
            }
        }
    }

    fn apply(&self, body: Value) {
        let status = body.get("status").is_some_and(is_truthy);
        let data = body.get("data").filter(|d| is_truthy(d));
        let Some(data) = data.filter(|_| status) else {
            warn!(endpoint = %self.inner.endpoint, "list response without status or data");
            self.state().last_error = Some(ListError::EmptyResponse);
            self.inner.api.notifier().error(FETCH_FAILED_NOTICE);
            return;
        };

        let mut state = self.state();
        match Page::extract(data).filter(|_| self.inner.paginated) {
            Some(page) => {
                state.items = page.data;
                state.from = page.from.unwrap_or(1);
                state.total = page.total.unwrap_or(0);
                state.selected_ids.clear();
            }
            None => state.items = coerce_rows(data.clone()),
        }
        info!(
            endpoint = %self.inner.endpoint,
            rows = state.items.len(),
            total = state.total,
            page = state.current_page,
            "list updated"
        );
    }

    /// Schedules a fetch after the quiet window, replacing any fetch that
    /// is still waiting.
    pub fn debounced_fetch(&self) {
        let weak: Weak<Inner<T>> = Arc::downgrade(&self.inner);
        self.inner
            .debouncer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .call(async move {
                if let Some(inner) = weak.upgrade() {
                    ListController { inner }.fetch_data().await;
                }
            });
    }

    /// Whether a debounced fetch is waiting to fire.
    pub fn has_pending_fetch(&self) -> bool {
        self.inner
            .debouncer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_pending()
    }

    /// Drops the waiting fetch, if any. A fetch already in flight runs to
    /// completion.
    pub fn cancel_pending(&self) -> bool {
        self.inner
            .debouncer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel()
    }

    // -----------------------------------------------------------------------
    // Filters and paging
    // -----------------------------------------------------------------------

    /// Sets one filter.
    ///
    /// Returns `false` and does nothing else when the value is unchanged.
    /// Otherwise schedules a fetch and returns whether the page was reset
    /// to 1, which happens when any filter is meaningful (not blank, not
    /// `"all"`, not `0`).
    pub fn set_filter(&self, key: impl Into<String>, value: impl Into<ParamValue>) -> bool {
        let (key, value) = (key.into(), value.into());
        let mut state = self.state();
        if state.filters.get(&key) == Some(&value) {
            return false;
        }
        state.filters.insert(key, value);
        self.filters_changed(state)
    }

    /// Sets several filters at once; one fetch for the whole batch.
    /// Keys not in `filters` keep their values.
    pub fn set_filters(&self, filters: Filters) -> bool {
        let mut state = self.state();
        let mut changed = false;
        for (key, value) in filters {
            if state.filters.get(&key) != Some(&value) {
                state.filters.insert(key, value);
                changed = true;
            }
        }
        if !changed {
            return false;
        }
        self.filters_changed(state)
    }

    /// Removes one filter. `false` if it was not set.
    pub fn remove_filter(&self, key: &str) -> bool {
        let mut state = self.state();
        if state.filters.remove(key).is_none() {
            return false;
        }
        self.filters_changed(state)
    }

    fn filters_changed(&self, mut state: MutexGuard<'_, ListState>) -> bool {
        let reset = has_meaningful(&state.filters);
        if reset {
            state.current_page = 1;
        }
        debug!(endpoint = %self.inner.endpoint, reset, "filters changed");
        drop(state);
        self.debounced_fetch();
        reset
    }

    /// Moves to `page` (0 is treated as 1). Returns whether it changed.
    pub fn set_page(&self, page: u32) -> bool {
        let page = page.max(1);
        {
            let mut state = self.state();
            if state.current_page == page {
                return false;
            }
            state.current_page = page;
        }
        self.debounced_fetch();
        true
    }

    /// Sets rows per page (0 is treated as 1). Returns whether it changed.
    pub fn set_page_size(&self, page_size: u32) -> bool {
        let page_size = page_size.max(1);
        {
            let mut state = self.state();
            if state.page_size == page_size {
                return false;
            }
            state.page_size = page_size;
        }
        self.debounced_fetch();
        true
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    /// Selects every row on the current page by its `id_field`, or clears
    /// the selection. Rows without a usable id are skipped.
    pub fn select_all(&self, checked: bool, id_field: &str) {
        let mut state = self.state();
        if checked {
            let ids: HashSet<RecordId> = state
                .items
                .iter()
                .filter_map(|row| row.get(id_field).and_then(RecordId::from_value))
                .collect();
            state.selected_ids = ids;
        } else {
            state.selected_ids.clear();
        }
    }

    /// Flips one id in the selection. Returns whether it is now selected.
    pub fn toggle_select(&self, id: impl Into<RecordId>) -> bool {
        let id = id.into();
        let mut state = self.state();
        if state.selected_ids.remove(&id) {
            false
        } else {
            state.selected_ids.insert(id);
            true
        }
    }

    pub fn is_selected(&self, id: impl Into<RecordId>) -> bool {
        self.state().selected_ids.contains(&id.into())
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// A copy of the whole state.
    pub fn snapshot(&self) -> ListState {
        self.state().clone()
    }

    pub fn items(&self) -> Vec<Value> {
        self.state().items.clone()
    }

    pub fn total(&self) -> u64 {
        self.state().total
    }

    pub fn current_page(&self) -> u32 {
        self.state().current_page
    }

    pub fn page_size(&self) -> u32 {
        self.state().page_size
    }

    /// 1-based offset of the first row on the current page.
    pub fn from_row(&self) -> u64 {
        self.state().from
    }

    pub fn filters(&self) -> Filters {
        self.state().filters.clone()
    }

    pub fn selected_ids(&self) -> HashSet<RecordId> {
        self.state().selected_ids.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state().is_loading
    }

    pub fn last_error(&self) -> Option<ListError> {
        self.state().last_error.clone()
    }

    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    pub fn is_paginated(&self) -> bool {
        self.inner.paginated
    }
}
