//! Integration tests for `ListController`.
//!
//! Runs on Tokio's paused clock: sleeping past the 500ms debounce window
//! fires the pending fetch, and the scripted transport answers at once.

use std::sync::Arc;
use std::time::Duration;

use campus_client::ApiClient;
use campus_list::{ListController, ListError, ListOptions, RecordId};
use campus_protocol::{Filters, ParamValue};
use campus_session::{NoticeLevel, RecordingNotifier, SessionConfig, SessionManager};
use campus_transport::{HttpRequest, MockTransport, TransportError};
use serde_json::{Value, json};
use tokio::time::sleep;

const API: &str = "http://api.test";

// =========================================================================
// Harness
// =========================================================================

struct Harness {
    transport: Arc<MockTransport>,
    notifier: Arc<RecordingNotifier>,
    api: ApiClient<Arc<MockTransport>>,
}

fn harness() -> Harness {
    let transport = Arc::new(MockTransport::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let session = SessionManager::new(Arc::clone(&transport), SessionConfig::with_api_url(API));
    let api = ApiClient::builder(API, Arc::clone(&transport), session)
        .notifier(notifier.clone())
        .build();
    Harness {
        transport,
        notifier,
        api,
    }
}

impl Harness {
    fn list(&self, options: ListOptions) -> ListController<Arc<MockTransport>> {
        ListController::new(self.api.clone(), options)
    }

    fn respond(&self, body: Value) {
        self.transport.push_response(200, body.to_string());
    }

    fn errors(&self) -> Vec<String> {
        self.notifier.messages(NoticeLevel::Error)
    }
}

fn page(rows: Value, from: Option<u64>, total: Option<u64>) -> Value {
    json!({"status": true, "data": {"data": rows, "from": from, "total": total}})
}

fn rows(ids: &[i64]) -> Value {
    Value::Array(
        ids.iter()
            .map(|id| json!({"id": id, "name": format!("row {id}")}))
            .collect(),
    )
}

fn query(request: &HttpRequest) -> Vec<(String, String)> {
    request.query.clone()
}

async fn settle() {
    sleep(Duration::from_millis(600)).await;
}

// =========================================================================
// Construction and params
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_construction_schedules_debounced_fetch() {
    let h = harness();
    h.respond(page(rows(&[1, 2]), Some(1), Some(2)));

    let list = h.list(ListOptions::new("/majors"));
    assert!(list.has_pending_fetch());

    sleep(Duration::from_millis(499)).await;
    assert_eq!(h.transport.request_count(), 0);

    sleep(Duration::from_millis(2)).await;
    assert_eq!(h.transport.request_count(), 1);

    let request = h.transport.last_request().unwrap();
    assert_eq!(request.url, "http://api.test/majors");
    assert_eq!(request.query_value("per_page"), Some("10"));
    assert_eq!(request.query_value("page"), Some("1"));
    assert_eq!(list.items().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_no_fetch_when_construction_fetch_disabled() {
    let h = harness();
    let list = h.list(ListOptions::new("/majors").fetch_on_construction(false));

    settle().await;
    assert!(!list.has_pending_fetch());
    assert_eq!(h.transport.request_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_blank_filters_never_sent() {
    let h = harness();
    h.respond(page(rows(&[]), None, Some(0)));

    let mut filters = Filters::new();
    filters.insert("keyword".into(), "".into());
    filters.insert("status".into(), ParamValue::Null);
    filters.insert("major_id".into(), 3i64.into());
    let list = h.list(ListOptions::new("/students").filters(filters));
    settle().await;

    let sent = query(&h.transport.last_request().unwrap());
    assert!(sent.iter().all(|(k, _)| k != "keyword" && k != "status"));
    assert!(sent.contains(&("major_id".to_string(), "3".to_string())));
    assert_eq!(list.filters().len(), 3, "blank filters stay in state");
}

#[tokio::test(start_paused = true)]
async fn test_filters_win_over_paging_params() {
    let h = harness();
    h.respond(page(rows(&[]), None, None));

    let mut filters = Filters::new();
    filters.insert("per_page".into(), 50u32.into());
    let _list = h.list(ListOptions::new("/x").filters(filters));
    settle().await;

    let request = h.transport.last_request().unwrap();
    assert_eq!(request.query_value("per_page"), Some("50"));
}

// =========================================================================
// Debounce
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_rapid_filter_changes_collapse_into_one_fetch() {
    let h = harness();
    h.transport
        .set_fallback(200, page(rows(&[1]), Some(1), Some(1)).to_string());
    let list = h.list(ListOptions::new("/x").fetch_on_construction(false));

    list.set_filter("keyword", "a");
    sleep(Duration::from_millis(100)).await;
    list.set_filter("keyword", "ab");
    sleep(Duration::from_millis(100)).await;
    list.set_filter("keyword", "abc");
    settle().await;

    assert_eq!(h.transport.request_count(), 1);
    let request = h.transport.last_request().unwrap();
    assert_eq!(request.query_value("keyword"), Some("abc"));
}

#[tokio::test(start_paused = true)]
async fn test_page_and_filter_changes_share_one_window() {
    let h = harness();
    h.transport
        .set_fallback(200, page(rows(&[1]), Some(21), Some(30)).to_string());
    let list = h.list(ListOptions::new("/x"));

    list.set_page(3);
    list.set_page_size(20);
    settle().await;

    assert_eq!(h.transport.request_count(), 1);
    let request = h.transport.last_request().unwrap();
    assert_eq!(request.query_value("page"), Some("3"));
    assert_eq!(request.query_value("per_page"), Some("20"));
}

// =========================================================================
// Filter semantics
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_all_filter_keeps_page_meaningful_filter_resets() {
    let h = harness();
    h.transport
        .set_fallback(200, page(rows(&[]), None, Some(0)).to_string());
    let list = h.list(ListOptions::new("/x").fetch_on_construction(false));

    list.set_page(4);
    assert!(!list.set_filter("status", "all"));
    assert_eq!(list.current_page(), 4);

    assert!(list.set_filter("status", "active"));
    assert_eq!(list.current_page(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_zero_filter_is_not_meaningful() {
    let h = harness();
    let list = h.list(ListOptions::new("/x").fetch_on_construction(false));

    list.set_page(2);
    assert!(!list.set_filter("major_id", 0i64));
    assert_eq!(list.current_page(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_unchanged_filter_schedules_nothing() {
    let h = harness();
    let list = h.list(ListOptions::new("/x").fetch_on_construction(false));

    list.set_filter("status", "active");
    list.cancel_pending();

    assert!(!list.set_filter("status", "active"));
    assert!(!list.has_pending_fetch());
}

#[tokio::test(start_paused = true)]
async fn test_set_filters_batches_changes() {
    let h = harness();
    h.transport
        .set_fallback(200, page(rows(&[]), None, Some(0)).to_string());
    let list = h.list(ListOptions::new("/x").fetch_on_construction(false));
    list.set_page(5);

    let mut batch = Filters::new();
    batch.insert("status".into(), "all".into());
    batch.insert("keyword".into(), "".into());
    assert!(!list.set_filters(batch.clone()), "no meaningful value, no reset");
    assert_eq!(list.current_page(), 5);
    assert!(list.has_pending_fetch());

    list.cancel_pending();
    assert!(!list.set_filters(batch));
    assert!(!list.has_pending_fetch(), "unchanged batch is a no-op");
}

#[tokio::test(start_paused = true)]
async fn test_remove_filter() {
    let h = harness();
    let list = h.list(ListOptions::new("/x").fetch_on_construction(false));

    assert!(!list.remove_filter("missing"));
    assert!(!list.has_pending_fetch());

    list.set_filter("status", "active");
    list.cancel_pending();
    list.remove_filter("status");
    assert!(list.filters().is_empty());
    assert!(list.has_pending_fetch());
}

#[tokio::test(start_paused = true)]
async fn test_set_page_clamps_and_ignores_no_change() {
    let h = harness();
    let list = h.list(ListOptions::new("/x").fetch_on_construction(false));

    assert!(!list.set_page(0), "0 clamps to the current page 1");
    assert!(!list.has_pending_fetch());
    assert!(list.set_page(2));
    assert!(!list.set_page_size(10));
    assert!(list.set_page_size(0));
    assert_eq!(list.page_size(), 1);
}

// =========================================================================
// Response handling
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_paginated_success_replaces_rows_and_clears_selection() {
    let h = harness();
    h.respond(page(rows(&[1, 2, 3]), Some(1), Some(3)));
    h.respond(page(rows(&[4]), Some(11), Some(11)));
    let list = h.list(ListOptions::new("/x"));
    settle().await;

    list.select_all(true, "id");
    assert_eq!(list.selected_ids().len(), 3);

    list.set_page(2);
    settle().await;

    let snapshot = list.snapshot();
    assert_eq!(snapshot.items, rows(&[4]).as_array().unwrap().clone());
    assert_eq!(snapshot.from, 11);
    assert_eq!(snapshot.total, 11);
    assert!(snapshot.selected_ids.is_empty());
    assert!(!snapshot.is_loading);
    assert_eq!(snapshot.last_error, None);
}

#[tokio::test(start_paused = true)]
async fn test_missing_total_becomes_zero() {
    let h = harness();
    h.respond(page(rows(&[1]), Some(1), None));
    let list = h.list(ListOptions::new("/x"));
    settle().await;

    assert_eq!(list.total(), 0);
    assert_eq!(list.from_row(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_null_data_notifies_and_keeps_rows() {
    let h = harness();
    h.respond(page(rows(&[1, 2]), Some(1), Some(2)));
    h.respond(json!({"status": true, "data": null}));
    let list = h.list(ListOptions::new("/x"));
    settle().await;

    list.fetch_data().await;

    assert_eq!(list.items().len(), 2);
    assert_eq!(list.total(), 2);
    assert_eq!(h.errors(), vec!["Failed to fetch data".to_string()]);
    assert_eq!(list.last_error(), Some(ListError::EmptyResponse));
}

#[tokio::test(start_paused = true)]
async fn test_false_status_notifies_and_keeps_rows() {
    let h = harness();
    h.respond(json!({"status": false, "data": [1, 2]}));
    let list = h.list(ListOptions::new("/x").fetch_on_construction(false));

    list.fetch_data().await;

    assert!(list.items().is_empty());
    assert_eq!(h.errors(), vec!["Failed to fetch data".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_unpaginated_array_used_as_rows() {
    let h = harness();
    h.respond(json!({"status": true, "data": [{"id": 1}, {"id": 2}]}));
    let list = h.list(
        ListOptions::new("/roles")
            .paginated(false)
            .fetch_on_construction(false),
    );
    list.toggle_select(9);

    list.fetch_data().await;

    assert_eq!(list.items().len(), 2);
    assert!(list.is_selected(9), "unpaginated loads keep the selection");
}

#[tokio::test(start_paused = true)]
async fn test_unpaginated_object_wrapped_in_single_row() {
    let h = harness();
    h.respond(json!({"status": true, "data": {"id": 1, "name": "Only"}}));
    let list = h.list(ListOptions::new("/me").paginated(false).fetch_on_construction(false));

    list.fetch_data().await;

    assert_eq!(list.items(), vec![json!({"id": 1, "name": "Only"})]);
}

#[tokio::test(start_paused = true)]
async fn test_paginated_without_nested_page_falls_back_to_rows() {
    let h = harness();
    h.respond(json!({"status": true, "data": [{"id": 1}]}));
    let list = h.list(ListOptions::new("/x").fetch_on_construction(false));

    list.fetch_data().await;

    assert_eq!(list.items(), vec![json!({"id": 1})]);
    assert_eq!(list.total(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_request_failure_records_error_and_keeps_rows() {
    let h = harness();
    h.respond(page(rows(&[1]), Some(1), Some(1)));
    h.transport.push(Err(TransportError::Connect("refused".into())));
    let list = h.list(ListOptions::new("/x"));
    settle().await;

    list.fetch_data().await;

    assert_eq!(list.items().len(), 1);
    assert!(matches!(list.last_error(), Some(ListError::Client(_))));
    assert!(h.errors().contains(&"Something went wrong!".to_string()));
    assert!(!list.is_loading());
}

#[tokio::test(start_paused = true)]
async fn test_successful_fetch_clears_last_error() {
    let h = harness();
    h.transport.push(Err(TransportError::Timeout));
    h.respond(page(rows(&[1]), Some(1), Some(1)));
    let list = h.list(ListOptions::new("/x").fetch_on_construction(false));

    list.fetch_data().await;
    assert!(list.last_error().is_some());

    list.fetch_data().await;
    assert_eq!(list.last_error(), None);
}

#[tokio::test(start_paused = true)]
async fn test_is_loading_only_while_in_flight() {
    let h = harness();
    h.transport.set_latency(Duration::from_millis(300));
    h.respond(page(rows(&[1]), Some(1), Some(1)));
    let list = h.list(ListOptions::new("/x"));

    assert!(!list.is_loading(), "not loading while only scheduled");
    sleep(Duration::from_millis(600)).await;
    assert!(list.is_loading());

    sleep(Duration::from_millis(300)).await;
    assert!(!list.is_loading());
    assert_eq!(list.items().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_is_loading_cleared_by_first_of_overlapping_fetches() {
    let h = harness();
    h.transport.set_latency(Duration::from_millis(300));
    h.respond(page(rows(&[1]), Some(1), Some(1)));
    h.respond(page(rows(&[2]), Some(1), Some(1)));
    let list = h.list(ListOptions::new("/x").fetch_on_construction(false));

    let later = async {
        sleep(Duration::from_millis(100)).await;
        list.fetch_data().await;
    };
    let between = async {
        sleep(Duration::from_millis(350)).await;
        list.is_loading()
    };
    let (_, _, loading_between) = tokio::join!(list.fetch_data(), later, between);

    assert!(!loading_between, "first response clears the flag early");
    assert_eq!(h.transport.request_count(), 2);
    assert!(!list.is_loading());
}

// =========================================================================
// Selection
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_select_all_then_none() {
    let h = harness();
    h.respond(page(rows(&[1, 2]), Some(1), Some(2)));
    let list = h.list(ListOptions::new("/x"));
    settle().await;

    list.select_all(true, "id");
    assert!(list.is_selected(1) && list.is_selected(2));

    list.select_all(false, "id");
    assert!(list.selected_ids().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_select_all_by_custom_field_skips_rows_without_it() {
    let h = harness();
    h.respond(page(
        json!([{"code": "SV01"}, {"code": "SV02"}, {"name": "no code"}]),
        Some(1),
        Some(3),
    ));
    let list = h.list(ListOptions::new("/x"));
    settle().await;

    list.select_all(true, "code");
    assert_eq!(list.selected_ids().len(), 2);
    assert!(list.is_selected("SV01"));
}

#[tokio::test(start_paused = true)]
async fn test_toggle_select_flips() {
    let h = harness();
    let list = h.list(ListOptions::new("/x").fetch_on_construction(false));

    assert!(list.toggle_select(5));
    assert!(list.is_selected(RecordId::Number(5)));
    assert!(!list.toggle_select(5));
    assert!(!list.is_selected(5));
}

#[tokio::test(start_paused = true)]
async fn test_dropping_controller_cancels_pending_fetch() {
    let h = harness();
    let list = h.list(ListOptions::new("/x"));
    drop(list);

    settle().await;
    assert_eq!(h.transport.request_count(), 0);
}
