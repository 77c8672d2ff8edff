//! Paginated list controller for campus.
//!
//! A [`ListController`] owns the rows, paging, filters and selection of one
//! remote listing and keeps them in sync with the backend:
//!
//! - filter and paging changes schedule a **debounced** fetch (500ms by
//!   default), so typing into a search box sends one request, not ten;
//! - meaningful filter changes jump back to page 1;
//! - blank filters (`null`, `""`) never reach the query string;
//! - failures leave the current rows in place and surface as a notice and
//!   [`ListState::last_error`].

mod controller;
mod error;
mod record;
mod state;

pub use controller::{FETCH_FAILED_NOTICE, ListController, REQUEST_FAILED_NOTICE};
pub use error::ListError;
pub use record::RecordId;
pub use state::{ListOptions, ListState};
