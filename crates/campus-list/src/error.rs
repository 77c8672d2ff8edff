//! Error types for list controllers.

use campus_client::ClientError;

/// Why the last fetch did not update the listing.
///
/// Kept in [`ListState::last_error`](crate::ListState::last_error) for the
/// view; never returned from `fetch_data`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ListError {
    /// The request itself failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The backend answered without a truthy `status` or without `data`.
    #[error("list endpoint returned no data")]
    EmptyResponse,
}
