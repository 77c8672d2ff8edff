/// Errors that can occur in the transport layer.
///
/// Variants carry rendered messages rather than the underlying client
/// error so that callers can clone them into state (the list controller
/// keeps its last error around for the view).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The remote host could not be reached.
    #[error("connect failed: {0}")]
    Connect(String),

    /// The request did not complete within the transport's timeout.
    #[error("request timed out")]
    Timeout,

    /// The request could not be built (bad URL, invalid header value).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Sending the request or reading the response failed mid-flight.
    #[error("request failed: {0}")]
    Request(String),

    /// The response body could not be read.
    #[error("reading response body failed: {0}")]
    Body(String),
}
