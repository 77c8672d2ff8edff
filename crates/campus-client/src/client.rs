//! The authenticated request helper.
//!
//! Every call goes through [`ApiClient::request`]:
//!
//! ```text
//! show loading ─▶ attach bearer ─▶ Transport::execute ─▶ map status
//!                                                          │
//!          hide loading ◀── notify user (on failure) ◀─────┘
//! ```

use std::sync::Arc;

use campus_protocol::{
    Codec, ErrorBody, Filters, JsonCodec, ProtocolError, first_error_message, is_truthy,
    query_pairs,
};
use campus_session::{LoadingIndicator, NoLoadingIndicator, Notifier, SessionManager, TracingNotifier};
use campus_transport::{HttpRequest, HttpResponse, Method, Transport};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{ClientError, LoadingGuard};

/// Notice shown for failures without a usable message.
pub const GENERIC_FAILURE_NOTICE: &str = "Something went wrong";

/// Notice shown for a 422 whose `errors` yields no message.
pub const VALIDATION_FALLBACK_NOTICE: &str = "An error occurred.";

// ---------------------------------------------------------------------------
// RequestOptions
// ---------------------------------------------------------------------------

/// Per-call options.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    /// Query string pairs, in order.
    pub query: Vec<(String, String)>,
    /// JSON body.
    pub body: Option<Value>,
    /// Toggle the global loading indicator around the call.
    pub show_loading: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            query: Vec::new(),
            body: None,
            show_loading: true,
        }
    }
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `params` as the query string. Blank values are dropped.
    pub fn params(mut self, params: &Filters) -> Self {
        self.query = query_pairs(params);
        self
    }

    /// Appends one query pair.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Leaves the loading indicator alone.
    pub fn quiet(mut self) -> Self {
        self.show_loading = false;
        self
    }
}

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

struct ClientInner<T: Transport> {
    api_url: String,
    transport: T,
    session: SessionManager<T>,
    codec: JsonCodec,
    notifier: Arc<dyn Notifier>,
    loading: Arc<dyn LoadingIndicator>,
}

/// JSON client for the portal API.
///
/// Cheap to clone; clones share the transport, session and effect sinks.
/// The bearer token is read from the [`SessionManager`] on every call, so
/// a refresh is picked up by the next request without any wiring.
pub struct ApiClient<T: Transport> {
    inner: Arc<ClientInner<T>>,
}

impl<T: Transport> Clone for ApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transport> ApiClient<T> {
    /// A client that reports to the log and has no loading indicator.
    pub fn new(api_url: impl Into<String>, transport: T, session: SessionManager<T>) -> Self {
        Self::builder(api_url, transport, session).build()
    }

    pub fn builder(
        api_url: impl Into<String>,
        transport: T,
        session: SessionManager<T>,
    ) -> ApiClientBuilder<T> {
        ApiClientBuilder {
            api_url: api_url.into(),
            transport,
            session,
            notifier: None,
            loading: None,
        }
    }

    pub fn session(&self) -> &SessionManager<T> {
        &self.inner.session
    }

    pub fn notifier(&self) -> Arc<dyn Notifier> {
        Arc::clone(&self.inner.notifier)
    }

    pub fn api_url(&self) -> &str {
        &self.inner.api_url
    }

    /// Performs one call against `path` (relative to the API base URL) and
    /// decodes the 2xx body as `R`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Transport`] when the request never completed;
    /// - [`ClientError::Validation`] for a 422 carrying `errors`;
    /// - [`ClientError::Http`] for any other non-2xx status;
    /// - [`ClientError::Protocol`] when a body cannot be encoded or decoded;
    /// - [`ClientError::EmptyResponse`] for an empty 2xx body that `R`
    ///   cannot represent.
    ///
    /// Each of these has already been shown to the user.
    pub async fn request<R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<R, ClientError> {
        let _loading = options
            .show_loading
            .then(|| LoadingGuard::show(Arc::clone(&self.inner.loading)));

        let request = self
            .build_request(method, path, options)
            .map_err(|e| self.reject_unsent(method, path, e))?;
        debug!(%method, url = %request.url, "api request");

        let response = match self.inner.transport.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(%method, path, error = %e, "api request failed");
                self.inner.notifier.error(GENERIC_FAILURE_NOTICE);
                return Err(e.into());
            }
        };

        if response.is_success() {
            self.decode_success(&response).inspect_err(|e| {
                warn!(%method, path, error = %e, "undecodable api response");
                self.inner.notifier.error(GENERIC_FAILURE_NOTICE);
            })
        } else {
            let error = self.map_failure(&response);
            warn!(%method, path, status = response.status, error = %error, "api call rejected");
            self.inner.notifier.error(&notice_for(&error));
            Err(error)
        }
    }

    pub async fn get<R: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<R, ClientError> {
        self.request(Method::Get, path, options).await
    }

    pub async fn post<R: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<R, ClientError> {
        let body = to_value(body).map_err(|e| self.reject_unsent(Method::Post, path, e))?;
        self.request(Method::Post, path, options.body(body)).await
    }

    pub async fn put<R: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<R, ClientError> {
        let body = to_value(body).map_err(|e| self.reject_unsent(Method::Put, path, e))?;
        self.request(Method::Put, path, options.body(body)).await
    }

    pub async fn delete<R: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<R, ClientError> {
        self.request(Method::Delete, path, options).await
    }

    /// A request that could not be built never reaches the transport,
    /// but is reported like any other failure.
    fn reject_unsent(&self, method: Method, path: &str, error: ClientError) -> ClientError {
        warn!(%method, path, error = %error, "api request could not be built");
        self.inner.notifier.error(GENERIC_FAILURE_NOTICE);
        error
    }

    fn build_request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<HttpRequest, ClientError> {
        let codec = &self.inner.codec;
        let mut request = HttpRequest::new(method, format!("{}{}", self.inner.api_url, path))
            .header("Accept", codec.content_type())
            .query(options.query);

        if let Some(token) = self.inner.session.token() {
            request = request.header("Authorization", format!("Bearer {token}"));
        }
        if let Some(body) = options.body {
            request = request
                .header("Content-Type", codec.content_type())
                .body(codec.encode(&body)?);
        }
        Ok(request)
    }

    fn decode_success<R: DeserializeOwned>(
        &self,
        response: &HttpResponse,
    ) -> Result<R, ClientError> {
        if response.body.iter().all(u8::is_ascii_whitespace) {
            // `null` lets `()`, `Option<_>` and `Value` accept an empty body.
            return self
                .inner
                .codec
                .decode(b"null")
                .map_err(|_| ClientError::EmptyResponse);
        }
        Ok(self.inner.codec.decode(&response.body)?)
    }

    fn map_failure(&self, response: &HttpResponse) -> ClientError {
        let body: ErrorBody = self.inner.codec.decode(&response.body).unwrap_or_default();

        if response.status == 422 {
            if let Some(errors) = body.errors.filter(is_truthy) {
                let message = first_error_message(&errors)
                    .unwrap_or_else(|| VALIDATION_FALLBACK_NOTICE.to_string());
                return ClientError::Validation { message, errors };
            }
        }

        ClientError::Http {
            status: response.status,
            message: body
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| GENERIC_FAILURE_NOTICE.to_string()),
        }
    }
}

fn to_value<B: Serialize>(body: &B) -> Result<Value, ClientError> {
    serde_json::to_value(body).map_err(|e| ProtocolError::Encode(e.to_string()).into())
}

fn notice_for(error: &ClientError) -> String {
    match error {
        ClientError::Validation { message, .. } | ClientError::Http { message, .. } => {
            message.clone()
        }
        _ => GENERIC_FAILURE_NOTICE.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder<T: Transport> {
    api_url: String,
    transport: T,
    session: SessionManager<T>,
    notifier: Option<Arc<dyn Notifier>>,
    loading: Option<Arc<dyn LoadingIndicator>>,
}

impl<T: Transport> ApiClientBuilder<T> {
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn loading_indicator(mut self, loading: Arc<dyn LoadingIndicator>) -> Self {
        self.loading = Some(loading);
        self
    }

    pub fn build(self) -> ApiClient<T> {
        ApiClient {
            inner: Arc::new(ClientInner {
                api_url: self.api_url.trim_end_matches('/').to_string(),
                transport: self.transport,
                session: self.session,
                codec: JsonCodec,
                notifier: self.notifier.unwrap_or_else(|| Arc::new(TracingNotifier)),
                loading: self.loading.unwrap_or_else(|| Arc::new(NoLoadingIndicator)),
            }),
        }
    }
}
