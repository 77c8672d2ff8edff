//! Scripted in-memory transport for tests.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::{HttpRequest, HttpResponse, Transport, TransportError};

/// A [`Transport`] that answers from a queue and records every request.
///
/// When the queue runs dry the fallback response is used; without one
/// the request fails with [`TransportError::Connect`].
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    fallback: Mutex<Option<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
    latency: Mutex<Option<Duration>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one outcome.
    pub fn push(&self, outcome: Result<HttpResponse, TransportError>) {
        lock(&self.responses).push_back(outcome);
    }

    /// Queues a response with the given status and body.
    pub fn push_response(&self, status: u16, body: impl Into<Vec<u8>>) {
        self.push(Ok(HttpResponse::new(status, body)));
    }

    /// Response used whenever the queue is empty.
    pub fn set_fallback(&self, status: u16, body: impl Into<Vec<u8>>) {
        *lock(&self.fallback) = Some(HttpResponse::new(status, body));
    }

    /// Delays every response by `latency` (Tokio time).
    pub fn set_latency(&self, latency: Duration) {
        *lock(&self.latency) = Some(latency);
    }

    /// Every request seen so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        lock(&self.requests).last().cloned()
    }
}

impl Transport for MockTransport {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send {
        lock(&self.requests).push(request);
        let outcome = lock(&self.responses).pop_front().unwrap_or_else(|| {
            lock(&self.fallback)
                .clone()
                .ok_or_else(|| TransportError::Connect("no response scripted".to_string()))
        });
        let latency = *lock(&self.latency);

        async move {
            if let Some(latency) = latency {
                tokio::time::sleep(latency).await;
            }
            outcome
        }
    }
}
