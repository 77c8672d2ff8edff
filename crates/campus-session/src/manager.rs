//! The session manager: owns the bearer token and keeps it fresh.
//!
//! Responsibilities:
//! - Restoring the session from persisted credentials on startup
//! - Handing the current token to every outgoing request
//! - Scheduling exactly one refresh, `refresh_lead` before expiry
//! - Renewing the token and persisting the new credential set in one write
//! - Ending the session (notify + redirect to login) when renewal fails
//!
//! # Concurrency note
//!
//! `SessionManager` is a cheap `Arc` handle; clones share one session.
//! The token is read by many concurrent requests and written only by this
//! type (from `set_token` and `refresh`). State lives behind a plain
//! `std::sync::Mutex` that is never held across an `.await`.
//!
//! The refresh timer holds only a `Weak` reference, so dropping the last
//! handle tears the session down and cancels the timer.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use campus_protocol::{Codec, Envelope, JsonCodec, ProtocolError, RefreshRequest, TokenGrant};
use campus_timer::TimerSlot;
use campus_transport::{HttpRequest, Method, Transport};
use tracing::{debug, info, warn};

use crate::{
    Clock, CredentialStore, MemoryCredentialStore, Navigator, Notifier, SessionConfig,
    SessionError, SessionState, StoredCredentials, SystemClock, TracingNavigator,
    TracingNotifier,
};

/// Mutable session data. One per manager.
struct SessionData {
    access_token: Option<String>,
    expires_at_ms: i64,
    refreshing: bool,
    /// Bumped on every token change. A refresh only applies its outcome
    /// to the generation it started from.
    generation: u64,
    /// At most one scheduled refresh.
    timer: TimerSlot,
}

struct Inner<T> {
    config: SessionConfig,
    transport: T,
    codec: JsonCodec,
    store: Arc<dyn CredentialStore>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    clock: Arc<dyn Clock>,
    data: Mutex<SessionData>,
}

/// Owns the bearer token and its refresh timer.
///
/// ## Lifecycle
///
/// ```text
/// initialize() / establish() / set_token()
///        │
///        ▼
///  [Authenticated] ──timer──▶ refresh() ──ok──▶ [Authenticated] (loops)
///                                 │
///                                 └─failed─▶ [Unauthenticated]
///                                            notice + navigate("/login")
/// ```
///
/// All methods that schedule a timer (`initialize`, `set_token`,
/// `establish`, `refresh`) must be called from within a Tokio runtime.
pub struct SessionManager<T: Transport> {
    inner: Arc<Inner<T>>,
}

impl<T: Transport> Clone for SessionManager<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transport> SessionManager<T> {
    /// Creates a manager with in-memory storage and log-only effects.
    pub fn new(transport: T, config: SessionConfig) -> Self {
        Self::builder(transport).config(config).build()
    }

    /// Starts a builder for injecting storage, effects and the clock.
    pub fn builder(transport: T) -> SessionManagerBuilder<T> {
        SessionManagerBuilder::new(transport)
    }

    fn lock(&self) -> MutexGuard<'_, SessionData> {
        self.inner.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// The current bearer token, if any. No side effects.
    pub fn token(&self) -> Option<String> {
        self.lock().access_token.clone()
    }

    /// Absolute expiry of the current token (Unix epoch ms), `0` if none.
    pub fn expires_at_ms(&self) -> i64 {
        self.lock().expires_at_ms
    }

    /// Where the session is in its lifecycle.
    pub fn state(&self) -> SessionState {
        let data = self.lock();
        if data.refreshing {
            SessionState::RefreshPending
        } else if data.access_token.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        }
    }

    /// Whether a refresh timer is waiting to fire.
    pub fn has_pending_refresh(&self) -> bool {
        self.lock().timer.is_pending()
    }

    /// Time until the scheduled refresh fires, or `None` if none is
    /// scheduled.
    pub fn refresh_due_in(&self) -> Option<Duration> {
        self.lock().timer.remaining()
    }

    /// The delay a token expiring at `expires_at_ms` would get, measured
    /// from now. `None` means no timer would be scheduled.
    pub fn refresh_delay(&self, expires_at_ms: i64) -> Option<Duration> {
        self.inner
            .config
            .refresh_delay(self.inner.clock.now_ms(), expires_at_ms)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Rebuilds the session from persisted credentials.
    ///
    /// When both a token and an expiry are stored, the token is installed
    /// and a refresh is scheduled (unless expiry is already inside the
    /// lead window).
    pub fn initialize(&self) -> Result<SessionState, SessionError> {
        let stored = self.inner.store.load()?;
        {
            let mut data = self.lock();
            data.timer.cancel();
            data.generation += 1;
            data.access_token = stored.access_token().map(str::to_string);
            data.expires_at_ms = stored.expires_at_ms;
            if data.access_token.is_some() && data.expires_at_ms != 0 {
                self.schedule_refresh(&mut data);
            }
        }
        let state = self.state();
        info!(%state, "session initialized from storage");
        Ok(state)
    }

    /// Replaces the current token.
    ///
    /// Always cancels the pending refresh first. A non-empty token then
    /// gets exactly one new refresh timer, `refresh_lead` before
    /// `expires_at_ms`; if that moment has already passed no timer is
    /// scheduled. Passing `None` (or an empty string) clears the token.
    pub fn set_token(&self, token: Option<String>, expires_at_ms: i64) {
        let mut data = self.lock();
        self.apply_token(&mut data, token, expires_at_ms);
    }

    fn apply_token(&self, data: &mut SessionData, token: Option<String>, expires_at_ms: i64) {
        data.generation += 1;
        data.access_token = token.filter(|t| !t.is_empty());
        data.expires_at_ms = expires_at_ms;
        data.timer.cancel();
        if data.access_token.is_some() {
            self.schedule_refresh(data);
        }
    }

    /// Installs a grant from the login endpoint: persists it, then
    /// `set_token`.
    pub fn establish(&self, grant: &TokenGrant) -> Result<(), SessionError> {
        self.install(grant, None)?;
        info!(expires_in = grant.expires_in, "session established");
        Ok(())
    }

    /// Ends the session on the user's request. Clears memory, the timer
    /// and persisted credentials; no notice, no redirect.
    pub fn logout(&self) -> Result<(), SessionError> {
        self.clear_memory();
        self.inner.store.clear()?;
        info!("session logged out");
        Ok(())
    }

    /// Cancels the refresh timer. The token stays readable.
    pub fn shutdown(&self) {
        if self.lock().timer.cancel() {
            debug!("refresh timer cancelled on shutdown");
        }
    }

    // -----------------------------------------------------------------------
    // Refresh
    // -----------------------------------------------------------------------

    /// Exchanges the persisted refresh credential for a new token.
    ///
    /// Normally fired by the timer. On success the new access token, token
    /// type, refresh token and expiry are saved together and a new timer
    /// is scheduled. On ANY failure the session is terminated: memory and
    /// storage are cleared, the user is notified and sent to the login
    /// route. There is no retry.
    ///
    /// If the session changes while the request is in flight (a login, a
    /// logout, a new token) the outcome is discarded, the newer session
    /// is left as it is and [`SessionError::Superseded`] is returned.
    pub async fn refresh(&self) -> Result<(), SessionError> {
        let generation = {
            let mut data = self.lock();
            data.refreshing = true;
            data.generation
        };
        debug!(generation, "refreshing bearer token");

        let outcome = match self.request_grant().await {
            Ok(grant) => self.install(&grant, Some(generation)),
            Err(e) => Err(e),
        };
        self.lock().refreshing = false;

        match outcome {
            Ok(()) => {
                info!(expires_at_ms = self.expires_at_ms(), "bearer token refreshed");
                Ok(())
            }
            Err(e) if e != SessionError::Superseded && self.terminate(&e, generation) => Err(e),
            Err(_) => {
                info!("session changed during refresh; outcome discarded");
                Err(SessionError::Superseded)
            }
        }
    }

    async fn request_grant(&self) -> Result<TokenGrant, SessionError> {
        let inner = &self.inner;
        let stored = inner.store.load()?;
        let refresh_token = stored
            .refresh_token()
            .ok_or(SessionError::NoRefreshCredential)?
            .to_string();

        let body = inner.codec.encode(&RefreshRequest { refresh_token })?;
        let request = HttpRequest::new(Method::Post, inner.config.refresh_url())
            .header("Content-Type", inner.codec.content_type())
            .header("Accept", "application/json")
            .body(body);

        let response = inner.transport.execute(request).await?;
        if !response.is_success() {
            return Err(SessionError::RefreshRejected(format!(
                "refresh endpoint returned status {}",
                response.status
            )));
        }

        let envelope: Envelope<TokenGrant> = inner.codec.decode(&response.body)?;
        let message = envelope.message.clone();
        envelope.into_success().ok_or_else(|| {
            SessionError::RefreshRejected(
                message.unwrap_or_else(|| "refresh endpoint reported failure".to_string()),
            )
        })
    }

    /// Persists `grant` as one credential set, then installs the token.
    ///
    /// With `expected` set, nothing is written unless the session is
    /// still at that generation. The check, the save and the install
    /// happen under one lock.
    fn install(&self, grant: &TokenGrant, expected: Option<u64>) -> Result<(), SessionError> {
        if grant.access_token.is_empty() {
            return Err(ProtocolError::InvalidMessage(
                "token grant has an empty access token".to_string(),
            )
            .into());
        }
        let expires_at_ms = grant.expires_at_ms(self.inner.clock.now_ms());

        let mut data = self.lock();
        if expected.is_some_and(|g| g != data.generation) {
            return Err(SessionError::Superseded);
        }
        self.inner.store.save(&StoredCredentials {
            access_token: Some(grant.access_token.clone()),
            token_type: Some(grant.token_type.clone()),
            refresh_token: Some(grant.refresh_token.clone()),
            expires_at_ms,
        })?;
        self.apply_token(&mut data, Some(grant.access_token.clone()), expires_at_ms);
        Ok(())
    }

    /// Terminal failure path: forget everything, tell the user, go to login.
    ///
    /// Returns `false` without touching anything when the session has
    /// moved past `generation`.
    fn terminate(&self, error: &SessionError, generation: u64) -> bool {
        {
            let mut data = self.lock();
            if data.generation != generation {
                return false;
            }
            warn!(%error, "token refresh failed; ending session");
            Self::clear_data(&mut data);
            if let Err(e) = self.inner.store.clear() {
                warn!(error = %e, "could not clear persisted credentials");
            }
        }
        self.inner
            .notifier
            .error(&self.inner.config.refresh_failed_notice);
        self.inner.navigator.navigate(&self.inner.config.login_route);
        true
    }

    fn clear_memory(&self) {
        Self::clear_data(&mut self.lock());
    }

    fn clear_data(data: &mut SessionData) {
        data.generation += 1;
        data.access_token = None;
        data.expires_at_ms = 0;
        data.timer.cancel();
    }

    fn schedule_refresh(&self, data: &mut SessionData) {
        let now_ms = self.inner.clock.now_ms();
        let Some(delay) = self.inner.config.refresh_delay(now_ms, data.expires_at_ms) else {
            debug!(
                expires_at_ms = data.expires_at_ms,
                now_ms, "token expires inside the refresh lead window; no refresh scheduled"
            );
            return;
        };

        let weak: Weak<Inner<T>> = Arc::downgrade(&self.inner);
        data.timer.schedule(delay, async move {
            if let Some(inner) = weak.upgrade() {
                let manager = SessionManager { inner };
                // Failures are fully handled inside `refresh`.
                let _ = manager.refresh().await;
            }
        });
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for [`SessionManager`].
///
/// ```rust,ignore
/// let session = SessionManager::builder(HttpTransport::new()?)
///     .config(SessionConfig::with_api_url("https://portal.example.edu/api"))
///     .store(Arc::new(FileCredentialStore::new("creds.json")))
///     .notifier(Arc::new(my_toasts))
///     .navigator(Arc::new(my_router))
///     .build();
/// session.initialize()?;
/// ```
pub struct SessionManagerBuilder<T> {
    transport: T,
    config: SessionConfig,
    store: Option<Arc<dyn CredentialStore>>,
    notifier: Option<Arc<dyn Notifier>>,
    navigator: Option<Arc<dyn Navigator>>,
    clock: Option<Arc<dyn Clock>>,
}

impl<T: Transport> SessionManagerBuilder<T> {
    fn new(transport: T) -> Self {
        Self {
            transport,
            config: SessionConfig::default(),
            store: None,
            notifier: None,
            navigator: None,
            clock: None,
        }
    }

    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Builds the manager. Nothing is loaded until
    /// [`initialize`](SessionManager::initialize) is called.
    pub fn build(self) -> SessionManager<T> {
        SessionManager {
            inner: Arc::new(Inner {
                config: self.config,
                transport: self.transport,
                codec: JsonCodec,
                store: self
                    .store
                    .unwrap_or_else(|| Arc::new(MemoryCredentialStore::new())),
                notifier: self.notifier.unwrap_or_else(|| Arc::new(TracingNotifier)),
                navigator: self.navigator.unwrap_or_else(|| Arc::new(TracingNavigator)),
                clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
                data: Mutex::new(SessionData {
                    access_token: None,
                    expires_at_ms: 0,
                    refreshing: false,
                    generation: 0,
                    timer: TimerSlot::new("token-refresh"),
                }),
            }),
        }
    }
}
