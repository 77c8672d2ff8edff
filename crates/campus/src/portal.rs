//! `Portal` builder and composition root.
//!
//! The portal owns one of each long-lived service (session, API client,
//! user store) and wires them to the application's effect sinks. Views
//! get list controllers and route decisions from it.

use std::sync::Arc;

use campus_client::ApiClient;
use campus_list::{ListController, ListOptions};
use campus_protocol::TokenGrant;
use campus_session::{
    CredentialStore, FileCredentialStore, LoadingIndicator, MemoryCredentialStore, Navigator,
    NoLoadingIndicator, Notifier, SessionManager, SessionState, TracingNavigator, TracingNotifier,
};
use campus_transport::{HttpTransport, Transport};
use tracing::{debug, info, warn};

use crate::guards::{self, GuardOutcome};
use crate::{CampusError, MenuItem, PortalConfig, Role, UserProfile, UserStore};

/// Builder for [`Portal`].
///
/// # Example
///
/// ```rust,ignore
/// use campus::prelude::*;
///
/// let portal = Portal::builder(PortalConfig::from_env()?)
///     .notifier(Arc::new(MyToasts))
///     .navigator(Arc::new(MyRouter))
///     .build()?;
/// portal.bootstrap().await?;
/// ```
pub struct PortalBuilder {
    config: PortalConfig,
    store: Option<Arc<dyn CredentialStore>>,
    notifier: Option<Arc<dyn Notifier>>,
    navigator: Option<Arc<dyn Navigator>>,
    loading: Option<Arc<dyn LoadingIndicator>>,
}

impl PortalBuilder {
    pub fn new(config: PortalConfig) -> Self {
        Self {
            config,
            store: None,
            notifier: None,
            navigator: None,
            loading: None,
        }
    }

    /// Overrides where credentials are persisted. Without this a file
    /// store is used when `credentials_path` is set, memory otherwise.
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

    pub fn loading_indicator(mut self, loading: Arc<dyn LoadingIndicator>) -> Self {
        self.loading = Some(loading);
        self
    }

    /// Builds the portal over a `reqwest` transport.
    pub fn build(self) -> Result<Portal<Arc<HttpTransport>>, CampusError> {
        let transport = Arc::new(HttpTransport::new()?);
        Ok(self.build_with(transport))
    }

    /// Builds the portal over any transport. The session and the API
    /// client each get a clone of it.
    pub fn build_with<T: Transport + Clone>(self, transport: T) -> Portal<T> {
        let store: Arc<dyn CredentialStore> = match (self.store, &self.config.credentials_path) {
            (Some(store), _) => store,
            (None, Some(path)) => Arc::new(FileCredentialStore::new(path.clone())),
            (None, None) => Arc::new(MemoryCredentialStore::new()),
        };
        let notifier = self.notifier.unwrap_or_else(|| Arc::new(TracingNotifier));
        let navigator = self.navigator.unwrap_or_else(|| Arc::new(TracingNavigator));
        let loading = self.loading.unwrap_or_else(|| Arc::new(NoLoadingIndicator));

        let session = SessionManager::builder(transport.clone())
            .config(self.config.session.clone())
            .store(store)
            .notifier(Arc::clone(&notifier))
            .navigator(Arc::clone(&navigator))
            .build();
        let api = ApiClient::builder(self.config.api_url(), transport, session.clone())
            .notifier(notifier)
            .loading_indicator(loading)
            .build();

        debug!(api_url = %self.config.api_url(), "portal assembled");

        Portal {
            config: self.config,
            users: UserStore::new(api.clone()),
            session,
            api,
            navigator,
        }
    }
}

/// The assembled client core.
pub struct Portal<T: Transport> {
    config: PortalConfig,
    session: SessionManager<T>,
    api: ApiClient<T>,
    users: UserStore<T>,
    navigator: Arc<dyn Navigator>,
}

impl Portal<Arc<HttpTransport>> {
    pub fn builder(config: PortalConfig) -> PortalBuilder {
        PortalBuilder::new(config)
    }
}

impl<T: Transport> Portal<T> {
    // -----------------------------------------------------------------------
    // Session lifecycle
    // -----------------------------------------------------------------------

    /// Restores the persisted session and, when it carries a token, loads
    /// the user profile if none is loaded yet.
    pub async fn bootstrap(&self) -> Result<SessionState, CampusError> {
        let state = self.session.initialize()?;
        if self.session.token().is_some() && !self.users.is_loaded() {
            self.users.fetch().await;
        }
        info!(%state, user_loaded = self.users.is_loaded(), "portal bootstrapped");
        Ok(state)
    }

    /// Installs a grant from the login endpoint and loads the profile.
    /// Returns the profile when `/me` answered with one.
    pub async fn sign_in(&self, grant: &TokenGrant) -> Result<Option<UserProfile>, CampusError> {
        self.session.establish(grant)?;
        let profile = self.users.fetch().await;
        if let Some(profile) = &profile {
            info!(user_id = profile.id, role = %profile.role_name, "signed in");
        }
        Ok(profile)
    }

    /// Ends the session, forgets the user and goes to the login page.
    ///
    /// The user is sent to login even if clearing stored credentials
    /// failed; that failure is still returned.
    pub fn sign_out(&self) -> Result<(), CampusError> {
        let result = self.session.logout();
        self.users.clear();
        self.navigator.navigate(&self.session.config().login_route);
        if let Err(e) = &result {
            warn!(error = %e, "stored credentials could not be cleared on sign out");
        }
        result.map_err(CampusError::from)
    }

    /// Stops background work. The session token stays readable.
    pub fn shutdown(&self) {
        self.session.shutdown();
        info!("portal shut down");
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    /// List options for `endpoint` carrying this portal's list defaults.
    pub fn list_options(&self, endpoint: impl Into<String>) -> ListOptions {
        ListOptions::new(endpoint)
            .page_size(self.config.page_size)
            .debounce(self.config.list_debounce)
    }

    /// A list controller sharing this portal's API client.
    pub fn list(&self, options: ListOptions) -> ListController<T> {
        ListController::new(self.api.clone(), options)
    }

    /// Sidebar of the signed-in user. Empty while the role is unknown.
    pub fn navigation(&self) -> &'static [MenuItem] {
        self.users.role().map(|r| r.navigation()).unwrap_or(&[])
    }

    /// Where a visit to `path` should end up, given the session and the
    /// signed-in user's role.
    pub fn guard(&self, path: &str) -> GuardOutcome {
        let has_token = self.session.token().is_some();
        guards::require_auth(path, has_token)
            .and_then(|| guards::role_home(self.users.role(), has_token, path))
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionManager<T> {
        &self.session
    }

    pub fn api(&self) -> &ApiClient<T> {
        &self.api
    }

    pub fn users(&self) -> &UserStore<T> {
        &self.users
    }

    pub fn role(&self) -> Option<Role> {
        self.users.role()
    }
}
