//! # Campus
//!
//! Client core for a role-based academic administration portal.
//!
//! Campus keeps a bearer-token session alive against the portal API,
//! performs authenticated calls with uniform error reporting, and drives
//! paginated, filterable listings. The UI stays outside: it plugs in
//! through the [`Notifier`], [`Navigator`] and [`LoadingIndicator`]
//! traits and reads state back from the controllers.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use campus::prelude::*;
//!
//! # async fn run() -> Result<(), CampusError> {
//! let portal = Portal::builder(PortalConfig::from_env()?).build()?;
//! portal.bootstrap().await?;
//!
//! let majors = portal.list(portal.list_options("/majors"));
//! majors.set_filter("search", "physics");
//! # Ok(())
//! # }
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod config;
mod error;
pub mod guards;
mod portal;
mod roles;
mod user;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use config::{ENV_API_URL, ENV_CREDENTIALS_PATH, ENV_REFRESH_LEAD_SECS, PortalConfig};
pub use error::CampusError;
pub use guards::GuardOutcome;
pub use portal::{Portal, PortalBuilder};
pub use roles::{MenuItem, Role, UnknownRole};
pub use user::{ME_PATH, MeInfo, MeResponse, MeRole, USER_FETCH_FAILED_NOTICE, UserProfile, UserStore};

pub use campus_client::{ApiClient, ClientError, RequestOptions};
pub use campus_list::{ListController, ListError, ListOptions, ListState, RecordId};
pub use campus_protocol::{Envelope, Filters, ParamValue, ProtocolError, TokenGrant};
pub use campus_session::{
    CredentialStore, FileCredentialStore, LoadingIndicator, MemoryCredentialStore, Navigator,
    NoticeLevel, Notifier, SessionConfig, SessionError, SessionManager, SessionState,
};
pub use campus_transport::{HttpTransport, Transport, TransportError};

/// Installs a `tracing` subscriber filtered by `RUST_LOG` (default
/// `info`). Does nothing if one is already installed.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Common imports for applications built on campus.
pub mod prelude {
    pub use crate::{
        ApiClient, CampusError, Filters, GuardOutcome, ListController, ListOptions, ListState,
        MenuItem, Navigator, Notifier, ParamValue, Portal, PortalBuilder, PortalConfig,
        RequestOptions, Role, SessionState, TokenGrant, UserProfile,
    };
    pub use std::sync::Arc;
}
