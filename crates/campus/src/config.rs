//! Portal configuration.

use std::path::PathBuf;
use std::time::Duration;

use campus_session::SessionConfig;

use crate::CampusError;

/// Base URL of the portal API.
pub const ENV_API_URL: &str = "CAMPUS_API_URL";
/// Where credentials are persisted. Unset keeps them in memory.
pub const ENV_CREDENTIALS_PATH: &str = "CAMPUS_CREDENTIALS_PATH";
/// Seconds before expiry at which the token is refreshed.
pub const ENV_REFRESH_LEAD_SECS: &str = "CAMPUS_REFRESH_LEAD_SECS";

/// Everything needed to assemble a [`Portal`](crate::Portal).
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Session behavior; its `api_url` is the API base URL for every call.
    pub session: SessionConfig,

    /// JSON file for persisted credentials. `None` keeps them in memory.
    pub credentials_path: Option<PathBuf>,

    /// Rows per page for new list controllers.
    pub page_size: u32,

    /// Debounce window for new list controllers.
    pub list_debounce: Duration,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            credentials_path: None,
            page_size: 10,
            list_debounce: Duration::from_millis(500),
        }
    }
}

impl PortalConfig {
    /// Default settings against `api_url`.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            session: SessionConfig::with_api_url(api_url),
            ..Self::default()
        }
    }

    pub fn api_url(&self) -> &str {
        &self.session.api_url
    }

    /// Reads `CAMPUS_API_URL`, `CAMPUS_CREDENTIALS_PATH` and
    /// `CAMPUS_REFRESH_LEAD_SECS` from the process environment. Unset
    /// variables keep their defaults.
    pub fn from_env() -> Result<Self, CampusError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CampusError> {
        let mut config = match lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            Some(url) => Self::new(url.trim()),
            None => Self::default(),
        };

        if let Some(path) = lookup(ENV_CREDENTIALS_PATH).filter(|v| !v.is_empty()) {
            config.credentials_path = Some(PathBuf::from(path));
        }

        if let Some(raw) = lookup(ENV_REFRESH_LEAD_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                CampusError::Config(format!("{ENV_REFRESH_LEAD_SECS} must be whole seconds, got {raw:?}"))
            })?;
            config.session.refresh_lead = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_defaults_when_unset() {
        let config = PortalConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_url(), "http://localhost:8000/api");
        assert_eq!(config.credentials_path, None);
        assert_eq!(config.session.refresh_lead, Duration::from_secs(60));
    }

    #[test]
    fn test_from_lookup_reads_all_variables() {
        let config = PortalConfig::from_lookup(lookup(&[
            ("CAMPUS_API_URL", "https://portal.example.edu/api/"),
            ("CAMPUS_CREDENTIALS_PATH", "/tmp/campus/creds.json"),
            ("CAMPUS_REFRESH_LEAD_SECS", "30"),
        ]))
        .unwrap();

        assert_eq!(config.api_url(), "https://portal.example.edu/api");
        assert_eq!(
            config.session.refresh_url(),
            "https://portal.example.edu/api/refresh"
        );
        assert_eq!(
            config.credentials_path,
            Some(PathBuf::from("/tmp/campus/creds.json"))
        );
        assert_eq!(config.session.refresh_lead, Duration::from_secs(30));
    }

    #[test]
    fn test_from_lookup_rejects_bad_lead() {
        let err = PortalConfig::from_lookup(lookup(&[("CAMPUS_REFRESH_LEAD_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, CampusError::Config(_)));
    }
}
