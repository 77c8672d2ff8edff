//! Route guards.
//!
//! Pure decisions: given where the user wants to go and what we know about
//! them, either let them through or name the route to send them to. The
//! caller performs the actual navigation.

use crate::Role;

/// Route of the login page.
pub const LOGIN_ROUTE: &str = "/login";

/// Route shown when a role may not enter a page.
pub const FORBIDDEN_ROUTE: &str = "/403";

/// What a guard decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Proceed,
    Redirect(String),
}

impl GuardOutcome {
    fn redirect(path: &str) -> Self {
        Self::Redirect(path.to_string())
    }

    pub fn is_proceed(&self) -> bool {
        matches!(self, Self::Proceed)
    }

    /// Runs `next` only if this outcome lets the user through.
    pub fn and_then(self, next: impl FnOnce() -> GuardOutcome) -> GuardOutcome {
        match self {
            Self::Proceed => next(),
            redirect => redirect,
        }
    }
}

/// Signed-out users may only see the login page.
pub fn require_auth(path: &str, has_token: bool) -> GuardOutcome {
    if !has_token && path != LOGIN_ROUTE {
        GuardOutcome::redirect(LOGIN_ROUTE)
    } else {
        GuardOutcome::Proceed
    }
}

/// Keeps a signed-in user inside their role's area by sending them home
/// when they stray. Does nothing while signed out or before the role is
/// known.
pub fn role_home(role: Option<Role>, has_token: bool, path: &str) -> GuardOutcome {
    match role {
        Some(role) if has_token && !role.owns_path(path) => {
            GuardOutcome::redirect(role.home_path())
        }
        _ => GuardOutcome::Proceed,
    }
}

/// Only `allowed` roles may enter. An unknown role is never allowed.
pub fn require_role(role: Option<Role>, allowed: &[Role]) -> GuardOutcome {
    match role {
        Some(role) if allowed.contains(&role) => GuardOutcome::Proceed,
        _ => GuardOutcome::redirect(FORBIDDEN_ROUTE),
    }
}
