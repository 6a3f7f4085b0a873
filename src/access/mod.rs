// access/mod.rs - Route access decisions for the page surface
//
// Every page request that matches the route matcher is classified from the
// session provider's answer and mapped to exactly one Action. Nothing in this
// module suspends or keeps state between requests.

pub mod matcher;

pub use matcher::{MatcherError, RouteMatcher, RoutePattern};

use serde::Serialize;

/// Where anonymous visitors of protected pages are sent
pub const LOGIN_PATH: &str = "/auth/login";

/// Where signed-in users without a verified email are sent
pub const VERIFY_EMAIL_PATH: &str = "/auth/verify-email";

/// Where verified users visiting auth pages are sent
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Outcome of an access decision for a single request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "target", rename_all = "snake_case")]
pub enum Action {
    /// Serve the request unchanged
    Continue,
    /// Send the client elsewhere
    RedirectTo(String),
}

impl Action {
    fn redirect(target: &str) -> Self {
        Action::RedirectTo(target.to_string())
    }

    pub fn is_continue(&self) -> bool {
        matches!(self, Action::Continue)
    }

    pub fn target(&self) -> Option<&str> {
        match self {
            Action::Continue => None,
            Action::RedirectTo(target) => Some(target),
        }
    }
}

/// Authentication state of a request as seen by the decision engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    Anonymous,
    Unverified,
    Verified,
}

impl AuthState {
    /// Classify a provider answer. Unknown verification counts as unverified.
    pub fn from_flags(has_session: bool, is_verified: Option<bool>) -> Self {
        match (has_session, is_verified) {
            (false, _) => AuthState::Anonymous,
            (true, Some(true)) => AuthState::Verified,
            (true, _) => AuthState::Unverified,
        }
    }

    pub fn has_session(&self) -> bool {
        !matches!(self, AuthState::Anonymous)
    }

    pub fn decide(&self, path: &str) -> Action {
        match self {
            AuthState::Unverified
                if !path.starts_with("/auth/verify") && path != "/" =>
            {
                Action::redirect(VERIFY_EMAIL_PATH)
            }
            AuthState::Verified if path.starts_with("/auth") => Action::redirect(DASHBOARD_PATH),
            AuthState::Anonymous if path.starts_with("/dashboard") => Action::redirect(LOGIN_PATH),
            _ => Action::Continue,
        }
    }
}

/// Decide what to do with a request for `path`.
///
/// Rules are checked in order and the first match wins:
/// 1. signed in, not verified, outside `/auth/verify*` and not `/` → verify email
/// 2. signed in and verified, under `/auth` → dashboard
/// 3. anonymous, under `/dashboard` → login
/// 4. anything else continues
pub fn decide(has_session: bool, is_verified: Option<bool>, path: &str) -> Action {
    AuthState::from_flags(has_session, is_verified).decide(path)
}
