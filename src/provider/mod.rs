// provider/mod.rs - Session lookups against the external identity provider
//
// The access middleware asks a SessionProvider two questions per request: is
// there a session, and is its user verified. Any failure or timeout while
// answering them classifies the request as anonymous.

pub mod cookie;
pub mod supabase;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use thiserror::Error;
use tokio::time::timeout;
use uuid::Uuid;

use crate::access::AuthState;
use crate::config::AuthConfig;

pub use supabase::SupabaseProvider;

/// Errors raised while talking to the identity provider
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),

    #[error("identity provider returned HTTP {status}")]
    Upstream { status: u16 },

    #[error("invalid identity provider response: {0}")]
    InvalidResponse(String),

    #[error("identity provider did not answer within {0:?}")]
    Timeout(Duration),

    #[error("invalid identity provider configuration: {0}")]
    InvalidConfig(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            ProviderError::Upstream { status: status.as_u16() }
        } else {
            ProviderError::Unavailable(err.to_string())
        }
    }
}

/// A resolved session. Only lives for the request it was resolved from.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
    pub access_token: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Credentials carried by a single request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestCredentials {
    pub cookies: Vec<(String, String)>,
    pub bearer: Option<String>,
}

impl RequestCredentials {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let cookies = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(cookie::parse_cookie_header)
            .collect();

        let bearer = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        Self { cookies, bearer }
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty() && self.bearer.is_none()
    }
}

/// Source of session and verification answers
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &'static str;

    /// Resolve the session carried by the request, if any
    async fn get_session(
        &self,
        credentials: &RequestCredentials,
    ) -> Result<Option<Session>, ProviderError>;

    /// Look up the verification flag of the session's user
    async fn get_verification_status(&self, session: &Session) -> Result<Option<bool>, ProviderError>;
}

/// Provider used when no identity provider is configured; nobody is signed in
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledProvider;

#[async_trait]
impl SessionProvider for DisabledProvider {
    fn name(&self) -> &'static str {
        "disabled"
    }

    async fn get_session(
        &self,
        _credentials: &RequestCredentials,
    ) -> Result<Option<Session>, ProviderError> {
        Ok(None)
    }

    async fn get_verification_status(&self, _session: &Session) -> Result<Option<bool>, ProviderError> {
        Ok(None)
    }
}

/// Build the provider described by the auth configuration
pub fn from_config(config: &AuthConfig) -> Result<Arc<dyn SessionProvider>, ProviderError> {
    if config.supabase_url.is_none() {
        tracing::warn!("SUPABASE_URL not set; every page request will be treated as anonymous");
        return Ok(Arc::new(DisabledProvider));
    }
    Ok(Arc::new(SupabaseProvider::from_config(config)?))
}

/// Resolve the authentication state of a request.
///
/// Both lookups share one `limit`. Errors and timeouts are logged and the
/// request is classified as [`AuthState::Anonymous`].
pub async fn resolve_auth_state(
    provider: &dyn SessionProvider,
    credentials: &RequestCredentials,
    limit: Duration,
) -> AuthState {
    let outcome = match timeout(limit, lookup(provider, credentials)).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::Timeout(limit)),
    };

    match outcome {
        Ok(state) => state,
        Err(e) => {
            tracing::warn!("Session lookup via {} failed, treating request as anonymous: {}", provider.name(), e);
            AuthState::Anonymous
        }
    }
}

async fn lookup(
    provider: &dyn SessionProvider,
    credentials: &RequestCredentials,
) -> Result<AuthState, ProviderError> {
    let Some(session) = provider.get_session(credentials).await? else {
        return Ok(AuthState::Anonymous);
    };
    let verified = provider.get_verification_status(&session).await?;
    tracing::debug!("Resolved session for user {} (verified: {:?})", session.user_id, verified);
    Ok(AuthState::from_flags(true, verified))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    enum Script {
        Anonymous,
        Session(Option<bool>),
        SessionFails,
        VerificationFails,
        Hangs,
    }

    struct ScriptedProvider(Script);

    fn session() -> Session {
        Session {
            user_id: Uuid::nil(),
            access_token: "token".to_string(),
        }
    }

    #[async_trait]
    impl SessionProvider for ScriptedProvider {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn get_session(
            &self,
            _credentials: &RequestCredentials,
        ) -> Result<Option<Session>, ProviderError> {
            match self.0 {
                Script::Anonymous => Ok(None),
                Script::SessionFails => Err(ProviderError::Unavailable("connection refused".into())),
                Script::Hangs => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(Some(session()))
                }
                _ => Ok(Some(session())),
            }
        }

        async fn get_verification_status(&self, _session: &Session) -> Result<Option<bool>, ProviderError> {
            match self.0 {
                Script::Session(verified) => Ok(verified),
                Script::VerificationFails => Err(ProviderError::Upstream { status: 500 }),
                _ => Ok(Some(true)),
            }
        }
    }

    async fn resolve(script: Script) -> AuthState {
        resolve_auth_state(
            &ScriptedProvider(script),
            &RequestCredentials::default(),
            Duration::from_millis(100),
        )
        .await
    }

    #[tokio::test]
    async fn classifies_provider_answers() {
        assert_eq!(resolve(Script::Anonymous).await, AuthState::Anonymous);
        assert_eq!(resolve(Script::Session(Some(true))).await, AuthState::Verified);
        assert_eq!(resolve(Script::Session(Some(false))).await, AuthState::Unverified);
        assert_eq!(resolve(Script::Session(None)).await, AuthState::Unverified);
    }

    #[tokio::test]
    async fn failures_fall_back_to_anonymous() {
        assert_eq!(resolve(Script::SessionFails).await, AuthState::Anonymous);
        assert_eq!(resolve(Script::VerificationFails).await, AuthState::Anonymous);
    }

    #[tokio::test]
    async fn timeout_falls_back_to_anonymous() {
        assert_eq!(resolve(Script::Hangs).await, AuthState::Anonymous);
    }

    #[tokio::test]
    async fn disabled_provider_is_anonymous() {
        let state = resolve_auth_state(
            &DisabledProvider,
            &RequestCredentials::default(),
            Duration::from_millis(100),
        )
        .await;
        assert_eq!(state, AuthState::Anonymous);
    }

    #[test]
    fn credentials_from_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("a=1; b=2"));
        headers.append(header::COOKIE, HeaderValue::from_static("c=3"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));

        let creds = RequestCredentials::from_headers(&headers);
        assert_eq!(creds.cookie("a"), Some("1"));
        assert_eq!(creds.cookie("c"), Some("3"));
        assert_eq!(creds.cookie("z"), None);
        assert_eq!(creds.bearer.as_deref(), Some("abc.def.ghi"));
        assert!(!creds.is_empty());

        assert!(RequestCredentials::from_headers(&HeaderMap::new()).is_empty());
    }

    #[test]
    fn session_debug_redacts_token() {
        let rendered = format!("{:?}", session());
        assert!(!rendered.contains("token\""));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn unconfigured_auth_builds_disabled_provider() {
        let config = crate::config::AppConfig::development();
        let provider = from_config(&config.auth).unwrap();
        assert_eq!(provider.name(), "disabled");
    }
}
