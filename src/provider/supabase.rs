use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;
use uuid::Uuid;

use super::{cookie, ProviderError, RequestCredentials, Session, SessionProvider};
use crate::config::AuthConfig;

const JWT_AUDIENCE: &str = "authenticated";

/// Access token claims we rely on
#[derive(Debug, Deserialize)]
struct Claims {
    sub: Uuid,
}

/// Response of `GET /auth/v1/user`
#[derive(Debug, Deserialize)]
struct AuthUser {
    id: Uuid,
}

#[derive(Debug, Deserialize)]
struct VerificationRow {
    #[serde(default)]
    is_verified: Option<bool>,
}

/// Session provider backed by a Supabase project
pub struct SupabaseProvider {
    client: reqwest::Client,
    base_url: Url,
    anon_key: String,
    jwt_secret: Option<String>,
    cookie_name: String,
    users_table: String,
}

impl SupabaseProvider {
    pub fn from_config(config: &AuthConfig) -> Result<Self, ProviderError> {
        let raw = config
            .supabase_url
            .as_deref()
            .ok_or_else(|| ProviderError::InvalidConfig("SUPABASE_URL is not set".to_string()))?;
        let base_url = Url::parse(raw)
            .map_err(|e| ProviderError::InvalidConfig(format!("invalid SUPABASE_URL '{}': {}", raw, e)))?;

        let cookie_name = match &config.cookie_name {
            Some(name) => name.clone(),
            None => default_cookie_name(&base_url)?,
        };

        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            anon_key: config.supabase_anon_key.clone(),
            jwt_secret: config.jwt_secret.clone(),
            cookie_name,
            users_table: config.users_table.clone(),
        })
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    fn endpoint(&self, path: &str) -> Result<Url, ProviderError> {
        self.base_url
            .join(path)
            .map_err(|e| ProviderError::InvalidConfig(format!("cannot build '{}': {}", path, e)))
    }

    fn access_token(&self, credentials: &RequestCredentials) -> Option<String> {
        credentials
            .bearer
            .clone()
            .or_else(|| cookie::session_token(credentials, &self.cookie_name))
    }

    /// Verify the token signature locally; an invalid or expired token is no session
    fn verify_locally(&self, secret: &str, token: &str) -> Option<Uuid> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[JWT_AUDIENCE]);

        match decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation) {
            Ok(data) => Some(data.claims.sub),
            Err(e) => {
                tracing::debug!("Rejected session token: {}", e);
                None
            }
        }
    }

    /// Ask the auth server who the token belongs to
    async fn verify_remotely(&self, token: &str) -> Result<Option<Uuid>, ProviderError> {
        let response = self
            .client
            .get(self.endpoint("auth/v1/user")?)
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status if !status.is_success() => Err(ProviderError::Upstream { status: status.as_u16() }),
            _ => Ok(Some(response.json::<AuthUser>().await?.id)),
        }
    }
}

#[async_trait]
impl SessionProvider for SupabaseProvider {
    fn name(&self) -> &'static str {
        "supabase"
    }

    async fn get_session(
        &self,
        credentials: &RequestCredentials,
    ) -> Result<Option<Session>, ProviderError> {
        let Some(token) = self.access_token(credentials) else {
            return Ok(None);
        };

        let user_id = match &self.jwt_secret {
            Some(secret) => self.verify_locally(secret, &token),
            None => self.verify_remotely(&token).await?,
        };

        Ok(user_id.map(|user_id| Session {
            user_id,
            access_token: token,
        }))
    }

    async fn get_verification_status(&self, session: &Session) -> Result<Option<bool>, ProviderError> {
        let url = self.endpoint(&format!("rest/v1/{}", self.users_table))?;
        let response = self
            .client
            .get(url)
            .query(&[
                ("select", "is_verified".to_string()),
                ("id", format!("eq.{}", session.user_id)),
            ])
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await?
            .error_for_status()?;

        let rows: Vec<VerificationRow> = response.json().await?;
        Ok(rows.into_iter().next().and_then(|row| row.is_verified))
    }
}

/// `sb-<project-ref>-auth-token`, where the project ref is the first host label
fn default_cookie_name(base_url: &Url) -> Result<String, ProviderError> {
    let host = base_url
        .host_str()
        .ok_or_else(|| ProviderError::InvalidConfig(format!("SUPABASE_URL has no host: {}", base_url)))?;
    let project_ref = host.split('.').next().unwrap_or(host);
    Ok(format!("sb-{}-auth-token", project_ref))
}
