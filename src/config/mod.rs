use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use thiserror::Error;

use crate::access::{MatcherError, RouteMatcher};
use crate::access::matcher::DEFAULT_PATTERNS;
use crate::store::IdStrategy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid access matcher: {0}")]
    Matcher(#[from] MatcherError),

    #[error("unknown id strategy '{0}' (expected 'sequential' or 'monotonic')")]
    IdStrategy(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub access: AccessConfig,
    pub store: StoreConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Supabase project URL; the session provider is disabled when unset
    pub supabase_url: Option<String>,
    pub supabase_anon_key: String,
    /// Enables local JWT verification instead of asking the auth server
    pub jwt_secret: Option<String>,
    /// Overrides the `sb-<project-ref>-auth-token` cookie name
    pub cookie_name: Option<String>,
    pub users_table: String,
    pub provider_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    pub matcher: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub id_strategy: IdStrategy,
    pub seed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub enable_csp: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("PORTAL_API_HOST") {
            self.server.host = v;
        }
        if let Some(port) = env::var("PORTAL_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }

        // Auth overrides
        if let Ok(v) = env::var("SUPABASE_URL").or_else(|_| env::var("NEXT_PUBLIC_SUPABASE_URL")) {
            self.auth.supabase_url = non_empty(v);
        }
        if let Ok(v) = env::var("SUPABASE_ANON_KEY").or_else(|_| env::var("NEXT_PUBLIC_SUPABASE_ANON_KEY")) {
            self.auth.supabase_anon_key = v;
        }
        if let Ok(v) = env::var("SUPABASE_JWT_SECRET") {
            self.auth.jwt_secret = non_empty(v);
        }
        if let Ok(v) = env::var("AUTH_COOKIE_NAME") {
            self.auth.cookie_name = non_empty(v);
        }
        if let Ok(v) = env::var("AUTH_USERS_TABLE") {
            self.auth.users_table = v;
        }
        if let Ok(v) = env::var("AUTH_PROVIDER_TIMEOUT_MS") {
            self.auth.provider_timeout_ms = v.parse().unwrap_or(self.auth.provider_timeout_ms);
        }

        // Access overrides
        if let Ok(v) = env::var("ACCESS_MATCHER") {
            self.access.matcher = split_list(&v);
        }

        // Store overrides
        if let Ok(v) = env::var("STORE_ID_STRATEGY") {
            match v.parse() {
                Ok(strategy) => self.store.id_strategy = strategy,
                Err(e) => tracing::warn!("Ignoring STORE_ID_STRATEGY: {}", e),
            }
        }
        if let Ok(v) = env::var("STORE_SEED") {
            self.store.seed = v.parse().unwrap_or(self.store.seed);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = split_list(&v);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CSP") {
            self.security.enable_csp = v.parse().unwrap_or(self.security.enable_csp);
        }

        self
    }

    /// Build the route matcher from the configured patterns
    pub fn route_matcher(&self) -> Result<RouteMatcher, ConfigError> {
        Ok(RouteMatcher::parse(&self.access.matcher)?)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            auth: AuthConfig::unconfigured(3000),
            access: AccessConfig::default(),
            store: StoreConfig {
                id_strategy: IdStrategy::Sequential,
                seed: true,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                enable_csp: true,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            auth: AuthConfig::unconfigured(2000),
            access: AccessConfig::default(),
            store: StoreConfig {
                id_strategy: IdStrategy::Monotonic,
                seed: true,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                enable_csp: true,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            auth: AuthConfig::unconfigured(1500),
            access: AccessConfig::default(),
            store: StoreConfig {
                id_strategy: IdStrategy::Monotonic,
                seed: false,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                enable_csp: true,
            },
        }
    }
}

impl AuthConfig {
    fn unconfigured(provider_timeout_ms: u64) -> Self {
        Self {
            supabase_url: None,
            supabase_anon_key: String::new(),
            jwt_secret: None,
            cookie_name: None,
            users_table: "users".to_string(),
            provider_timeout_ms,
        }
    }

    /// Host of the configured Supabase project, used by the CSP header
    pub fn supabase_origin(&self) -> Option<String> {
        let parsed = url::Url::parse(self.supabase_url.as_deref()?).ok()?;
        let host = parsed.host_str()?;
        Some(match parsed.port() {
            Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
            None => format!("{}://{}", parsed.scheme(), host),
        })
    }
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            matcher: DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl FromStr for IdStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" | "count" => Ok(IdStrategy::Sequential),
            "monotonic" => Ok(IdStrategy::Monotonic),
            other => Err(ConfigError::IdStrategy(other.to_string())),
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.store.id_strategy, IdStrategy::Sequential);
        assert!(config.store.seed);
        assert!(config.auth.supabase_url.is_none());
        assert_eq!(config.auth.users_table, "users");
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.store.id_strategy, IdStrategy::Monotonic);
        assert!(!config.store.seed);
        assert!(config.auth.provider_timeout_ms < AppConfig::development().auth.provider_timeout_ms);
    }

    #[test]
    fn test_default_matcher_parses() {
        let matcher = AppConfig::development().route_matcher().unwrap();
        assert!(matcher.matches("/"));
        assert!(matcher.matches("/dashboard/x"));
        assert!(!matcher.matches("/api/data"));
    }

    #[test]
    fn test_bad_matcher_is_an_error() {
        let mut config = AppConfig::development();
        config.access.matcher = vec!["dashboard".to_string()];
        assert!(matches!(config.route_matcher(), Err(ConfigError::Matcher(_))));
    }

    #[test]
    fn test_id_strategy_parsing() {
        assert_eq!("sequential".parse::<IdStrategy>().unwrap(), IdStrategy::Sequential);
        assert_eq!("Monotonic".parse::<IdStrategy>().unwrap(), IdStrategy::Monotonic);
        assert!("uuid".parse::<IdStrategy>().is_err());
    }

    #[test]
    fn test_supabase_origin() {
        let mut auth = AuthConfig::unconfigured(100);
        assert_eq!(auth.supabase_origin(), None);

        auth.supabase_url = Some("https://plrkrorlqralicbsangu.supabase.co/".to_string());
        assert_eq!(auth.supabase_origin().as_deref(), Some("https://plrkrorlqralicbsangu.supabase.co"));

        auth.supabase_url = Some("http://127.0.0.1:54321".to_string());
        assert_eq!(auth.supabase_origin().as_deref(), Some("http://127.0.0.1:54321"));
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(" /, /auth/:path* ,,"), vec!["/", "/auth/:path*"]);
    }
}
