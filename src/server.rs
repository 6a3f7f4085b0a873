// server.rs - Router assembly and shared request state

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::FromRef,
    http::HeaderValue,
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::access::RouteMatcher;
use crate::config::AppConfig;
use crate::handlers;
use crate::provider::{self, SessionProvider};
use crate::store::RecordStore;

/// State shared by every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub store: RecordStore,
    pub provider: Arc<dyn SessionProvider>,
    pub matcher: Arc<RouteMatcher>,
    pub provider_timeout: Duration,
}

impl AppState {
    pub fn new(
        store: RecordStore,
        provider: Arc<dyn SessionProvider>,
        matcher: RouteMatcher,
        provider_timeout: Duration,
    ) -> Self {
        Self {
            store,
            provider,
            matcher: Arc::new(matcher),
            provider_timeout,
        }
    }

    /// Wire up store, provider and matcher from configuration
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let store = if config.store.seed {
            RecordStore::seeded(config.store.id_strategy)
        } else {
            RecordStore::new(config.store.id_strategy)
        };

        Ok(Self::new(
            store,
            provider::from_config(&config.auth)?,
            config.route_matcher()?,
            Duration::from_millis(config.auth.provider_timeout_ms),
        ))
    }
}

impl FromRef<AppState> for RecordStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

/// Full application router with the global layers applied
pub fn app(state: AppState, config: &AppConfig) -> anyhow::Result<Router> {
    let mut router = Router::new()
        .route("/health", get(handlers::health))
        .merge(page_routes())
        .merge(data_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::access_guard_middleware,
        ))
        .with_state(state);

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security.cors_origins));
    }
    if config.security.enable_csp {
        let origin = config.auth.supabase_origin();
        router = router.layer(crate::middleware::csp_layer(origin.as_deref())?);
    }

    Ok(router.layer(TraceLayer::new_for_http()))
}

fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::root))
        .route("/dashboard", get(handlers::page))
        .route("/dashboard/", get(handlers::page))
        .route("/dashboard/*rest", get(handlers::page))
        .route("/auth", get(handlers::page))
        .route("/auth/", get(handlers::page))
        .route("/auth/*rest", get(handlers::page))
}

fn data_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/data",
            get(handlers::data_list).post(handlers::data_create),
        )
        .route(
            "/api/data/:id",
            get(handlers::data_get)
                .put(handlers::data_update)
                .delete(handlers::data_delete),
        )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}
