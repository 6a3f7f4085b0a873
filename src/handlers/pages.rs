// handlers/pages.rs - Service info, health and the gated page stubs
//
// The web application renders the real pages; here each gated route answers
// with a small JSON document so redirects always land somewhere.

use axum::{
    extract::{Extension, OriginalUri},
    response::Json,
};
use serde_json::{json, Value};

use crate::access::AuthState;

/// GET / - service description
pub async fn root(auth: Option<Extension<AuthState>>) -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Portal API",
        "version": version,
        "auth": auth.map(|Extension(state)| state),
        "endpoints": {
            "home": "/ (gated, always served)",
            "dashboard": "/dashboard[/*] (gated, requires a session)",
            "auth": "/auth/* (gated, verified users are sent to /dashboard)",
            "data": "/api/data[/:id] (public)",
            "health": "/health (public)",
        }
    }))
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
    }))
}

/// GET /dashboard[/*] and /auth/* - page stub
pub async fn page(OriginalUri(uri): OriginalUri, auth: Option<Extension<AuthState>>) -> Json<Value> {
    Json(json!({
        "page": uri.path(),
        "auth": auth.map(|Extension(state)| state),
    }))
}
