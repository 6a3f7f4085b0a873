use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::access::{Action, AuthState};
use crate::provider::{resolve_auth_state, RequestCredentials};
use crate::server::AppState;

/// Page gate. Requests outside the route matcher pass straight through;
/// everything else is classified through the session provider and either
/// forwarded or redirected.
pub async fn access_guard_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if !state.matcher.matches(&path) {
        return next.run(request).await;
    }

    let credentials = RequestCredentials::from_headers(request.headers());
    let auth = resolve_auth_state(state.provider.as_ref(), &credentials, state.provider_timeout).await;
    let action = auth.decide(&path);

    request.extensions_mut().insert(auth);
    dispatch(action, auth, request, next).await
}

/// Carry out an access decision
async fn dispatch(action: Action, auth: AuthState, request: Request, next: Next) -> Response {
    match action {
        Action::Continue => next.run(request).await,
        Action::RedirectTo(target) => {
            tracing::debug!("Redirecting {:?} request for {} to {}", auth, request.uri().path(), target);
            Redirect::temporary(&target).into_response()
        }
    }
}
