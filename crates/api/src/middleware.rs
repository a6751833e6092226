use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use fixit_auth::{GuardChain, RoleGate};

use crate::app::errors::ApiError;
use crate::context::CurrentUser;

/// Per-route middleware state: the shared chain plus the route's gate.
#[derive(Clone)]
pub struct AuthState {
    pub guard: GuardChain,
    pub gate: RoleGate,
}

/// Run the guard chain and bind the resolved identity into the request.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(req.headers())?.to_owned();

    let identity = state.guard.admit(&token, state.gate).await?;

    req.extensions_mut().insert(CurrentUser::new(identity));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(ApiError::MissingToken)?;

    let header = header.to_str().map_err(|_| ApiError::MissingToken)?;

    let (scheme, token) = header.split_once(' ').ok_or(ApiError::MissingToken)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(ApiError::MissingToken);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(ApiError::MissingToken);
    }

    Ok(token)
}
