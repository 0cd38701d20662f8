use std::collections::HashMap;

use axum::{
    extract::{Path, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::{require_admin, require_self_or_admin, AuthorizationClaims};
use crate::error::ApiError;
use crate::state::AppState;

/// Claims of the caller, if a valid token came with the request.
#[derive(Clone, Debug, Default)]
pub struct CurrentUser(pub Option<AuthorizationClaims>);

/// Verifies a bearer token when one is present and records the outcome as
/// [`CurrentUser`]. Never rejects; the `ensure_*` layers decide access.
pub async fn authenticate_jwt(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let claims = match extract_jwt_from_headers(request.headers()) {
        Some(token) => match state.tokens.verify(token) {
            Ok(claims) => Some(claims),
            Err(e) => {
                tracing::debug!("Ignoring bearer token: {}", e);
                None
            }
        },
        None => None,
    };

    request.extensions_mut().insert(CurrentUser(claims));
    next.run(request).await
}

/// Accepts `Bearer <token>` in either case; anything else counts as no token.
fn extract_jwt_from_headers(headers: &HeaderMap) -> Option<&str> {
    let auth_str = headers.get("authorization")?.to_str().ok()?;
    let token = auth_str
        .strip_prefix("Bearer ")
        .or_else(|| auth_str.strip_prefix("bearer "))?
        .trim();

    (!token.is_empty()).then_some(token)
}

fn current_claims(request: &Request) -> Option<&AuthorizationClaims> {
    request
        .extensions()
        .get::<CurrentUser>()
        .and_then(|current| current.0.as_ref())
}

pub async fn ensure_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    require_admin(current_claims(&request))?;
    Ok(next.run(request).await)
}

/// Compares against the `:username` segment of the matched route.
pub async fn ensure_self_or_admin(
    Path(params): Path<HashMap<String, String>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let username = params.get("username").map(String::as_str).unwrap_or_default();
    require_self_or_admin(current_claims(&request), username)?;
    Ok(next.run(request).await)
}
