//! Bearer-token guard for routes that need an authenticated DID.

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::error::{AuthError, AuthErrorCode};
use super::service::DidAuthService;

/// DID of the token holder, inserted by [`bearer_auth_middleware`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedDid(pub String);

/// Pull the token out of `Authorization: Bearer <token>`.
pub fn extract_bearer(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

pub async fn bearer_auth_middleware(
    State(auth): State<Arc<DidAuthService>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer)
        .ok_or_else(|| {
            AuthError::new(
                AuthErrorCode::TokenInvalidOrExpired,
                "Missing or malformed Authorization header",
            )
        })?;

    let did = auth
        .tokens()
        .extract_did(token)
        .ok_or_else(|| AuthError::from_code(AuthErrorCode::TokenInvalidOrExpired))?;

    request.extensions_mut().insert(AuthenticatedDid(did));
    Ok(next.run(request).await)
}
