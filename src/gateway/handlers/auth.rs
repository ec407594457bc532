//! DID authentication handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, header},
};
use serde::Deserialize;
use utoipa::IntoParams;

use super::super::state::AppState;
use crate::did_auth::middleware::extract_bearer;
use crate::did_auth::{
    AuthError, AuthErrorCode, AuthSession, ChallengeGrant, ErrorBody, SessionInfo, VerifyRequest,
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ChallengeQuery {
    /// The DID requesting authentication
    pub did: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SessionQuery {
    /// Access token (alternatively sent as `Authorization: Bearer`)
    pub token: Option<String>,
}

/// Issue a one-time challenge for a DID
///
/// The client signs the challenge with the DID's key and submits it to
/// `/auth/verify` within the challenge window.
#[utoipa::path(
    get,
    path = "/auth/challenge",
    params(ChallengeQuery),
    responses(
        (status = 200, description = "Challenge issued", body = ChallengeGrant),
        (status = 400, description = "Invalid DID format", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "Authentication"
)]
pub async fn get_challenge(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ChallengeQuery>,
) -> Result<Json<ChallengeGrant>, AuthError> {
    let did = query
        .did
        .ok_or_else(|| AuthError::from_code(AuthErrorCode::InvalidDidFormat))?;
    state.auth.request_challenge(&did).await.map(Json)
}

/// Verify a signed challenge and issue an access token
#[utoipa::path(
    post,
    path = "/auth/verify",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Authenticated", body = AuthSession),
        (status = 401, description = "Challenge invalid or signature rejected", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "Authentication"
)]
pub async fn verify(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<AuthSession>, AuthError> {
    state.auth.verify_and_issue(&req).await.map(Json)
}

/// Describe the holder of an access token
#[utoipa::path(
    get,
    path = "/auth/me",
    params(SessionQuery),
    responses(
        (status = 200, description = "Token holder", body = SessionInfo),
        (status = 401, description = "Invalid or expired token", body = ErrorBody)
    ),
    tag = "Authentication"
)]
pub async fn me(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
    headers: HeaderMap,
) -> Result<Json<SessionInfo>, AuthError> {
    let token = match query.token {
        Some(token) => token,
        None => headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(extract_bearer)
            .map(str::to_string)
            .ok_or_else(|| AuthError::from_code(AuthErrorCode::TokenInvalidOrExpired))?,
    };
    state.auth.session_info(&token).map(Json)
}
