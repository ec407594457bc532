//! Two-step DID authentication protocol.
//!
//! ```text
//! REQUESTED -> CHALLENGE_ISSUED -> VERIFIED -> TOKEN_ISSUED
//!                               \-> REJECTED
//! ```
//!
//! The single-use challenge check always runs before signature verification,
//! so a replayed envelope fails even when its signature is valid. Nothing is
//! retried; every failure goes back to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::challenge_store::ChallengeStore;
use super::error::{AuthError, AuthErrorCode};
use super::signature::DidVerifier;
use super::token::TokenIssuer;

/// Token type reported with issued sessions.
pub const TOKEN_TYPE_BEARER: &str = "bearer";

/// Challenge handed to the client for signing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChallengeGrant {
    /// Random challenge string to be signed
    #[schema(example = "9f2c...e41a")]
    pub challenge: String,
    /// The DID requesting authentication
    pub did: String,
}

/// Verification request from the client.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifyRequest {
    /// The DID claiming authentication
    pub did: String,
    /// The challenge that was signed
    pub challenge: String,
    /// Compact signed envelope over the challenge
    pub signature: String,
}

/// Successful authentication.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthSession {
    pub access_token: String,
    #[schema(example = "bearer")]
    pub token_type: String,
    pub did: String,
    pub expires_at: DateTime<Utc>,
}

/// Information about the holder of a session token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionInfo {
    pub did: String,
    pub authenticated: bool,
    /// Expiry as seconds since the UNIX epoch
    pub expires_at: i64,
}

/// Sequences challenge store, verifier and token issuer.
#[derive(Debug)]
pub struct DidAuthService {
    challenges: ChallengeStore,
    verifier: DidVerifier,
    tokens: TokenIssuer,
}

impl DidAuthService {
    pub fn new(challenges: ChallengeStore, verifier: DidVerifier, tokens: TokenIssuer) -> Self {
        Self {
            challenges,
            verifier,
            tokens,
        }
    }

    /// Token issuer, for authorizing downstream requests.
    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Step 1: issue a challenge bound to `did`.
    pub async fn request_challenge(&self, did: &str) -> Result<ChallengeGrant, AuthError> {
        if !did.starts_with("did:") {
            return Err(AuthError::from_code(AuthErrorCode::InvalidDidFormat));
        }

        let challenge = self.challenges.create_challenge(did).await.map_err(|e| {
            tracing::error!(did = %did, error = %e, "failed to store challenge");
            AuthError::new(AuthErrorCode::InternalError, "Failed to generate challenge")
        })?;

        tracing::info!(did = %did, "challenge issued");
        Ok(ChallengeGrant {
            challenge,
            did: did.to_string(),
        })
    }

    /// Step 2: redeem the challenge, verify the envelope, mint a token.
    pub async fn verify_and_issue(&self, req: &VerifyRequest) -> Result<AuthSession, AuthError> {
        if !self.challenges.verify_challenge(&req.did, &req.challenge).await {
            tracing::warn!(did = %req.did, "authentication rejected: challenge invalid or expired");
            return Err(AuthError::from_code(
                AuthErrorCode::ChallengeInvalidOrExpired,
            ));
        }

        if !self
            .verifier
            .verify_did_authentication(&req.did, &req.challenge, &req.signature)
        {
            tracing::warn!(did = %req.did, "authentication rejected: signature verification failed");
            return Err(AuthError::from_code(
                AuthErrorCode::SignatureVerificationFailed,
            ));
        }

        let issued = self.tokens.issue(&req.did).map_err(|e| {
            tracing::error!(did = %req.did, error = %e, "failed to issue token");
            AuthError::from_code(AuthErrorCode::InternalError)
        })?;

        tracing::info!(did = %req.did, "authentication succeeded, token issued");
        Ok(AuthSession {
            access_token: issued.token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            did: req.did.clone(),
            expires_at: issued.claims.expires_at(),
        })
    }

    /// Describe the holder of `token`.
    pub fn session_info(&self, token: &str) -> Result<SessionInfo, AuthError> {
        let claims = self
            .tokens
            .verify(token)
            .ok_or_else(|| AuthError::from_code(AuthErrorCode::TokenInvalidOrExpired))?;

        Ok(SessionInfo {
            did: claims.did,
            authenticated: true,
            expires_at: claims.exp,
        })
    }
}
