//! Bearer session tokens (HS256 JWT).
//!
//! The signing secret is handed in once at construction and never changes.
//! Verification pins HS256 and checks expiry against the injected clock, so
//! a token is valid strictly before `exp`.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use super::clock::Clock;

/// Kind marker carried in every session token.
pub const ACCESS_TOKEN_KIND: &str = "access_token";

/// Minimum accepted secret length in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Default session lifetime.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::hours(24);

/// Session token claims.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // Subject (authenticated DID)
    pub did: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Claims {
    /// Expiry as a UTC timestamp.
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Token issuer failures.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token secret must be at least 32 bytes")]
    WeakSecret,
    #[error("token ttl must be positive")]
    InvalidTtl,
    #[error("failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// A freshly minted token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// Mints and validates session tokens.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], ttl: Duration, clock: Arc<dyn Clock>) -> Result<Self, TokenError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(TokenError::WeakSecret);
        }
        if ttl <= Duration::zero() {
            return Err(TokenError::InvalidTtl);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against our clock below.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
            clock,
        })
    }

    /// Session lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mint a token for `did` valid for the configured lifetime.
    pub fn issue(&self, did: &str) -> Result<IssuedToken, TokenError> {
        let now = self.clock.now();
        let claims = Claims {
            sub: did.to_string(),
            did: did.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            kind: ACCESS_TOKEN_KIND.to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(IssuedToken { token, claims })
    }

    /// Decode and validate `token`. `None` for any failure.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        let claims = match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => data.claims,
            Err(e) => {
                tracing::debug!(error = %e, "token rejected");
                return None;
            }
        };

        if claims.kind != ACCESS_TOKEN_KIND || claims.sub != claims.did {
            tracing::debug!("token rejected: unexpected kind or subject");
            return None;
        }
        if self.clock.now().timestamp() >= claims.exp {
            tracing::debug!(did = %claims.did, "token expired");
            return None;
        }

        Some(claims)
    }

    /// Subject DID of a valid token.
    pub fn extract_did(&self, token: &str) -> Option<String> {
        self.verify(token).map(|c| c.did)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
