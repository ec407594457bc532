//! Authentication error types.
//!
//! Two layers:
//! - [`VerifyError`]: internal parse/crypto failures of the signature verifier.
//!   These never cross the verifier boundary; they collapse to `false`.
//! - [`AuthError`]: caller-visible failures with a stable code and HTTP status.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Verifier-internal failure reasons.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("malformed DID: {0}")]
    MalformedDid(String),
    #[error("invalid key encoding: {0}")]
    InvalidKeyEncoding(String),
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("envelope payload does not match the challenge")]
    ChallengeMismatch,
}

/// Caller-visible authentication error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum AuthErrorCode {
    /// 4001: DID does not start with `did:`
    InvalidDidFormat = 4001,
    /// 4002: No usable challenge (missing, used, expired or mismatched)
    ChallengeInvalidOrExpired = 4002,
    /// 4003: Envelope did not verify against the DID key
    SignatureVerificationFailed = 4003,
    /// 4004: Bearer token missing, tampered or expired
    TokenInvalidOrExpired = 4004,
    /// 5000: Internal server error
    InternalError = 5000,
}

impl AuthErrorCode {
    /// Get error code as i32.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Get error name string.
    pub fn name(self) -> &'static str {
        match self {
            Self::InvalidDidFormat => "INVALID_DID_FORMAT",
            Self::ChallengeInvalidOrExpired => "CHALLENGE_INVALID_OR_EXPIRED",
            Self::SignatureVerificationFailed => "SIGNATURE_VERIFICATION_FAILED",
            Self::TokenInvalidOrExpired => "TOKEN_INVALID_OR_EXPIRED",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code.
    pub fn http_status(self) -> StatusCode {
        match self {
            Self::InvalidDidFormat => StatusCode::BAD_REQUEST,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

/// Authentication error with message.
#[derive(Debug, Clone, Error)]
#[error("{}: {message}", .code.name())]
pub struct AuthError {
    pub code: AuthErrorCode,
    pub message: String,
}

impl AuthError {
    /// Create a new auth error.
    pub fn new(code: AuthErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create error with default message.
    pub fn from_code(code: AuthErrorCode) -> Self {
        let message = match code {
            AuthErrorCode::InvalidDidFormat => "Invalid DID format. Must start with 'did:'",
            AuthErrorCode::ChallengeInvalidOrExpired => {
                "Invalid or expired challenge. Please request a new challenge."
            }
            AuthErrorCode::SignatureVerificationFailed => {
                "Signature verification failed. Authentication unsuccessful."
            }
            AuthErrorCode::TokenInvalidOrExpired => "Invalid or expired token",
            AuthErrorCode::InternalError => "Internal server error",
        };
        Self::new(code, message)
    }
}

/// JSON response body for auth errors.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    pub code: i32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code.code(),
            error: self.code.name().to_string(),
            message: self.message,
        };
        (self.code.http_status(), Json(body)).into_response()
    }
}
