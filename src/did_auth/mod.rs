//! DID challenge-response authentication.
//!
//! A client proves control of a self-certifying DID by signing a one-time
//! challenge with the Ed25519 key embedded in the DID, and receives a bearer
//! session token in exchange.
//!
//! ## Components
//! - `clock`: injected time source
//! - `did`: DID parsing and public-key extraction
//! - `envelope`: compact signed envelope codec
//! - `signature`: Ed25519 envelope verification
//! - `challenge_store`: single-use, time-bounded challenges
//! - `token`: HS256 session tokens
//! - `service`: protocol orchestration
//! - `middleware`: Axum bearer-token guard

pub mod challenge_store;
pub mod clock;
pub mod did;
pub mod envelope;
pub mod error;
pub mod middleware;
pub mod service;
pub mod signature;
pub mod token;

// Re-export for convenience
pub use challenge_store::{
    ChallengeBackend, ChallengeRecord, ChallengeStore, MemoryChallengeBackend, Redemption,
    StoreError,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use did::{Did, KeyResolver, SelfCertifyingResolver};
pub use error::{AuthError, AuthErrorCode, ErrorBody, VerifyError};
pub use middleware::{AuthenticatedDid, bearer_auth_middleware};
pub use service::{AuthSession, ChallengeGrant, DidAuthService, SessionInfo, VerifyRequest};
pub use signature::{DidVerifier, verify_ed25519};
pub use token::{Claims, IssuedToken, TokenError, TokenIssuer};
