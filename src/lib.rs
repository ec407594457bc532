//! DID authentication gateway
//!
//! Proof-of-possession login for self-certifying DIDs: the client signs a
//! one-time challenge with the Ed25519 key embedded in its DID and receives
//! a bearer session token that authorizes the campaign API.
//!
//! # Modules
//!
//! - [`did_auth`] - Challenges, envelope verification, session tokens
//! - [`campaign`] - DID-scoped campaigns and job submission
//! - [`gateway`] - HTTP routes, middleware wiring, OpenAPI document
//! - [`config`] - YAML configuration
//! - [`logging`] - Tracing subscriber setup

pub mod campaign;
pub mod config;
pub mod did_auth;
pub mod gateway;
pub mod logging;

// Convenient re-exports at crate root
pub use config::AppConfig;
pub use did_auth::{DidAuthService, DidVerifier, TokenIssuer};
pub use gateway::{build_router, build_state, run_server};
