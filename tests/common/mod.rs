#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use tower::ServiceExt;

use did_auth_gateway::config::AppConfig;
use did_auth_gateway::did_auth::{Did, ManualClock};
use did_auth_gateway::gateway::{build_router, build_state};

pub const EDDSA_HEADER: &str = r#"{"alg":"EdDSA"}"#;

pub const TEST_CONFIG: &str = r#"
log_level: debug
log_dir: ./logs
log_file: test.log
use_json: false
rotation: never
gateway:
  host: 127.0.0.1
  port: 0
  cors_origins:
    - http://localhost:5173
token:
  secret: "integration-test-secret-0123456789abcdef"
"#;

/// A DID controlled by a freshly generated Ed25519 key.
pub struct Identity {
    signing_key: SigningKey,
    pub did: String,
}

impl Identity {
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        let did = Did::from_public_key("prism", &signing_key.verifying_key().to_bytes()).to_string();
        Self { signing_key, did }
    }

    /// Compact envelope over `payload` with the EdDSA header.
    pub fn sign(&self, payload: &str) -> String {
        self.sign_with_header(EDDSA_HEADER, payload)
    }

    pub fn sign_with_header(&self, header_json: &str, payload: &str) -> String {
        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header_json),
            URL_SAFE_NO_PAD.encode(payload)
        );
        let signature = self.signing_key.sign(signing_input.as_bytes());
        format!(
            "{}.{}",
            signing_input,
            URL_SAFE_NO_PAD.encode(signature.to_bytes())
        )
    }
}

pub fn test_config() -> AppConfig {
    AppConfig::from_yaml(TEST_CONFIG).unwrap()
}

pub fn test_app() -> (Router, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::starting_now());
    let config = test_config();
    let state = build_state(&config, clock.clone()).unwrap();
    (
        build_router(Arc::new(state), &config.gateway.cors_origins),
        clock,
    )
}

/// Send `req` through a clone of `app`, returning status and JSON body
/// (`Value::Null` for an empty or non-JSON body).
pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: &serde_json::Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Run the challenge-response login over HTTP and return the access token.
pub async fn login(app: &Router, identity: &Identity) -> String {
    let (status, grant) = send(app, get(&format!("/auth/challenge?did={}", identity.did))).await;
    assert_eq!(status, StatusCode::OK);
    let challenge = grant["challenge"].as_str().unwrap().to_string();

    let (status, session) = send(
        app,
        post_json(
            "/auth/verify",
            &serde_json::json!({
                "did": identity.did,
                "challenge": challenge,
                "signature": identity.sign(&challenge),
            }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", session);
    session["access_token"].as_str().unwrap().to_string()
}
