pub mod handlers;
pub mod openapi;
pub mod state;

use anyhow::{Context, Result, ensure};
use axum::{
    Json, Router,
    body::Body,
    http::{HeaderValue, Request},
    middleware::from_fn_with_state,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::campaign::{CampaignService, HttpJobClient, JobSubmitter, MemoryCampaignStore};
use crate::config::AppConfig;
use crate::did_auth::{
    ChallengeStore, Clock, DidAuthService, DidVerifier, MemoryChallengeBackend, TokenIssuer,
    bearer_auth_middleware,
};
use state::AppState;

/// Wire services from configuration.
pub fn build_state(config: &AppConfig, clock: Arc<dyn Clock>) -> Result<AppState> {
    ensure!(
        config.auth.challenge_ttl_secs > 0,
        "auth.challenge_ttl_secs must be positive"
    );
    ensure!(
        !config.auth.did_methods.is_empty(),
        "auth.did_methods must name at least one DID method"
    );

    let challenge_ttl = i64::try_from(config.auth.challenge_ttl_secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .context("auth.challenge_ttl_secs out of range")?;
    let token_ttl = i64::try_from(config.token.ttl_hours)
        .ok()
        .and_then(chrono::Duration::try_hours)
        .context("token.ttl_hours out of range")?;

    let challenges = ChallengeStore::new(
        Arc::new(MemoryChallengeBackend::new()),
        clock.clone(),
        challenge_ttl,
    );
    let verifier = DidVerifier::self_certifying(config.auth.did_methods.iter().cloned());
    let tokens = TokenIssuer::new(config.token.secret.as_bytes(), token_ttl, clock.clone())
        .context("invalid token configuration")?;
    let auth = Arc::new(DidAuthService::new(challenges, verifier, tokens));

    let jobs: Option<Arc<dyn JobSubmitter>> = match &config.job_api.url {
        Some(url) => {
            let timeout = std::time::Duration::from_secs(config.job_api.timeout_secs);
            let client = HttpJobClient::new(url.clone(), timeout)
                .context("failed to build job API client")?;
            tracing::info!(url = %url, "job API submission enabled");
            Some(Arc::new(client) as Arc<dyn JobSubmitter>)
        }
        None => {
            tracing::warn!("job_api.url not set, campaigns will stay pending");
            None
        }
    };
    let campaigns = Arc::new(CampaignService::new(
        Arc::new(MemoryCampaignStore::new()),
        jobs,
        clock,
    ));

    Ok(AppState::new(auth, campaigns))
}

/// Assemble routes, auth guard, CORS and request tracing.
pub fn build_router(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let auth_routes = Router::new()
        .route("/auth/challenge", get(handlers::get_challenge))
        .route("/auth/verify", post(handlers::verify))
        .route("/auth/me", get(handlers::me));

    // Protected by bearer token
    let campaign_routes = Router::new()
        .route(
            "/campaigns",
            post(handlers::create_campaign).get(handlers::list_campaigns),
        )
        .route("/campaigns/identifier", get(handlers::get_identifier))
        .route("/campaigns/{campaign_id}", get(handlers::get_campaign))
        .route_layer(from_fn_with_state(
            state.auth.clone(),
            bearer_auth_middleware,
        ));

    Router::new()
        .route("/", get(handlers::service_info))
        .route("/health", get(handlers::health_check))
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(auth_routes)
        .merge(campaign_routes)
        .with_state(state)
        .layer(cors_layer(cors_origins))
        .layer(
            // Path only: query strings may carry access tokens.
            TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                tracing::info_span!("http", method = %req.method(), path = %req.uri().path())
            }),
        )
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi::ApiDoc::openapi())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Start HTTP Gateway server
pub async fn run_server(config: &AppConfig, state: AppState) -> Result<()> {
    let app = build_router(Arc::new(state), &config.gateway.cors_origins);

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!(addr = %addr, "gateway listening");
    tracing::info!("OpenAPI document: http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
