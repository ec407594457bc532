//! OpenAPI Documentation
//!
//! Auto-generated OpenAPI 3.0 document for the gateway, served at
//! `/api-docs/openapi.json`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::campaign::{Campaign, CampaignList, CampaignStatus, CreateCampaignRequest, UserIdentifier};
use crate::did_auth::{AuthSession, ChallengeGrant, ErrorBody, SessionInfo, VerifyRequest};
use crate::gateway::handlers::{HealthResponse, ServiceInfo};

/// Bearer session token security scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            let scheme = HttpBuilder::new()
                .scheme(HttpAuthScheme::Bearer)
                .bearer_format("JWT")
                .description(Some(
                    "Access token from POST /auth/verify: `Authorization: Bearer <access_token>`",
                ))
                .build();
            components.add_security_scheme("bearer_auth", SecurityScheme::Http(scheme));
        }
    }
}

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "DID Authentication Gateway API",
        version = "1.0.0",
        description = "Challenge-response authentication for self-certifying DIDs, with DID-scoped campaigns.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8000", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::service_info,
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::auth::get_challenge,
        crate::gateway::handlers::auth::verify,
        crate::gateway::handlers::auth::me,
        crate::gateway::handlers::campaign::get_identifier,
        crate::gateway::handlers::campaign::create_campaign,
        crate::gateway::handlers::campaign::list_campaigns,
        crate::gateway::handlers::campaign::get_campaign,
    ),
    components(
        schemas(
            ServiceInfo,
            HealthResponse,
            ErrorBody,
            ChallengeGrant,
            VerifyRequest,
            AuthSession,
            SessionInfo,
            Campaign,
            CampaignStatus,
            CampaignList,
            CreateCampaignRequest,
            UserIdentifier,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "DID challenge-response login"),
        (name = "Campaigns", description = "Campaigns of the authenticated DID (bearer token required)"),
        (name = "System", description = "Health checks and system info")
    )
)]
pub struct ApiDoc;
