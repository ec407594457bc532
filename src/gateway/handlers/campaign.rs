//! Campaign handlers (bearer token required)

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use super::super::state::AppState;
use crate::campaign::{Campaign, CampaignError, CampaignList, CreateCampaignRequest, UserIdentifier};
use crate::did_auth::{AuthenticatedDid, ErrorBody};

/// Purchaser identifier of the caller
#[utoipa::path(
    get,
    path = "/campaigns/identifier",
    responses(
        (status = 200, description = "Identifier for the caller's DID", body = UserIdentifier),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Campaigns"
)]
pub async fn get_identifier(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedDid(did)): Extension<AuthenticatedDid>,
) -> Result<Json<UserIdentifier>, CampaignError> {
    state.campaigns.user_identifier(&did).await.map(Json)
}

/// Create a campaign and submit its job
#[utoipa::path(
    post,
    path = "/campaigns",
    request_body = CreateCampaignRequest,
    responses(
        (status = 201, description = "Campaign created", body = Campaign),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 422, description = "Invalid campaign request", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Campaigns"
)]
pub async fn create_campaign(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedDid(did)): Extension<AuthenticatedDid>,
    Json(req): Json<CreateCampaignRequest>,
) -> Result<(StatusCode, Json<Campaign>), CampaignError> {
    let campaign = state.campaigns.create(&did, req).await?;
    Ok((StatusCode::CREATED, Json(campaign)))
}

/// Campaigns owned by the caller, newest first
#[utoipa::path(
    get,
    path = "/campaigns",
    responses(
        (status = 200, description = "Caller's campaigns", body = CampaignList),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Campaigns"
)]
pub async fn list_campaigns(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedDid(did)): Extension<AuthenticatedDid>,
) -> Result<Json<CampaignList>, CampaignError> {
    state.campaigns.list(&did).await.map(Json)
}

/// A single campaign owned by the caller
#[utoipa::path(
    get,
    path = "/campaigns/{campaign_id}",
    params(("campaign_id" = String, Path, description = "Campaign identifier")),
    responses(
        (status = 200, description = "Campaign", body = Campaign),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Campaign owned by another DID", body = ErrorBody),
        (status = 404, description = "Campaign not found", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Campaigns"
)]
pub async fn get_campaign(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedDid(did)): Extension<AuthenticatedDid>,
    Path(campaign_id): Path<String>,
) -> Result<Json<Campaign>, CampaignError> {
    state.campaigns.get(&did, &campaign_id).await.map(Json)
}
