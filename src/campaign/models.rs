//! Campaign records and request/response payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Processing state of a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    /// Stored, job not (yet) accepted by the job API
    Pending,
    /// Job accepted by the job API
    Processing,
}

/// Stored campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Campaign {
    pub id: u64,
    /// 32 hex chars
    pub campaign_id: String,
    /// Owner DID
    pub did: String,
    pub identifier_from_purchaser: String,
    pub campaign_name: String,
    pub campaign_description: String,
    pub campaign_objective: Option<String>,
    pub target_audience: Option<String>,
    pub budget: Option<f64>,
    pub duration_days: Option<u32>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub input_text: String,
    pub status: CampaignStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Campaign creation request.
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateCampaignRequest {
    #[validate(length(min = 1, max = 200))]
    pub campaign_name: String,
    #[validate(length(min = 1))]
    pub campaign_description: String,
    #[serde(default)]
    pub campaign_objective: Option<String>,
    #[serde(default)]
    pub target_audience: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub budget: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 1))]
    pub duration_days: Option<u32>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    /// Detailed explanation forwarded to the job API
    #[validate(length(min = 1))]
    pub input_text: String,
}

/// Campaigns owned by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CampaignList {
    pub campaigns: Vec<Campaign>,
    pub total: usize,
}

/// Purchaser identifier bound to a DID.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserIdentifier {
    pub identifier: String,
    pub did: String,
}

/// Job submitted to the processing API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRequest {
    pub identifier_from_purchaser: String,
    pub input_data: JobInput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobInput {
    pub text: String,
}
