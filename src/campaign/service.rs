use std::sync::Arc;
use validator::Validate;

use super::error::CampaignError;
use super::job_client::JobSubmitter;
use super::models::{
    Campaign, CampaignList, CampaignStatus, CreateCampaignRequest, JobInput, JobRequest,
    UserIdentifier,
};
use super::store::{CAMPAIGN_ID_BYTES, CampaignStore, random_hex};
use crate::did_auth::Clock;

/// Campaign operations on behalf of an authenticated DID.
pub struct CampaignService {
    store: Arc<dyn CampaignStore>,
    jobs: Option<Arc<dyn JobSubmitter>>,
    clock: Arc<dyn Clock>,
}

impl CampaignService {
    /// `jobs = None` stores campaigns without submitting them.
    pub fn new(
        store: Arc<dyn CampaignStore>,
        jobs: Option<Arc<dyn JobSubmitter>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { store, jobs, clock }
    }

    pub async fn user_identifier(&self, did: &str) -> Result<UserIdentifier, CampaignError> {
        let identifier = self.store.user_identifier(did).await?;
        Ok(UserIdentifier {
            identifier,
            did: did.to_string(),
        })
    }

    /// Store a campaign and hand its input to the job API.
    ///
    /// Job submission problems never fail the request: the campaign stays
    /// `pending` and the failure is logged.
    pub async fn create(
        &self,
        did: &str,
        req: CreateCampaignRequest,
    ) -> Result<Campaign, CampaignError> {
        req.validate()?;

        let identifier = self.store.user_identifier(did).await?;
        let now = self.clock.now();
        let mut campaign = self
            .store
            .insert(Campaign {
                id: 0,
                campaign_id: random_hex(CAMPAIGN_ID_BYTES),
                did: did.to_string(),
                identifier_from_purchaser: identifier.clone(),
                campaign_name: req.campaign_name,
                campaign_description: req.campaign_description,
                campaign_objective: req.campaign_objective,
                target_audience: req.target_audience,
                budget: req.budget,
                duration_days: req.duration_days,
                start_date: req.start_date,
                end_date: req.end_date,
                input_text: req.input_text,
                status: CampaignStatus::Pending,
                created_at: now,
                updated_at: now,
            })
            .await?;

        tracing::info!(did = %did, campaign_id = %campaign.campaign_id, "campaign created");

        let Some(jobs) = &self.jobs else {
            tracing::debug!(campaign_id = %campaign.campaign_id, "no job API configured, campaign left pending");
            return Ok(campaign);
        };

        let job = JobRequest {
            identifier_from_purchaser: identifier,
            input_data: JobInput {
                text: campaign.input_text.clone(),
            },
        };
        match jobs.submit(&job).await {
            Ok(()) => {
                let at = self.clock.now();
                self.store
                    .update_status(&campaign.campaign_id, CampaignStatus::Processing, at)
                    .await?;
                campaign.status = CampaignStatus::Processing;
                campaign.updated_at = at;
                tracing::info!(campaign_id = %campaign.campaign_id, "job submitted");
            }
            Err(e) => {
                tracing::warn!(campaign_id = %campaign.campaign_id, error = %e, "job submission failed, campaign left pending");
            }
        }

        Ok(campaign)
    }

    pub async fn list(&self, did: &str) -> Result<CampaignList, CampaignError> {
        let campaigns = self.store.list_by_did(did).await?;
        Ok(CampaignList {
            total: campaigns.len(),
            campaigns,
        })
    }

    /// Campaign `campaign_id`, if `did` owns it.
    pub async fn get(&self, did: &str, campaign_id: &str) -> Result<Campaign, CampaignError> {
        let campaign = self
            .store
            .get(campaign_id)
            .await?
            .ok_or(CampaignError::NotFound)?;
        if campaign.did != did {
            tracing::warn!(did = %did, campaign_id = %campaign_id, "campaign access denied");
            return Err(CampaignError::Forbidden);
        }
        Ok(campaign)
    }
}

impl std::fmt::Debug for CampaignService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CampaignService")
            .field("jobs_enabled", &self.jobs.is_some())
            .finish_non_exhaustive()
    }
}
