//! Campaigns owned by authenticated DIDs.
//!
//! Every operation runs on behalf of the DID carried by a valid session
//! token; a campaign is only visible to the DID that created it.

pub mod error;
pub mod job_client;
pub mod models;
pub mod service;
pub mod store;

pub use error::CampaignError;
pub use job_client::{HttpJobClient, JobError, JobSubmitter};
pub use models::{Campaign, CampaignList, CampaignStatus, CreateCampaignRequest, UserIdentifier};
pub use service::CampaignService;
pub use store::{CampaignStore, MemoryCampaignStore};
