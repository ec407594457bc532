use std::sync::Arc;

use crate::campaign::CampaignService;
use crate::did_auth::DidAuthService;

/// Gateway shared state
#[derive(Clone, Debug)]
pub struct AppState {
    /// DID challenge-response authentication
    pub auth: Arc<DidAuthService>,
    /// Campaigns of authenticated DIDs
    pub campaigns: Arc<CampaignService>,
}

impl AppState {
    pub fn new(auth: Arc<DidAuthService>, campaigns: Arc<CampaignService>) -> Self {
        Self { auth, campaigns }
    }
}
