//! Campaign persistence.
//!
//! [`CampaignStore`] is the repository seam; [`MemoryCampaignStore`] keeps
//! everything in process and is what the gateway runs with.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rand::RngCore;
use rand::rngs::OsRng;
use std::sync::atomic::{AtomicU64, Ordering};

use super::error::CampaignError;
use super::models::{Campaign, CampaignStatus};

/// Random bytes in a purchaser identifier (24 hex chars).
pub const IDENTIFIER_BYTES: usize = 12;

/// Random bytes in a campaign id (32 hex chars).
pub const CAMPAIGN_ID_BYTES: usize = 16;

#[async_trait]
pub trait CampaignStore: Send + Sync {
    /// Stable purchaser identifier for `did`, created on first use.
    async fn user_identifier(&self, did: &str) -> Result<String, CampaignError>;

    /// Store `campaign`, assigning its numeric `id`. Returns the stored record.
    async fn insert(&self, campaign: Campaign) -> Result<Campaign, CampaignError>;

    /// Campaigns owned by `did`, newest first.
    async fn list_by_did(&self, did: &str) -> Result<Vec<Campaign>, CampaignError>;

    async fn get(&self, campaign_id: &str) -> Result<Option<Campaign>, CampaignError>;

    /// Returns `false` if no campaign has that id.
    async fn update_status(
        &self,
        campaign_id: &str,
        status: CampaignStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, CampaignError>;
}

/// In-process campaign table.
#[derive(Debug, Default)]
pub struct MemoryCampaignStore {
    identifiers: DashMap<String, String>,
    campaigns: DashMap<String, Campaign>,
    next_id: AtomicU64,
}

impl MemoryCampaignStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.campaigns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.campaigns.is_empty()
    }
}

#[async_trait]
impl CampaignStore for MemoryCampaignStore {
    async fn user_identifier(&self, did: &str) -> Result<String, CampaignError> {
        // Entry holds the shard lock, so two first calls agree on one value.
        let identifier = self
            .identifiers
            .entry(did.to_string())
            .or_insert_with(|| random_hex(IDENTIFIER_BYTES))
            .value()
            .clone();
        Ok(identifier)
    }

    async fn insert(&self, mut campaign: Campaign) -> Result<Campaign, CampaignError> {
        match self.campaigns.entry(campaign.campaign_id.clone()) {
            Entry::Occupied(_) => Err(CampaignError::Storage(format!(
                "duplicate campaign id {}",
                campaign.campaign_id
            ))),
            Entry::Vacant(slot) => {
                campaign.id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
                slot.insert(campaign.clone());
                Ok(campaign)
            }
        }
    }

    async fn list_by_did(&self, did: &str) -> Result<Vec<Campaign>, CampaignError> {
        let mut owned: Vec<Campaign> = self
            .campaigns
            .iter()
            .filter(|c| c.did == did)
            .map(|c| c.value().clone())
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(owned)
    }

    async fn get(&self, campaign_id: &str) -> Result<Option<Campaign>, CampaignError> {
        Ok(self.campaigns.get(campaign_id).map(|c| c.value().clone()))
    }

    async fn update_status(
        &self,
        campaign_id: &str,
        status: CampaignStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, CampaignError> {
        match self.campaigns.get_mut(campaign_id) {
            Some(mut c) => {
                c.status = status;
                c.updated_at = at;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Hex string of `n` random bytes from the OS CSPRNG.
pub fn random_hex(n: usize) -> String {
    let mut bytes = vec![0u8; n];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn campaign(did: &str, created_at: DateTime<Utc>) -> Campaign {
        Campaign {
            id: 0,
            campaign_id: random_hex(CAMPAIGN_ID_BYTES),
            did: did.into(),
            identifier_from_purchaser: "ident".into(),
            campaign_name: "name".into(),
            campaign_description: "desc".into(),
            campaign_objective: None,
            target_audience: None,
            budget: None,
            duration_days: None,
            start_date: None,
            end_date: None,
            input_text: "text".into(),
            status: CampaignStatus::Pending,
            created_at,
            updated_at: created_at,
        }
    }

    #[tokio::test]
    async fn test_identifier_stable_per_did() {
        let store = MemoryCampaignStore::new();
        let a1 = store.user_identifier("did:prism:a").await.unwrap();
        let a2 = store.user_identifier("did:prism:a").await.unwrap();
        let b = store.user_identifier("did:prism:b").await.unwrap();

        assert_eq!(a1, a2);
        assert_ne!(a1, b);
        assert_eq!(a1.len(), 24);
        assert!(a1.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_insert_assigns_ids() {
        let store = MemoryCampaignStore::new();
        let now = Utc::now();
        let first = store.insert(campaign("did:prism:a", now)).await.unwrap();
        let second = store.insert(campaign("did:prism:a", now)).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(store.len(), 2);
        assert_eq!(
            store.get(&first.campaign_id).await.unwrap(),
            Some(first.clone())
        );
    }

    #[tokio::test]
    async fn test_duplicate_campaign_id_rejected() {
        let store = MemoryCampaignStore::new();
        let c = campaign("did:prism:a", Utc::now());
        store.insert(c.clone()).await.unwrap();
        assert!(matches!(
            store.insert(c).await,
            Err(CampaignError::Storage(_))
        ));
    }

    #[tokio::test]
    async fn test_list_newest_first_and_scoped() {
        let store = MemoryCampaignStore::new();
        let t0 = Utc::now();
        let old = store.insert(campaign("did:prism:a", t0)).await.unwrap();
        let new = store
            .insert(campaign("did:prism:a", t0 + Duration::seconds(5)))
            .await
            .unwrap();
        store.insert(campaign("did:prism:b", t0)).await.unwrap();

        let listed = store.list_by_did("did:prism:a").await.unwrap();
        let ids: Vec<_> = listed.iter().map(|c| c.campaign_id.as_str()).collect();
        assert_eq!(ids, vec![new.campaign_id.as_str(), old.campaign_id.as_str()]);
        assert!(store.list_by_did("did:prism:c").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_status() {
        let store = MemoryCampaignStore::new();
        let t0 = Utc::now();
        let c = store.insert(campaign("did:prism:a", t0)).await.unwrap();
        let later = t0 + Duration::seconds(1);

        assert!(
            store
                .update_status(&c.campaign_id, CampaignStatus::Processing, later)
                .await
                .unwrap()
        );
        let stored = store.get(&c.campaign_id).await.unwrap().unwrap();
        assert_eq!(stored.status, CampaignStatus::Processing);
        assert_eq!(stored.updated_at, later);

        assert!(
            !store
                .update_status("missing", CampaignStatus::Processing, later)
                .await
                .unwrap()
        );
    }
}
