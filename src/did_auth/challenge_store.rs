//! One-time authentication challenges keyed by DID.
//!
//! [`ChallengeStore`] owns the policy (random generation, expiry window,
//! clock). Storage sits behind [`ChallengeBackend`] so a shared cache can
//! replace the in-process table without touching verification logic.
//!
//! Check-and-mark must be atomic per DID. [`MemoryChallengeBackend`] gets that
//! from the shard lock held by a `DashMap` entry; a remote backend would use
//! the store's own compare-and-set or scripted transaction.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rand::RngCore;
use rand::rngs::OsRng;
use std::sync::Arc;
use thiserror::Error;

use super::clock::Clock;

/// Random bytes per challenge (256 bits).
pub const CHALLENGE_BYTES: usize = 32;

/// Default expiration window.
pub const DEFAULT_CHALLENGE_TTL: Duration = Duration::minutes(5);

/// Stored challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeRecord {
    pub did: String,
    pub challenge: String,
    pub created_at: DateTime<Utc>,
    pub used: bool,
}

/// Result of a redemption attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redemption {
    /// Matched, unused and fresh; now marked used.
    Accepted,
    /// No record for the DID.
    Missing,
    /// Record was already consumed.
    AlreadyUsed,
    /// Record outlived the window; it has been deleted.
    Expired,
    /// Supplied value differs from the stored one.
    Mismatch,
}

/// Backend failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("challenge backend unavailable: {0}")]
    Unavailable(String),
}

/// Key-value storage for challenge records.
#[async_trait]
pub trait ChallengeBackend: Send + Sync {
    /// Insert or replace the record for `record.did`.
    async fn put(&self, record: ChallengeRecord) -> Result<(), StoreError>;

    /// Atomically check `challenge` for `did` and mark it used on success.
    /// Records created before `cutoff` count as expired.
    async fn redeem(
        &self,
        did: &str,
        challenge: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Redemption, StoreError>;

    /// Delete records created before `cutoff` and records already used.
    /// Returns how many were removed.
    async fn purge(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError>;
}

/// In-process backend over a sharded concurrent map.
#[derive(Debug, Default)]
pub struct MemoryChallengeBackend {
    records: DashMap<String, ChallengeRecord>,
}

impl MemoryChallengeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the record for a DID.
    pub fn get(&self, did: &str) -> Option<ChallengeRecord> {
        self.records.get(did).map(|r| r.value().clone())
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl ChallengeBackend for MemoryChallengeBackend {
    async fn put(&self, record: ChallengeRecord) -> Result<(), StoreError> {
        self.records.insert(record.did.clone(), record);
        Ok(())
    }

    async fn redeem(
        &self,
        did: &str,
        challenge: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Redemption, StoreError> {
        // The entry guard holds the shard write lock until it is dropped.
        let outcome = match self.records.entry(did.to_string()) {
            Entry::Vacant(_) => Redemption::Missing,
            Entry::Occupied(mut entry) => {
                let record = entry.get_mut();
                if record.used {
                    Redemption::AlreadyUsed
                } else if record.created_at < cutoff {
                    entry.remove();
                    Redemption::Expired
                } else if record.challenge != challenge {
                    Redemption::Mismatch
                } else {
                    record.used = true;
                    Redemption::Accepted
                }
            }
        };
        Ok(outcome)
    }

    async fn purge(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        let before = self.records.len();
        self.records.retain(|_, r| !r.used && r.created_at >= cutoff);
        Ok(before.saturating_sub(self.records.len()))
    }
}

/// Issues and redeems single-use challenges.
pub struct ChallengeStore {
    backend: Arc<dyn ChallengeBackend>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl ChallengeStore {
    pub fn new(backend: Arc<dyn ChallengeBackend>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            backend,
            clock,
            ttl,
        }
    }

    /// In-memory store with the default window.
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self::new(
            Arc::new(MemoryChallengeBackend::new()),
            clock,
            DEFAULT_CHALLENGE_TTL,
        )
    }

    /// Expiration window.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a fresh challenge for `did`, replacing any outstanding one.
    pub async fn create_challenge(&self, did: &str) -> Result<String, StoreError> {
        let challenge = generate_challenge();
        let now = self.clock.now();

        self.backend
            .put(ChallengeRecord {
                did: did.to_string(),
                challenge: challenge.clone(),
                created_at: now,
                used: false,
            })
            .await?;

        // Amortized cleanup; a failure here does not affect the new record.
        match self.backend.purge(now - self.ttl).await {
            Ok(0) => {}
            Ok(n) => tracing::debug!(removed = n, "purged stale challenges"),
            Err(e) => tracing::warn!(error = %e, "challenge purge failed"),
        }

        Ok(challenge)
    }

    /// Redeem `challenge` for `did`. `true` exactly once per issued challenge.
    pub async fn verify_challenge(&self, did: &str, challenge: &str) -> bool {
        let cutoff = self.clock.now() - self.ttl;
        match self.backend.redeem(did, challenge, cutoff).await {
            Ok(Redemption::Accepted) => true,
            Ok(outcome) => {
                tracing::debug!(did = %did, ?outcome, "challenge rejected");
                false
            }
            Err(e) => {
                tracing::warn!(did = %did, error = %e, "challenge backend error, failing closed");
                false
            }
        }
    }
}

impl std::fmt::Debug for ChallengeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChallengeStore")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

/// Hex-encoded 256-bit value from the OS CSPRNG.
pub fn generate_challenge() -> String {
    let mut bytes = [0u8; CHALLENGE_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::did_auth::clock::ManualClock;

    const DID: &str = "did:prism:aa";

    fn store() -> (ChallengeStore, Arc<ManualClock>, Arc<MemoryChallengeBackend>) {
        let clock = Arc::new(ManualClock::starting_now());
        let backend = Arc::new(MemoryChallengeBackend::new());
        let store = ChallengeStore::new(backend.clone(), clock.clone(), DEFAULT_CHALLENGE_TTL);
        (store, clock, backend)
    }

    #[test]
    fn test_generate_challenge_format() {
        let c = generate_challenge();
        assert_eq!(c.len(), 64);
        assert!(c.chars().all(|ch| ch.is_ascii_hexdigit()));
        assert_ne!(c, generate_challenge());
    }

    #[tokio::test]
    async fn test_single_use() {
        let (store, _, _) = store();
        let c = store.create_challenge(DID).await.unwrap();

        assert!(store.verify_challenge(DID, &c).await);
        assert!(!store.verify_challenge(DID, &c).await);
    }

    #[tokio::test]
    async fn test_unknown_did() {
        let (store, _, _) = store();
        assert!(!store.verify_challenge(DID, "deadbeef").await);
    }

    #[tokio::test]
    async fn test_mismatch_does_not_consume() {
        let (store, _, backend) = store();
        let c = store.create_challenge(DID).await.unwrap();

        assert!(!store.verify_challenge(DID, "wrong").await);
        assert!(!backend.get(DID).unwrap().used);
        assert!(store.verify_challenge(DID, &c).await);
    }

    #[tokio::test]
    async fn test_expired_challenge_rejected_and_deleted() {
        let (store, clock, backend) = store();
        let c = store.create_challenge(DID).await.unwrap();

        clock.advance(Duration::minutes(5) + Duration::seconds(1));
        assert!(!store.verify_challenge(DID, &c).await);
        assert!(backend.get(DID).is_none());
    }

    #[tokio::test]
    async fn test_within_window_accepted() {
        let (store, clock, _) = store();
        let c = store.create_challenge(DID).await.unwrap();

        clock.advance(Duration::minutes(4) + Duration::seconds(59));
        assert!(store.verify_challenge(DID, &c).await);
    }

    #[tokio::test]
    async fn test_new_challenge_replaces_old() {
        let (store, _, backend) = store();
        let old = store.create_challenge(DID).await.unwrap();
        let new = store.create_challenge(DID).await.unwrap();

        assert_eq!(backend.len(), 1);
        assert!(!store.verify_challenge(DID, &old).await);
        assert!(store.verify_challenge(DID, &new).await);
    }

    #[tokio::test]
    async fn test_create_purges_stale_records() {
        let (store, clock, backend) = store();
        let used = store.create_challenge("did:prism:used").await.unwrap();
        assert!(store.verify_challenge("did:prism:used", &used).await);
        store.create_challenge("did:prism:old").await.unwrap();

        clock.advance(Duration::minutes(6));
        store.create_challenge(DID).await.unwrap();

        assert_eq!(backend.len(), 1);
        assert!(backend.get(DID).is_some());
    }

    #[tokio::test]
    async fn test_concurrent_redeem_succeeds_once() {
        let (store, _, _) = store();
        let store = Arc::new(store);
        let c = store.create_challenge(DID).await.unwrap();

        let mut handles = vec![];
        for _ in 0..16 {
            let store = Arc::clone(&store);
            let c = c.clone();
            handles.push(tokio::spawn(
                async move { store.verify_challenge(DID, &c).await },
            ));
        }

        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 1);
    }

    #[tokio::test]
    async fn test_backend_redeem_outcomes() {
        let backend = MemoryChallengeBackend::new();
        let now = Utc::now();
        backend
            .put(ChallengeRecord {
                did: DID.into(),
                challenge: "abc".into(),
                created_at: now,
                used: false,
            })
            .await
            .unwrap();

        let cutoff = now - Duration::minutes(5);
        assert_eq!(
            backend.redeem(DID, "xyz", cutoff).await.unwrap(),
            Redemption::Mismatch
        );
        assert_eq!(
            backend.redeem(DID, "abc", cutoff).await.unwrap(),
            Redemption::Accepted
        );
        assert_eq!(
            backend.redeem(DID, "abc", cutoff).await.unwrap(),
            Redemption::AlreadyUsed
        );
        assert_eq!(
            backend.redeem("did:prism:bb", "abc", cutoff).await.unwrap(),
            Redemption::Missing
        );
    }

    struct DownBackend;

    #[async_trait]
    impl ChallengeBackend for DownBackend {
        async fn put(&self, _: ChallengeRecord) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn redeem(&self, _: &str, _: &str, _: DateTime<Utc>) -> Result<Redemption, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn purge(&self, _: DateTime<Utc>) -> Result<usize, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
    }

    #[tokio::test]
    async fn test_backend_failure_fails_closed() {
        let store = ChallengeStore::new(
            Arc::new(DownBackend),
            Arc::new(ManualClock::starting_now()),
            DEFAULT_CHALLENGE_TTL,
        );
        assert!(store.create_challenge(DID).await.is_err());
        assert!(!store.verify_challenge(DID, "abc").await);
    }
}
