use crate::error::{IngestError, Result};
use crate::types::NormalizedJobListing;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Persistence collaborator for normalized job listings.
///
/// `job_id` is the natural key: `insert` must fail when a listing with the
/// same `job_id` is already stored, independent of the dedup gate's check.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn exists(&self, job_id: &str) -> Result<bool>;
    async fn insert(&self, listing: &NormalizedJobListing) -> Result<()>;
    async fn scan_all(&self) -> Result<Vec<NormalizedJobListing>>;
}

/// In-memory store implementation for development/testing
pub struct InMemoryStore {
    listings: Arc<Mutex<HashMap<String, NormalizedJobListing>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            listings: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobStore for InMemoryStore {
    async fn exists(&self, job_id: &str) -> Result<bool> {
        let listings = self.listings.lock().unwrap();
        Ok(listings.contains_key(job_id))
    }

    async fn insert(&self, listing: &NormalizedJobListing) -> Result<()> {
        let mut listings = self.listings.lock().unwrap();
        if listings.contains_key(&listing.job_id) {
            return Err(IngestError::Database(format!(
                "duplicate job_id: {}",
                listing.job_id
            )));
        }
        listings.insert(listing.job_id.clone(), listing.clone());
        debug!("Stored listing {}", listing.job_id);
        Ok(())
    }

    async fn scan_all(&self) -> Result<Vec<NormalizedJobListing>> {
        let listings = self.listings.lock().unwrap();
        let mut all: Vec<NormalizedJobListing> = listings.values().cloned().collect();
        all.sort_by(|a, b| a.job_id.cmp(&b.job_id));
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(job_id: &str) -> NormalizedJobListing {
        NormalizedJobListing {
            job_id: job_id.to_string(),
            title: "Engineer".to_string(),
            description: "No description available".to_string(),
            employment_type: "Unknown".to_string(),
            city: "Unknown".to_string(),
            state: "Unknown".to_string(),
            is_remote: false,
            apply_link: "N/A".to_string(),
            company_type: "Unknown".to_string(),
            employer_name: "Unknown".to_string(),
            publisher: "Unknown".to_string(),
            posted_at: None,
            offer_expiration: None,
            required_experience_in_months: None,
            latitude: None,
            longitude: None,
        }
    }

    #[tokio::test]
    async fn insert_then_exists_and_scan() {
        let store = InMemoryStore::new();
        assert!(!store.exists("J1").await.unwrap());

        store.insert(&listing("J1")).await.unwrap();
        assert!(store.exists("J1").await.unwrap());

        let all = store.scan_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].job_id, "J1");
    }

    #[tokio::test]
    async fn duplicate_insert_is_a_storage_error() {
        let store = InMemoryStore::new();
        store.insert(&listing("J1")).await.unwrap();

        let err = store.insert(&listing("J1")).await.unwrap_err();
        assert!(matches!(err, IngestError::Database(_)));
    }
}
