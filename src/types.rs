use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw job record as returned from the external search API. No shape is
/// guaranteed: any field may be missing, null, or carry the wrong type.
pub type RawRecord = serde_json::Value;

/// The canonical internal job listing, validated and ready for persistence.
/// Field order matches the stored schema and the read-side JSON contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedJobListing {
    pub job_id: String,
    pub title: String,
    pub description: String,
    pub employment_type: String,
    pub city: String,
    pub state: String,
    pub is_remote: bool,
    pub apply_link: String,
    pub company_type: String,
    pub employer_name: String,
    pub publisher: String,
    pub posted_at: Option<DateTime<Utc>>,
    pub offer_expiration: Option<DateTime<Utc>>,
    pub required_experience_in_months: Option<i64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Core trait that all job data sources must implement
#[async_trait::async_trait]
pub trait JobSource: Send + Sync {
    /// Unique identifier for this source
    fn source_name(&self) -> &'static str;

    /// Fetch all raw job records from this data source
    async fn fetch_jobs(&self) -> Result<Vec<RawRecord>>;
}
