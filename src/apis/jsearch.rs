use crate::config::SourceConfig;
use crate::constants::JSEARCH_API;
use crate::error::{IngestError, Result};
use crate::types::{JobSource, RawRecord};
use serde_json::Value;
use tracing::{info, instrument};

/// Client for the JSearch job-search API on RapidAPI.
pub struct JSearchClient {
    client: reqwest::Client,
    host: String,
    api_key: String,
    query: String,
    page: u32,
    num_pages: u32,
}

impl JSearchClient {
    pub fn new(config: &SourceConfig, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            host: config.host.clone(),
            api_key,
            query: config.query.clone(),
            page: config.page,
            num_pages: config.num_pages,
        }
    }
}

#[async_trait::async_trait]
impl JobSource for JSearchClient {
    fn source_name(&self) -> &'static str {
        JSEARCH_API
    }

    #[instrument(skip(self))]
    async fn fetch_jobs(&self) -> Result<Vec<RawRecord>> {
        let url = format!("https://{}/search", self.host);
        let response = self
            .client
            .get(&url)
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", &self.host)
            .query(&[
                ("query", self.query.clone()),
                ("page", self.page.to_string()),
                ("num_pages", self.num_pages.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IngestError::Api {
                message: format!("search request returned status {}", response.status()),
            });
        }

        let body: Value = response.json().await?;
        let jobs = body.get("data").and_then(Value::as_array).ok_or_else(|| {
            IngestError::MissingField("data array not found in search response".into())
        })?;

        info!("Successfully fetched {} job records from JSearch", jobs.len());
        Ok(jobs.clone())
    }
}
