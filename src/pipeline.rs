use crate::dedupe;
use crate::error::Result;
use crate::normalizer;
use crate::storage::JobStore;
use crate::types::{JobSource, RawRecord};
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Per-record outcome recorded by a batch run
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RecordOutcome {
    Inserted { job_id: String },
    SkippedInvalid { index: usize, reason: String },
    SkippedDuplicate { job_id: String },
}

/// Result of a complete ingestion batch
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub source_name: String,
    pub started_at: DateTime<Utc>,
    pub total_records: usize,
    pub inserted: usize,
    pub skipped_invalid: usize,
    pub skipped_duplicate: usize,
    pub outcomes: Vec<RecordOutcome>,
}

pub struct Pipeline;

impl Pipeline {
    /// Sequence normalize -> dedupe -> insert over a batch of raw records.
    ///
    /// Records are visited in source order. Rejections and duplicates are
    /// recorded and skipped; the first storage error aborts the remainder
    /// of the batch and surfaces to the caller.
    #[instrument(skip(raw_records, store), fields(source = %source_name))]
    pub async fn run_batch(
        source_name: &str,
        raw_records: &[RawRecord],
        store: Arc<dyn JobStore>,
    ) -> Result<BatchReport> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(%run_id, "Starting ingestion batch of {} records", raw_records.len());
        counter!("ingest_runs_total", "source" => source_name.to_string()).increment(1);
        let t_batch = std::time::Instant::now();

        let mut outcomes = Vec::with_capacity(raw_records.len());
        let mut inserted = 0;
        let mut skipped_invalid = 0;
        let mut skipped_duplicate = 0;

        for (index, raw) in raw_records.iter().enumerate() {
            match normalizer::normalize(raw) {
                Err(reason) => {
                    warn!(index, %reason, "Skipping invalid record");
                    skipped_invalid += 1;
                    outcomes.push(RecordOutcome::SkippedInvalid {
                        index,
                        reason: reason.to_string(),
                    });
                }
                Ok(listing) => {
                    if dedupe::is_new(&listing.job_id, store.as_ref()).await? {
                        store.insert(&listing).await?;
                        inserted += 1;
                        outcomes.push(RecordOutcome::Inserted {
                            job_id: listing.job_id,
                        });
                    } else {
                        skipped_duplicate += 1;
                        outcomes.push(RecordOutcome::SkippedDuplicate {
                            job_id: listing.job_id,
                        });
                    }
                }
            }
        }

        info!(
            "Batch complete: {} inserted, {} invalid, {} duplicates",
            inserted, skipped_invalid, skipped_duplicate
        );
        counter!("ingest_records_inserted_total", "source" => source_name.to_string())
            .increment(inserted as u64);
        counter!("ingest_records_skipped_invalid_total", "source" => source_name.to_string())
            .increment(skipped_invalid as u64);
        counter!("ingest_records_skipped_duplicate_total", "source" => source_name.to_string())
            .increment(skipped_duplicate as u64);
        histogram!("ingest_batch_duration_seconds", "source" => source_name.to_string())
            .record(t_batch.elapsed().as_secs_f64());

        Ok(BatchReport {
            run_id,
            source_name: source_name.to_string(),
            started_at,
            total_records: raw_records.len(),
            inserted,
            skipped_invalid,
            skipped_duplicate,
            outcomes,
        })
    }

    /// Fetch from a source and run one ingestion batch over the result.
    #[instrument(skip(source, store), fields(source = %source.source_name()))]
    pub async fn run_for_source(
        source: &dyn JobSource,
        store: Arc<dyn JobStore>,
    ) -> Result<BatchReport> {
        let source_name = source.source_name();
        info!("Fetching raw records from {}", source_name);
        let t_fetch = std::time::Instant::now();
        let raw_records = source.fetch_jobs().await?;
        histogram!("ingest_fetch_duration_seconds", "source" => source_name.to_string())
            .record(t_fetch.elapsed().as_secs_f64());
        info!("Fetched {} raw records", raw_records.len());

        Self::run_batch(source_name, &raw_records, store).await
    }
}
