use anyhow::Result;
use job_ingest::db::SqliteStore;
use job_ingest::pipeline::{Pipeline, RecordOutcome};
use job_ingest::storage::JobStore;
use job_ingest::types::RawRecord;
use serde_json::json;
use std::sync::Arc;
use tempfile::tempdir;

fn sample_batch() -> Vec<RawRecord> {
    vec![
        json!({
            "job_id": "J1",
            "job_title": "Data Engineer",
            "job_description": "Build ingestion pipelines",
            "job_employment_type": "FULLTIME",
            "job_city": "Atlanta",
            "job_state": "GA",
            "job_is_remote": true,
            "job_apply_link": "https://careers.example.com/j1",
            "employer_company_type": "Tech",
            "employer_name": "Acme Analytics",
            "job_publisher": "LinkedIn",
            "job_posted_at_datetime_utc": "2024-03-01T08:30:00.000000Z",
            "job_offer_expiration_datetime_utc": "2024-04-01T00:00:00.000000Z",
            "job_required_experience": { "required_experience_in_months": 36 },
            "job_latitude": 33.749,
            "job_longitude": -84.388
        }),
        json!({
            "job_id": "J2",
            "job_title": "Analyst",
            "job_apply_link": "not-a-url",
            "job_latitude": "200"
        }),
        json!({
            "job_title": "Record without an id"
        }),
    ]
}

#[tokio::test]
async fn full_batch_against_sqlite_store() -> Result<()> {
    let dir = tempdir()?;
    let store = Arc::new(SqliteStore::open(dir.path().join("jobs.db"))?);

    let report = Pipeline::run_batch("jsearch", &sample_batch(), store.clone()).await?;

    assert_eq!(report.total_records, 3);
    assert_eq!(report.inserted, 2);
    assert_eq!(report.skipped_invalid, 1);
    assert_eq!(report.skipped_duplicate, 0);

    let stored = store.scan_all().await?;
    assert_eq!(stored.len(), 2);

    // J1 survives with every field intact
    let j1 = &stored[0];
    assert_eq!(j1.job_id, "J1");
    assert_eq!(j1.title, "Data Engineer");
    assert!(j1.is_remote);
    assert_eq!(j1.apply_link, "https://careers.example.com/j1");
    assert_eq!(j1.required_experience_in_months, Some(36));
    assert_eq!(j1.latitude, Some(33.749));
    assert_eq!(
        j1.posted_at.unwrap().to_rfc3339(),
        "2024-03-01T08:30:00+00:00"
    );

    // J2 was admitted with defaults in place of its malformed values
    let j2 = &stored[1];
    assert_eq!(j2.job_id, "J2");
    assert_eq!(j2.apply_link, "N/A");
    assert_eq!(j2.description, "No description available");
    assert!(j2.latitude.is_none());

    Ok(())
}

#[tokio::test]
async fn rerunning_the_same_batch_is_idempotent() -> Result<()> {
    let dir = tempdir()?;
    let store = Arc::new(SqliteStore::open(dir.path().join("jobs.db"))?);
    let batch = sample_batch();

    let first = Pipeline::run_batch("jsearch", &batch, store.clone()).await?;
    assert_eq!(first.inserted, 2);

    let second = Pipeline::run_batch("jsearch", &batch, store.clone()).await?;
    assert_eq!(second.inserted, 0);
    assert_eq!(second.skipped_duplicate, 2);
    assert_eq!(second.skipped_invalid, 1);

    assert_eq!(store.scan_all().await?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn shared_job_id_within_one_batch_inserts_once() -> Result<()> {
    let dir = tempdir()?;
    let store = Arc::new(SqliteStore::open(dir.path().join("jobs.db"))?);

    let batch = vec![
        json!({ "job_id": "J3", "job_title": "Engineer" }),
        json!({ "job_id": "J3", "job_title": "Engineer (repost)" }),
    ];

    let report = Pipeline::run_batch("jsearch", &batch, store.clone()).await?;
    assert_eq!(report.inserted, 1);
    assert_eq!(report.skipped_duplicate, 1);

    let duplicates: Vec<_> = report
        .outcomes
        .iter()
        .filter(|o| matches!(o, RecordOutcome::SkippedDuplicate { job_id } if job_id == "J3"))
        .collect();
    assert_eq!(duplicates.len(), 1);

    assert_eq!(store.scan_all().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn stored_rows_are_served_by_the_read_side() -> Result<()> {
    use tower::ServiceExt;

    let dir = tempdir()?;
    let store = Arc::new(SqliteStore::open(dir.path().join("jobs.db"))?);
    Pipeline::run_batch("jsearch", &sample_batch(), store.clone()).await?;

    let app = job_ingest::server::create_server(store);
    let response = app
        .oneshot(
            axum::http::Request::builder()
                .uri("/jobs")
                .body(axum::body::Body::empty())?,
        )
        .await?;

    assert_eq!(response.status(), axum::http::StatusCode::OK);
    let body = hyper::body::to_bytes(response.into_body()).await?;
    let payload: serde_json::Value = serde_json::from_slice(&body)?;
    let listings = payload.as_array().unwrap();
    assert_eq!(listings.len(), 2);
    assert_eq!(listings[0]["job_id"], "J1");
    let posted: chrono::DateTime<chrono::Utc> =
        serde_json::from_value(listings[0]["posted_at"].clone())?;
    assert_eq!(posted.to_rfc3339(), "2024-03-01T08:30:00+00:00");
    assert_eq!(listings[1]["apply_link"], "N/A");
    Ok(())
}
