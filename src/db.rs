use crate::error::Result;
use crate::storage::JobStore;
use crate::types::NormalizedJobListing;
use async_trait::async_trait;
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// SQLite-backed store for normalized job listings.
///
/// `job_id` is the primary key of the single `job_listings` table; there is
/// no synthetic row id, and every read binds columns by name so the stored
/// schema and the read path cannot drift apart.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (and if needed create) the store at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(&path)?;
        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            CREATE TABLE IF NOT EXISTS job_listings (
                job_id                        TEXT PRIMARY KEY,
                title                         TEXT NOT NULL,
                description                   TEXT NOT NULL,
                employment_type               TEXT NOT NULL,
                city                          TEXT NOT NULL,
                state                         TEXT NOT NULL,
                is_remote                     INTEGER NOT NULL,
                apply_link                    TEXT NOT NULL,
                company_type                  TEXT NOT NULL,
                employer_name                 TEXT NOT NULL,
                publisher                     TEXT NOT NULL,
                posted_at                     TEXT,
                offer_expiration              TEXT,
                required_experience_in_months INTEGER,
                latitude                      REAL,
                longitude                     REAL
            );
            "#,
        )?;
        info!("Opened job listing store at {}", path.as_ref().display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn listing_from_row(row: &Row<'_>) -> rusqlite::Result<NormalizedJobListing> {
    Ok(NormalizedJobListing {
        job_id: row.get("job_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        employment_type: row.get("employment_type")?,
        city: row.get("city")?,
        state: row.get("state")?,
        is_remote: row.get("is_remote")?,
        apply_link: row.get("apply_link")?,
        company_type: row.get("company_type")?,
        employer_name: row.get("employer_name")?,
        publisher: row.get("publisher")?,
        posted_at: row.get("posted_at")?,
        offer_expiration: row.get("offer_expiration")?,
        required_experience_in_months: row.get("required_experience_in_months")?,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
    })
}

#[async_trait]
impl JobStore for SqliteStore {
    async fn exists(&self, job_id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT 1 FROM job_listings WHERE job_id = ?1 LIMIT 1")?;
        let found = stmt.exists(params![job_id])?;
        Ok(found)
    }

    async fn insert(&self, listing: &NormalizedJobListing) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO job_listings (
                job_id, title, description, employment_type, city, state,
                is_remote, apply_link, company_type, employer_name, publisher,
                posted_at, offer_expiration, required_experience_in_months,
                latitude, longitude
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            params![
                listing.job_id,
                listing.title,
                listing.description,
                listing.employment_type,
                listing.city,
                listing.state,
                listing.is_remote,
                listing.apply_link,
                listing.company_type,
                listing.employer_name,
                listing.publisher,
                listing.posted_at,
                listing.offer_expiration,
                listing.required_experience_in_months,
                listing.latitude,
                listing.longitude,
            ],
        )?;
        debug!("Stored listing {}", listing.job_id);
        Ok(())
    }

    async fn scan_all(&self) -> Result<Vec<NormalizedJobListing>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT job_id, title, description, employment_type, city, state,
                    is_remote, apply_link, company_type, employer_name, publisher,
                    posted_at, offer_expiration, required_experience_in_months,
                    latitude, longitude
             FROM job_listings
             ORDER BY job_id",
        )?;
        let rows = stmt.query_map([], listing_from_row)?;
        let mut listings = Vec::new();
        for row in rows {
            listings.push(row?);
        }
        Ok(listings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestError;
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    fn listing(job_id: &str) -> NormalizedJobListing {
        NormalizedJobListing {
            job_id: job_id.to_string(),
            title: "Data Engineer".to_string(),
            description: "Build pipelines".to_string(),
            employment_type: "FULLTIME".to_string(),
            city: "Atlanta".to_string(),
            state: "GA".to_string(),
            is_remote: true,
            apply_link: "https://example.com/apply".to_string(),
            company_type: "Tech".to_string(),
            employer_name: "Acme".to_string(),
            publisher: "LinkedIn".to_string(),
            posted_at: Some(Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap()),
            offer_expiration: Some(Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap()),
            required_experience_in_months: Some(36),
            latitude: Some(33.749),
            longitude: Some(-84.388),
        }
    }

    #[tokio::test]
    async fn round_trips_a_listing_without_precision_loss() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("jobs.db")).unwrap();

        let original = listing("J1");
        store.insert(&original).await.unwrap();

        let all = store.scan_all().await.unwrap();
        assert_eq!(all, vec![original]);
    }

    #[tokio::test]
    async fn round_trips_absent_optional_fields() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("jobs.db")).unwrap();

        let mut original = listing("J2");
        original.posted_at = None;
        original.offer_expiration = None;
        original.required_experience_in_months = None;
        original.latitude = None;
        original.longitude = None;
        store.insert(&original).await.unwrap();

        let all = store.scan_all().await.unwrap();
        assert_eq!(all, vec![original]);
    }

    #[tokio::test]
    async fn duplicate_job_id_violates_the_primary_key() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("jobs.db")).unwrap();

        store.insert(&listing("J1")).await.unwrap();
        let err = store.insert(&listing("J1")).await.unwrap_err();
        assert!(matches!(err, IngestError::Database(_)));
    }

    #[tokio::test]
    async fn exists_reflects_inserted_rows() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("jobs.db")).unwrap();

        assert!(!store.exists("J1").await.unwrap());
        store.insert(&listing("J1")).await.unwrap();
        assert!(store.exists("J1").await.unwrap());
    }

    #[tokio::test]
    async fn reopening_the_store_keeps_existing_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("jobs.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.insert(&listing("J1")).await.unwrap();
        }

        let reopened = SqliteStore::open(&path).unwrap();
        assert!(reopened.exists("J1").await.unwrap());
        assert_eq!(reopened.scan_all().await.unwrap().len(), 1);
    }
}
