use crate::error::Result;
use crate::storage::JobStore;
use tracing::debug;

/// Returns true when no listing with this `job_id` has been persisted yet.
///
/// The check and the subsequent insert are not one atomic step; this is
/// only correct under the single-writer batch model the pipeline assumes.
/// The store's own unique-key constraint backstops the race.
pub async fn is_new(job_id: &str, store: &dyn JobStore) -> Result<bool> {
    let exists = store.exists(job_id).await?;
    if exists {
        debug!(job_id, "listing already persisted, treating as duplicate");
    }
    Ok(!exists)
}
