// Bundled sample postings (degraded-mode fallback)

use crate::domain::JobPosting;
use tracing::error;

const SAMPLE_JOBS_JSON: &str = include_str!("../../data/sample_jobs.json");

/// Parse the bundled sample set
///
/// Returns an empty list (and logs) if the bundled data cannot be decoded.
pub fn bundled() -> Vec<JobPosting> {
    match serde_json::from_str::<Vec<JobPosting>>(SAMPLE_JOBS_JSON) {
        Ok(jobs) => jobs,
        Err(e) => {
            error!(error = %e, "Bundled sample jobs are malformed");
            Vec::new()
        }
    }
}
