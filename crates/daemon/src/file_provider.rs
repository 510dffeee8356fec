// JSON-file Job Provider
// Pages through a JSON array of postings; stands in for a recommendation service

use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::PathBuf;
use swipedeck_core::domain::JobPosting;
use swipedeck_core::error::{AppError, Result};
use swipedeck_core::port::JobProvider;
use tracing::debug;

/// Serves pages from a file re-read on every fetch
///
/// The cursor wraps to the first page once the file is exhausted, so a long
/// session sees repeats (which the seen filter then has to deal with).
pub struct FileJobProvider {
    path: Option<PathBuf>,
    cursor: Mutex<usize>,
}

impl FileJobProvider {
    /// Provider backed by `path`; with `None` every fetch fails (bundled samples are served)
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            cursor: Mutex::new(0),
        }
    }
}

#[async_trait]
impl JobProvider for FileJobProvider {
    async fn fetch_jobs(&self, page_size: usize, force_reset: bool) -> Result<Vec<JobPosting>> {
        let Some(path) = &self.path else {
            return Err(AppError::Provider("no jobs file configured".to_string()));
        };

        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::Provider(format!("failed to read {}: {}", path.display(), e))
        })?;
        let jobs: Vec<JobPosting> = serde_json::from_str(&raw)?;

        let mut cursor = self.cursor.lock();
        if force_reset || *cursor >= jobs.len() {
            *cursor = 0;
        }
        let start = *cursor;
        let end = (start + page_size).min(jobs.len());
        *cursor = end;

        debug!(start, end, total = jobs.len(), "Served page from jobs file");
        Ok(jobs[start..end].to_vec())
    }
}
