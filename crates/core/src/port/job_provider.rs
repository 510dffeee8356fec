// Job Provider Port (recommendation service)

use crate::domain::JobPosting;
use crate::error::Result;
use async_trait::async_trait;

/// Paginated source of candidate postings
///
/// Treated as a black box: ranking, paging and network retries are the
/// provider's business. The engine only asks for the next page.
#[async_trait]
pub trait JobProvider: Send + Sync {
    /// Fetch the next page of candidates
    ///
    /// # Arguments
    /// * `page_size` - Maximum number of postings wanted
    /// * `force_reset` - Restart from the first page (filters changed)
    async fn fetch_jobs(&self, page_size: usize, force_reset: bool) -> Result<Vec<JobPosting>>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::watch;

    /// Scripted provider response
    #[derive(Debug, Clone)]
    pub enum MockResponse {
        /// Return these postings
        Jobs(Vec<JobPosting>),
        /// Fail with message
        Fail(String),
        /// Never resolve (timeout testing)
        Hang,
    }

    /// Mock provider with scripted responses and a gate to hold fetches pending
    pub struct MockJobProvider {
        script: Mutex<VecDeque<MockResponse>>,
        fallback: Mutex<MockResponse>,
        call_count: AtomicUsize,
        force_resets: Mutex<Vec<bool>>,
        gate: watch::Sender<bool>,
    }

    impl MockJobProvider {
        /// Provider that answers every call with `response`
        pub fn new(response: MockResponse) -> Self {
            let (gate, _) = watch::channel(true);
            Self {
                script: Mutex::new(VecDeque::new()),
                fallback: Mutex::new(response),
                call_count: AtomicUsize::new(0),
                force_resets: Mutex::new(Vec::new()),
                gate,
            }
        }

        pub fn with_jobs(jobs: Vec<JobPosting>) -> Self {
            Self::new(MockResponse::Jobs(jobs))
        }

        pub fn failing(message: impl Into<String>) -> Self {
            Self::new(MockResponse::Fail(message.into()))
        }

        /// Queue a one-shot response, served before the default
        pub fn push_response(&self, response: MockResponse) {
            self.script.lock().push_back(response);
        }

        pub fn set_default(&self, response: MockResponse) {
            *self.fallback.lock() = response;
        }

        /// Hold every fetch pending until `release` is called
        pub fn hold(&self) {
            self.gate.send_replace(false);
        }

        pub fn release(&self) {
            self.gate.send_replace(true);
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        /// `force_reset` argument of every call, in order
        pub fn force_resets(&self) -> Vec<bool> {
            self.force_resets.lock().clone()
        }
    }

    #[async_trait]
    impl JobProvider for MockJobProvider {
        async fn fetch_jobs(
            &self,
            page_size: usize,
            force_reset: bool,
        ) -> Result<Vec<JobPosting>> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            self.force_resets.lock().push(force_reset);

            let response = {
                let scripted = self.script.lock().pop_front();
                scripted.unwrap_or_else(|| self.fallback.lock().clone())
            };

            let mut gate = self.gate.subscribe();
            let _ = gate.wait_for(|open| *open).await;

            match response {
                MockResponse::Jobs(mut jobs) => {
                    jobs.truncate(page_size);
                    Ok(jobs)
                }
                MockResponse::Fail(msg) => Err(AppError::Provider(msg)),
                MockResponse::Hang => {
                    std::future::pending::<()>().await;
                    Ok(Vec::new())
                }
            }
        }
    }
}
