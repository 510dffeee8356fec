//! Refill Controller - keeps the working queue stocked from the job provider
//!
//! State machine: Idle -> Fetching on `maybe_refill()` when the queue is below the
//! low watermark, no fetch is in flight and the debounce interval has passed.
//! Fetching -> Idle when the fetch completes, fails or hits the hard timeout.
//!
//! The Fetching flag is set synchronously before the fetch task is spawned, so two
//! back-to-back calls can never both start a fetch. Every fetch is tagged with the
//! generation current at its start; `restart()` bumps the generation and results
//! from older generations are dropped.

use super::config::DeckConfig;
use super::seen_tracker::SeenTracker;
use crate::domain::{DeckState, JobPosting};
use crate::port::{JobProvider, TimeProvider};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, warn};

/// Deck state shared between the engine and the refill task
pub type SharedDeck = Arc<Mutex<DeckState>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefillPhase {
    Idle,
    Fetching,
}

/// Why `maybe_refill` did not start a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Queue holds at least `low_watermark` cards
    AboveWatermark,
    /// A fetch is already in flight
    InFlight,
    /// Previous attempt was less than `min_refill_interval` ago
    Debounced,
}

/// Result of a `maybe_refill` / `restart` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefillTrigger {
    Started { generation: u64 },
    Skipped(SkipReason),
}

impl RefillTrigger {
    pub fn started(&self) -> bool {
        matches!(self, RefillTrigger::Started { .. })
    }
}

/// How a fetch ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefillOutcome {
    /// Provider answered; unseen postings were appended
    Appended { fetched: usize, added: usize },
    /// Provider answered with almost nothing new; seen history was reset and the
    /// unfiltered page appended
    Starved { fetched: usize, added: usize },
    /// Provider failed or timed out; bundled sample postings were appended
    Fallback { added: usize },
    /// A `restart()` happened while this fetch was in flight; results discarded
    Stale { generation: u64 },
}

struct RefillState {
    phase: RefillPhase,
    generation: u64,
    last_attempt_ms: Option<i64>,
    task: Option<JoinHandle<RefillOutcome>>,
    // A retry is parked until the debounce interval ends
    deferred: bool,
}

/// Returns the controller to Idle when a fetch task ends, however it ends.
/// Does nothing if a newer generation has taken over.
struct InFlightGuard {
    state: Arc<Mutex<RefillState>>,
    generation: u64,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        if state.generation == self.generation && state.phase == RefillPhase::Fetching {
            state.phase = RefillPhase::Idle;
        }
    }
}

#[derive(Clone)]
pub struct RefillController {
    deck: SharedDeck,
    provider: Arc<dyn JobProvider>,
    seen: SeenTracker,
    time_provider: Arc<dyn TimeProvider>,
    config: Arc<DeckConfig>,
    fallback_jobs: Arc<Vec<JobPosting>>,
    state: Arc<Mutex<RefillState>>,
}

impl RefillController {
    /// Create a refill controller
    ///
    /// # Arguments
    /// * `deck` - Deck state shared with the engine
    /// * `provider` - Source of candidate postings
    /// * `seen` - Seen-set tracker of the current user (or guest)
    /// * `time_provider` - Clock for the debounce
    /// * `config` - Watermark, debounce, timeout and starvation settings
    /// * `fallback_jobs` - Postings served when the provider fails
    pub fn new(
        deck: SharedDeck,
        provider: Arc<dyn JobProvider>,
        seen: SeenTracker,
        time_provider: Arc<dyn TimeProvider>,
        config: Arc<DeckConfig>,
        fallback_jobs: Vec<JobPosting>,
    ) -> Self {
        Self {
            deck,
            provider,
            seen,
            time_provider,
            config,
            fallback_jobs: Arc::new(fallback_jobs),
            state: Arc::new(Mutex::new(RefillState {
                phase: RefillPhase::Idle,
                generation: 0,
                last_attempt_ms: None,
                task: None,
                deferred: false,
            })),
        }
    }

    pub fn phase(&self) -> RefillPhase {
        self.state.lock().phase
    }

    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    /// Start a fetch if the queue is low, nothing is in flight and the debounce
    /// interval has elapsed. A call while Fetching is a no-op, not a queued retry.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn maybe_refill(&self) -> RefillTrigger {
        let queued = self.deck.lock().queue.size();
        let mut state = self.state.lock();

        if queued >= self.config.low_watermark {
            return RefillTrigger::Skipped(SkipReason::AboveWatermark);
        }

        if state.phase == RefillPhase::Fetching {
            debug!(generation = state.generation, "Refill already in flight, skipping");
            return RefillTrigger::Skipped(SkipReason::InFlight);
        }

        let now = self.time_provider.now_millis();
        if let Some(last) = state.last_attempt_ms {
            let interval_ms = self.config.min_refill_interval_millis();
            if now - last < interval_ms {
                debug!(since_last_ms = now - last, "Refill debounced");
                self.defer(&mut state, interval_ms - (now - last));
                return RefillTrigger::Skipped(SkipReason::Debounced);
            }
        }

        self.start_fetch(&mut state, now, false)
    }

    /// Abandon any in-flight fetch and start a fresh one from the provider's first
    /// page, ignoring watermark and debounce (filters changed).
    pub fn restart(&self) -> RefillTrigger {
        let mut state = self.state.lock();
        state.generation += 1;
        state.phase = RefillPhase::Idle;

        let now = self.time_provider.now_millis();
        self.start_fetch(&mut state, now, true)
    }

    /// Wait for the most recently started fetch to finish
    ///
    /// Returns `None` if no fetch was started since the last call, or if the
    /// fetch task panicked.
    pub async fn wait_idle(&self) -> Option<RefillOutcome> {
        let task = self.state.lock().task.take()?;
        match task.await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                error!(error = %e, "Refill task failed");
                None
            }
        }
    }

    /// Park one retry for when the debounce interval ends, so a deck drained
    /// inside the interval still gets refilled. At most one retry is pending.
    fn defer(&self, state: &mut RefillState, wait_ms: i64) {
        if state.deferred {
            return;
        }
        state.deferred = true;

        let wait = Duration::from_millis(u64::try_from(wait_ms).unwrap_or(0));
        let deadline = Instant::now() + wait;
        let this = self.clone();
        tokio::spawn(async move {
            sleep_until(deadline).await;
            this.state.lock().deferred = false;
            let trigger = this.maybe_refill();
            debug!(trigger = ?trigger, "Deferred refill attempt");
        });
    }

    fn start_fetch(&self, state: &mut RefillState, now: i64, force_reset: bool) -> RefillTrigger {
        state.phase = RefillPhase::Fetching;
        state.last_attempt_ms = Some(now);
        let generation = state.generation;

        info!(generation, force_reset, "Refill started");

        let guard = InFlightGuard {
            state: self.state.clone(),
            generation,
        };
        let this = self.clone();
        state.task = Some(tokio::spawn(async move {
            let _guard = guard;
            this.run_fetch(generation, force_reset).await
        }));

        RefillTrigger::Started { generation }
    }

    async fn run_fetch(&self, generation: u64, force_reset: bool) -> RefillOutcome {
        let result = tokio::time::timeout(
            self.config.fetch_timeout,
            self.provider.fetch_jobs(self.config.page_size, force_reset),
        )
        .await;

        let fetched = match result {
            Ok(Ok(jobs)) => Some(jobs),
            Ok(Err(e)) => {
                warn!(generation, error = %e, "Job provider failed");
                None
            }
            Err(_) => {
                warn!(
                    generation,
                    timeout_ms = self.config.fetch_timeout.as_millis() as u64,
                    "Job provider timed out"
                );
                None
            }
        };

        let seen = self.seen.snapshot().await;

        let mut deck = self.deck.lock();
        let current_generation = self.state.lock().generation;
        if current_generation != generation {
            info!(generation, current_generation, "Discarding stale refill results");
            return RefillOutcome::Stale { generation };
        }

        let Some(jobs) = fetched else {
            let added = deck.append_unseen(self.fallback_jobs.as_ref().clone(), &seen);
            warn!(generation, added, "Degraded mode: serving bundled sample jobs");
            return RefillOutcome::Fallback { added };
        };

        let fetched_count = jobs.len();
        let unseen = deck.count_unseen(&jobs, &seen);
        let starved = self.config.reset_seen_on_starvation
            && fetched_count > 0
            && unseen < self.config.starvation_threshold;

        if starved {
            // Enqueued under the deck lock so no later swipe is wiped by the reset
            self.seen.clear();
            deck.forget_session_seen();
            let added = deck.append_all(jobs);
            info!(
                generation,
                fetched = fetched_count,
                unseen,
                added,
                "Provider starved of new jobs, seen history reset"
            );
            return RefillOutcome::Starved {
                fetched: fetched_count,
                added,
            };
        }

        let added = deck.append_unseen(jobs, &seen);
        info!(
            generation,
            fetched = fetched_count,
            added,
            queued = deck.queue.size(),
            "Refill completed"
        );
        RefillOutcome::Appended {
            fetched: fetched_count,
            added,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::seen_set::PersistedSeenSet;
    use crate::port::job_provider::mocks::{MockJobProvider, MockResponse};
    use crate::port::kv_store::mocks::InMemoryKvStore;
    use crate::port::time_provider::mocks::MockTimeProvider;

    fn jobs(prefix: &str, n: usize) -> Vec<JobPosting> {
        (0..n)
            .map(|i| JobPosting::bare(format!("{}{}", prefix, i)))
            .collect()
    }

    struct Fixture {
        deck: SharedDeck,
        provider: Arc<MockJobProvider>,
        clock: Arc<MockTimeProvider>,
        seen: Arc<PersistedSeenSet>,
        tracker: SeenTracker,
        controller: RefillController,
    }

    fn fixture_with(provider: MockJobProvider, config: DeckConfig) -> Fixture {
        let deck: SharedDeck = Arc::new(Mutex::new(DeckState::new()));
        let provider = Arc::new(provider);
        let clock = Arc::new(MockTimeProvider::new(1_000_000));
        let seen = Arc::new(PersistedSeenSet::new(Arc::new(InMemoryKvStore::new())));
        let (tracker, _handle) = SeenTracker::spawn(seen.clone(), "alice");
        let controller = RefillController::new(
            deck.clone(),
            provider.clone(),
            tracker.clone(),
            clock.clone(),
            Arc::new(config),
            jobs("sample", 3),
        );
        Fixture {
            deck,
            provider,
            clock,
            seen,
            tracker,
            controller,
        }
    }

    fn fixture(provider: MockJobProvider) -> Fixture {
        fixture_with(provider, DeckConfig::default())
    }

    #[tokio::test]
    async fn test_refill_appends_when_below_watermark() {
        let f = fixture(MockJobProvider::with_jobs(jobs("j", 10)));

        assert!(f.controller.maybe_refill().started());
        let outcome = f.controller.wait_idle().await.unwrap();

        assert_eq!(outcome, RefillOutcome::Appended { fetched: 10, added: 10 });
        assert_eq!(f.deck.lock().queue.size(), 10);
        assert_eq!(f.controller.phase(), RefillPhase::Idle);
    }

    #[tokio::test]
    async fn test_no_refill_above_watermark() {
        let f = fixture(MockJobProvider::with_jobs(jobs("j", 10)));
        f.deck.lock().append_all(jobs("q", 5));

        assert_eq!(
            f.controller.maybe_refill(),
            RefillTrigger::Skipped(SkipReason::AboveWatermark)
        );
        assert_eq!(f.provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_single_flight_while_fetching() {
        let f = fixture(MockJobProvider::with_jobs(jobs("j", 10)));
        f.deck.lock().append_all(jobs("q", 4));
        f.provider.hold();

        assert!(f.controller.maybe_refill().started());
        assert_eq!(
            f.controller.maybe_refill(),
            RefillTrigger::Skipped(SkipReason::InFlight)
        );
        assert_eq!(f.controller.phase(), RefillPhase::Fetching);

        f.provider.release();
        f.controller.wait_idle().await.unwrap();
        assert_eq!(f.provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_debounce_blocks_rapid_attempts() {
        let f = fixture(MockJobProvider::with_jobs(Vec::new()));

        assert!(f.controller.maybe_refill().started());
        f.controller.wait_idle().await;

        f.clock.advance_millis(500);
        assert_eq!(
            f.controller.maybe_refill(),
            RefillTrigger::Skipped(SkipReason::Debounced)
        );

        f.clock.advance_millis(1_500);
        assert!(f.controller.maybe_refill().started());
        f.controller.wait_idle().await;
        assert_eq!(f.provider.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounced_refill_retries_after_interval() {
        let f = fixture(MockJobProvider::with_jobs(jobs("j", 10)));
        f.provider.push_response(MockResponse::Jobs(Vec::new()));

        assert!(f.controller.maybe_refill().started());
        f.controller.wait_idle().await;

        f.clock.advance_millis(500);
        assert_eq!(
            f.controller.maybe_refill(),
            RefillTrigger::Skipped(SkipReason::Debounced)
        );
        assert_eq!(
            f.controller.maybe_refill(),
            RefillTrigger::Skipped(SkipReason::Debounced)
        );

        // No user input after this point
        f.clock.advance_millis(1_500);
        tokio::time::sleep(Duration::from_secs(2)).await;
        let outcome = f.controller.wait_idle().await;

        assert_eq!(outcome, Some(RefillOutcome::Appended { fetched: 10, added: 10 }));
        assert_eq!(f.provider.call_count(), 2);
        assert_eq!(f.deck.lock().queue.size(), 10);
    }

    #[tokio::test]
    async fn test_seen_ids_are_filtered() {
        let f = fixture(MockJobProvider::with_jobs(jobs("j", 10)));
        f.tracker.record("j0");
        f.tracker.record("j1");

        f.controller.maybe_refill();
        let outcome = f.controller.wait_idle().await.unwrap();

        assert_eq!(outcome, RefillOutcome::Appended { fetched: 10, added: 8 });
        let deck = f.deck.lock();
        assert!(!deck.queue.contains("j0"));
        assert!(!deck.queue.contains("j1"));
    }

    #[tokio::test]
    async fn test_starvation_resets_seen_and_appends_everything() {
        let f = fixture(MockJobProvider::with_jobs(jobs("j", 10)));
        for i in 0..9 {
            f.tracker.record(&format!("j{}", i));
        }

        f.controller.maybe_refill();
        let outcome = f.controller.wait_idle().await.unwrap();

        assert_eq!(outcome, RefillOutcome::Starved { fetched: 10, added: 10 });
        assert_eq!(f.deck.lock().queue.size(), 10);
        f.tracker.flush().await;
        assert!(f.seen.load("alice").await.is_empty());
    }

    #[tokio::test]
    async fn test_starvation_policy_can_be_disabled() {
        let config = DeckConfig {
            reset_seen_on_starvation: false,
            ..DeckConfig::default()
        };
        let f = fixture_with(MockJobProvider::with_jobs(jobs("j", 10)), config);
        for i in 0..9 {
            f.tracker.record(&format!("j{}", i));
        }

        f.controller.maybe_refill();
        let outcome = f.controller.wait_idle().await.unwrap();

        assert_eq!(outcome, RefillOutcome::Appended { fetched: 10, added: 1 });
        assert_eq!(f.seen.load("alice").await.len(), 9);
    }

    #[tokio::test]
    async fn test_empty_page_is_not_starvation() {
        let f = fixture(MockJobProvider::with_jobs(Vec::new()));
        f.tracker.record("j0");

        f.controller.maybe_refill();
        let outcome = f.controller.wait_idle().await.unwrap();

        assert_eq!(outcome, RefillOutcome::Appended { fetched: 0, added: 0 });
        assert_eq!(f.seen.load("alice").await.len(), 1);
    }

    #[tokio::test]
    async fn test_provider_failure_falls_back_to_samples() {
        let f = fixture(MockJobProvider::failing("network down"));
        f.tracker.record("sample0");

        f.controller.maybe_refill();
        let outcome = f.controller.wait_idle().await.unwrap();

        assert_eq!(outcome, RefillOutcome::Fallback { added: 2 });
        assert!(!f.deck.lock().queue.contains("sample0"));
        assert_eq!(f.controller.phase(), RefillPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hard_timeout_returns_to_idle() {
        let config = DeckConfig {
            fetch_timeout: Duration::from_secs(30),
            ..DeckConfig::default()
        };
        let f = fixture_with(MockJobProvider::new(MockResponse::Hang), config);

        assert!(f.controller.maybe_refill().started());
        let outcome = f.controller.wait_idle().await.unwrap();

        assert_eq!(outcome, RefillOutcome::Fallback { added: 3 });
        assert_eq!(f.controller.phase(), RefillPhase::Idle);
    }

    #[tokio::test]
    async fn test_restart_discards_stale_results() {
        let f = fixture(MockJobProvider::with_jobs(jobs("new", 6)));
        f.provider.push_response(MockResponse::Jobs(jobs("old", 6)));
        f.provider.hold();

        assert_eq!(
            f.controller.maybe_refill(),
            RefillTrigger::Started { generation: 0 }
        );
        let stale_task = f.controller.state.lock().task.take().unwrap();

        assert_eq!(f.controller.restart(), RefillTrigger::Started { generation: 1 });
        f.provider.release();

        assert_eq!(stale_task.await.unwrap(), RefillOutcome::Stale { generation: 0 });
        f.controller.wait_idle().await.unwrap();

        let deck = f.deck.lock();
        assert!(deck.queue.contains("new0"));
        assert!(!deck.queue.contains("old0"));
        assert_eq!(f.provider.force_resets(), vec![false, true]);
    }

    #[tokio::test]
    async fn test_restart_ignores_debounce_and_watermark() {
        let f = fixture(MockJobProvider::with_jobs(jobs("j", 3)));
        f.deck.lock().append_all(jobs("q", 10));

        f.controller.maybe_refill();
        assert!(f.controller.restart().started());
        f.controller.wait_idle().await;

        assert_eq!(f.provider.call_count(), 1);
        assert_eq!(f.provider.force_resets(), vec![true]);
        assert_eq!(f.deck.lock().queue.size(), 13);
    }
}
