//! Swipe Deck Engine - the only surface the UI event layer touches
//!
//! Wires the working queue, undo history, seen tracking and refill controller
//! into one state machine. No method returns an error: every failure degrades to
//! a logged no-op or to the fallback dataset.

use super::config::DeckConfig;
use super::refill::{RefillController, RefillOutcome, RefillTrigger, SharedDeck};
use super::sample_jobs;
use super::seen_set::PersistedSeenSet;
use super::seen_tracker::SeenTracker;
use crate::domain::{
    DeckIntent, DeckState, JobPosting, PostingId, SwipeDirection, SwipeEvent, UserId,
};
use crate::port::{JobProvider, KeyValueStore, SwipeHook, TimeProvider};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Result of dispatching a UI intent
#[derive(Debug, Clone, PartialEq)]
pub enum IntentOutcome {
    /// A card was swiped
    Swiped(SwipeEvent),
    /// The latest swipe was reverted; the caller reverses any side effect it owns
    Undone(SwipeEvent),
    /// Deck cleared and a fresh refill requested
    Reset,
    /// Nothing happened (empty deck, nothing to undo, or a swipe in progress)
    Ignored,
}

/// Clears the re-entrancy flag when a gesture finishes
struct ProcessingGuard<'a>(&'a AtomicBool);

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct SwipeDeckEngine {
    deck: SharedDeck,
    refill: RefillController,
    seen: SeenTracker,
    hook: Arc<dyn SwipeHook>,
    config: Arc<DeckConfig>,
    processing: AtomicBool,
    pending_hooks: Mutex<Vec<JoinHandle<()>>>,
}

impl SwipeDeckEngine {
    /// Create an engine for one user session
    ///
    /// # Arguments
    /// * `user_id` - Authenticated user, or `None` for a guest (session-only seen set)
    /// * `store` - Persistence backend for the seen set
    /// * `provider` - Recommendation provider
    /// * `hook` - Side effect fired after each swipe
    /// * `time_provider` - Clock (injected for determinism)
    /// * `config` - Deck tunables
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(
        user_id: Option<UserId>,
        store: Arc<dyn KeyValueStore>,
        provider: Arc<dyn JobProvider>,
        hook: Arc<dyn SwipeHook>,
        time_provider: Arc<dyn TimeProvider>,
        config: DeckConfig,
    ) -> Self {
        let seen = match user_id {
            Some(user_id) => {
                let persisted = Arc::new(PersistedSeenSet::new(store));
                let (tracker, _writer) = SeenTracker::spawn(persisted, user_id);
                tracker
            }
            None => {
                info!("No authenticated user, seen history is session-only");
                SeenTracker::guest()
            }
        };

        let config = Arc::new(config);
        let deck: SharedDeck = Arc::new(Mutex::new(DeckState::new()));
        let refill = RefillController::new(
            deck.clone(),
            provider,
            seen.clone(),
            time_provider,
            config.clone(),
            sample_jobs::bundled(),
        );

        Self {
            deck,
            refill,
            seen,
            hook,
            config,
            processing: AtomicBool::new(false),
            pending_hooks: Mutex::new(Vec::new()),
        }
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.seen.user_id()
    }

    pub fn refill(&self) -> &RefillController {
        &self.refill
    }

    /// Kick off the initial load
    pub fn start(&self) -> RefillTrigger {
        self.refill.maybe_refill()
    }

    /// Card at the front of the deck
    pub fn current(&self) -> Option<JobPosting> {
        self.deck.lock().queue.current().cloned()
    }

    /// Card behind the current one (pre-render)
    pub fn peek_next(&self) -> Option<JobPosting> {
        self.deck.lock().queue.peek_next().cloned()
    }

    pub fn queue_len(&self) -> usize {
        self.deck.lock().queue.size()
    }

    /// Ids of every queued card, front first
    pub fn queued_ids(&self) -> Vec<PostingId> {
        self.deck.lock().queue.iter().map(|job| job.id.clone()).collect()
    }

    pub fn history_len(&self) -> usize {
        self.deck.lock().history.size()
    }

    /// Pass on the current card
    pub fn swipe_left(&self) -> Option<SwipeEvent> {
        self.swipe(SwipeDirection::Left)
    }

    /// Save / apply to the current card
    pub fn swipe_right(&self) -> Option<SwipeEvent> {
        self.swipe(SwipeDirection::Right)
    }

    /// Swipe the current card
    ///
    /// Returns the recorded event, or `None` if the deck is empty or another
    /// gesture is still being processed.
    pub fn swipe(&self, direction: SwipeDirection) -> Option<SwipeEvent> {
        let _guard = self.enter("swipe")?;

        let event = self.deck.lock().swipe(direction, self.config.history_cap);
        let Some(event) = event else {
            warn!(direction = %direction, "Swipe on empty deck ignored");
            self.refill.maybe_refill();
            return None;
        };

        debug!(
            posting_id = %event.job.id,
            direction = %direction,
            remaining = self.queue_len(),
            "Swiped"
        );

        self.seen.record(&event.job.id);
        self.fire_hook(event.clone());
        self.refill.maybe_refill();

        Some(event)
    }

    /// Revert the latest swipe; `false` if there is nothing to undo
    pub fn undo(&self) -> bool {
        self.undo_event().is_some()
    }

    /// Revert the latest swipe and hand back the undone event
    ///
    /// The card returns to the front and its id leaves the seen set. Side effects
    /// of a right swipe (recorded applications) are the caller's to reverse.
    pub fn undo_event(&self) -> Option<SwipeEvent> {
        let _guard = self.enter("undo")?;

        let event = self.deck.lock().undo()?;
        self.seen.forget(&event.job.id);

        info!(
            posting_id = %event.job.id,
            direction = %event.direction,
            "Swipe undone"
        );
        Some(event)
    }

    /// Clear the deck and history, then refill from the provider's first page
    /// (filters changed). Results of a fetch already in flight are discarded.
    pub fn reset(&self) -> RefillTrigger {
        self.deck.lock().reset();
        info!("Deck reset");
        self.refill.restart()
    }

    /// Map a UI intent to its engine method
    pub fn dispatch(&self, intent: DeckIntent) -> IntentOutcome {
        match intent {
            DeckIntent::SwipeLeft => self
                .swipe_left()
                .map_or(IntentOutcome::Ignored, IntentOutcome::Swiped),
            DeckIntent::SwipeRight => self
                .swipe_right()
                .map_or(IntentOutcome::Ignored, IntentOutcome::Swiped),
            DeckIntent::Undo => self
                .undo_event()
                .map_or(IntentOutcome::Ignored, IntentOutcome::Undone),
            DeckIntent::ResetFilters => {
                self.reset();
                IntentOutcome::Reset
            }
        }
    }

    /// Wait for background work started so far: swipe hooks, the latest refill
    /// and queued seen-set writes. Returns the refill outcome, if one was pending.
    pub async fn settle(&self) -> Option<RefillOutcome> {
        let hooks: Vec<_> = std::mem::take(&mut *self.pending_hooks.lock());
        for hook in hooks {
            let _ = hook.await;
        }
        let outcome = self.refill.wait_idle().await;
        self.seen.flush().await;
        outcome
    }

    fn enter(&self, action: &str) -> Option<ProcessingGuard<'_>> {
        if self
            .processing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!(action, "Gesture already being processed, ignoring");
            return None;
        }
        Some(ProcessingGuard(&self.processing))
    }

    fn fire_hook(&self, event: SwipeEvent) {
        let hook = self.hook.clone();
        let user_id = self.seen.user_id().cloned();
        let handle = tokio::spawn(async move {
            if let Err(e) = hook.on_swipe(user_id.as_ref(), &event).await {
                warn!(posting_id = %event.job.id, error = %e, "Swipe hook failed");
            }
        });

        let mut pending = self.pending_hooks.lock();
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }
}
