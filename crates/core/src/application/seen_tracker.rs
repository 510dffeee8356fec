//! Seen Tracker - ordered, fire-and-forget writes to the persisted seen set
//!
//! Swipes and undos enqueue operations on an unbounded channel; one background
//! task applies them in arrival order, so an undo can never be overtaken by the
//! add it reverses. Guest sessions get a tracker with no backing store.

use super::seen_set::PersistedSeenSet;
use crate::domain::{PostingId, UserId};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

enum SeenOp {
    Add(PostingId),
    Remove(PostingId),
    Reset,
    Flush(oneshot::Sender<()>),
}

struct Backing {
    user_id: UserId,
    seen: Arc<PersistedSeenSet>,
    tx: mpsc::UnboundedSender<SeenOp>,
}

/// Handle to the seen-set write queue of one user
///
/// Cheap to clone; the writer task stops once every clone is dropped.
#[derive(Clone)]
pub struct SeenTracker {
    backing: Option<Arc<Backing>>,
}

impl SeenTracker {
    /// Start the writer task for an authenticated user
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(seen: Arc<PersistedSeenSet>, user_id: impl Into<UserId>) -> (Self, JoinHandle<()>) {
        let user_id = user_id.into();
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_writer(seen.clone(), user_id.clone(), rx));

        let tracker = Self {
            backing: Some(Arc::new(Backing { user_id, seen, tx })),
        };
        (tracker, handle)
    }

    /// Session-only tracker (no authenticated user)
    pub fn guest() -> Self {
        Self { backing: None }
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.backing.as_ref().map(|b| &b.user_id)
    }

    pub fn is_guest(&self) -> bool {
        self.backing.is_none()
    }

    /// Queue an add (swipe)
    pub fn record(&self, id: &str) {
        self.send(SeenOp::Add(id.to_string()));
    }

    /// Queue a removal (undo)
    pub fn forget(&self, id: &str) {
        self.send(SeenOp::Remove(id.to_string()));
    }

    /// Queue a full reset (starvation)
    pub fn clear(&self) {
        self.send(SeenOp::Reset);
    }

    /// Wait until every operation queued so far has been applied
    pub async fn flush(&self) {
        let Some(backing) = &self.backing else {
            return;
        };
        let (done_tx, done_rx) = oneshot::channel();
        if backing.tx.send(SeenOp::Flush(done_tx)).is_err() {
            return;
        }
        let _ = done_rx.await;
    }

    /// Current persisted seen ids, after pending writes have landed
    ///
    /// Empty for guests and on read failure.
    pub async fn snapshot(&self) -> HashSet<PostingId> {
        let Some(backing) = &self.backing else {
            return HashSet::new();
        };
        self.flush().await;
        backing.seen.load(&backing.user_id).await
    }

    fn send(&self, op: SeenOp) {
        if let Some(backing) = &self.backing {
            if backing.tx.send(op).is_err() {
                warn!(user_id = %backing.user_id, "Seen writer stopped, dropping operation");
            }
        }
    }
}

async fn run_writer(
    seen: Arc<PersistedSeenSet>,
    user_id: UserId,
    mut rx: mpsc::UnboundedReceiver<SeenOp>,
) {
    debug!(user_id = %user_id, "Seen writer started");
    while let Some(op) = rx.recv().await {
        match op {
            SeenOp::Add(id) => seen.add_one(&user_id, &id).await,
            SeenOp::Remove(id) => seen.remove_one(&user_id, &id).await,
            SeenOp::Reset => {
                seen.reset(&user_id).await;
                info!(user_id = %user_id, "Seen history reset");
            }
            SeenOp::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!(user_id = %user_id, "Seen writer stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::kv_store::mocks::InMemoryKvStore;

    fn setup() -> (Arc<PersistedSeenSet>, SeenTracker) {
        let seen = Arc::new(PersistedSeenSet::new(Arc::new(InMemoryKvStore::new())));
        let (tracker, _handle) = SeenTracker::spawn(seen.clone(), "alice");
        (seen, tracker)
    }

    #[tokio::test]
    async fn test_operations_apply_in_order() {
        let (seen, tracker) = setup();

        tracker.record("j1");
        tracker.record("j2");
        tracker.forget("j1");
        tracker.flush().await;

        let ids = seen.load("alice").await;
        assert!(!ids.contains("j1"));
        assert!(ids.contains("j2"));
    }

    #[tokio::test]
    async fn test_clear_then_record() {
        let (_seen, tracker) = setup();

        tracker.record("j1");
        tracker.clear();
        tracker.record("j2");

        let ids = tracker.snapshot().await;
        assert_eq!(ids.len(), 1);
        assert!(ids.contains("j2"));
    }

    #[tokio::test]
    async fn test_guest_tracker_is_inert() {
        let tracker = SeenTracker::guest();
        tracker.record("j1");
        tracker.flush().await;

        assert!(tracker.is_guest());
        assert!(tracker.user_id().is_none());
        assert!(tracker.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_writer_stops_when_handles_dropped() {
        let seen = Arc::new(PersistedSeenSet::new(Arc::new(InMemoryKvStore::new())));
        let (tracker, handle) = SeenTracker::spawn(seen, "alice");
        let clone = tracker.clone();

        drop(tracker);
        drop(clone);

        handle.await.unwrap();
    }
}
