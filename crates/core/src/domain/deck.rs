// Deck State - queue, undo history and session-seen ids for one user session

use super::history::SwipeHistoryStack;
use super::posting::{JobPosting, PostingId, SwipeDirection, SwipeEvent};
use super::queue::WorkingQueue;
use std::collections::HashSet;

/// In-memory state of one deck
///
/// All mutations are synchronous. The application layer wraps this in a lock and
/// never holds that lock across an await point.
#[derive(Debug, Default)]
pub struct DeckState {
    pub queue: WorkingQueue,
    pub history: SwipeHistoryStack,
    /// Ids swiped this session whose persistence write may not have landed yet
    session_seen: HashSet<PostingId>,
    /// Swipes since the last reset, net of undos
    swiped: usize,
}

impl DeckState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove the front card and record it in the history.
    ///
    /// Returns `None` (no mutation) when the queue is empty.
    pub fn swipe(&mut self, direction: SwipeDirection, history_cap: usize) -> Option<SwipeEvent> {
        let job = self.queue.remove_front().ok()?;
        let event = SwipeEvent::new(job, direction, self.swiped);
        self.swiped += 1;
        self.session_seen.insert(event.job.id.clone());
        self.history.push_bounded(event.clone(), history_cap);
        Some(event)
    }

    /// Pop the latest swipe and put its card back at the front.
    ///
    /// A starvation refill may have re-queued the same id in the meantime; that copy
    /// is dropped so the card appears exactly once.
    pub fn undo(&mut self) -> Option<SwipeEvent> {
        let event = self.history.pop()?;
        self.swiped = self.swiped.saturating_sub(1);
        self.session_seen.remove(&event.job.id);
        self.queue.remove(&event.job.id);
        self.queue.insert_front(event.job.clone());
        Some(event)
    }

    /// Append fetched postings, skipping ids in `seen` and in this session's swipes.
    /// Returns the number appended.
    pub fn append_unseen(&mut self, jobs: Vec<JobPosting>, seen: &HashSet<PostingId>) -> usize {
        let fresh = jobs
            .into_iter()
            .filter(|j| !seen.contains(&j.id) && !self.session_seen.contains(&j.id));
        self.queue.append(fresh)
    }

    /// Append postings without seen filtering (starvation path)
    pub fn append_all(&mut self, jobs: Vec<JobPosting>) -> usize {
        self.queue.append(jobs)
    }

    /// Whether the id was swiped in this session
    pub fn is_session_seen(&self, id: &str) -> bool {
        self.session_seen.contains(id)
    }

    /// Count postings that would survive seen filtering
    pub fn count_unseen(&self, jobs: &[JobPosting], seen: &HashSet<PostingId>) -> usize {
        jobs.iter()
            .filter(|j| !seen.contains(&j.id) && !self.session_seen.contains(&j.id))
            .count()
    }

    pub fn forget_session_seen(&mut self) {
        self.session_seen.clear();
    }

    /// Clear queue and history (filter change)
    pub fn reset(&mut self) {
        self.queue.clear();
        self.history.clear();
        self.swiped = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck_of(ids: &[&str]) -> DeckState {
        let mut deck = DeckState::new();
        deck.append_all(ids.iter().map(|id| JobPosting::bare(*id)).collect());
        deck
    }

    #[test]
    fn test_swipe_then_undo_restores_front() {
        let mut deck = deck_of(&["j1", "j2", "j3"]);

        let event = deck.swipe(SwipeDirection::Right, 10).unwrap();
        assert_eq!(event.job.id, "j1");
        assert_eq!(deck.queue.current().unwrap().id, "j2");
        assert!(deck.is_session_seen("j1"));
        assert_eq!(deck.history.size(), 1);

        let undone = deck.undo().unwrap();
        assert_eq!(undone.job.id, "j1");
        assert_eq!(deck.queue.current().unwrap().id, "j1");
        assert!(!deck.is_session_seen("j1"));
        assert!(deck.history.is_empty());
    }

    #[test]
    fn test_swipe_on_empty_deck_is_noop() {
        let mut deck = DeckState::new();
        assert!(deck.swipe(SwipeDirection::Left, 10).is_none());
        assert!(deck.history.is_empty());
    }

    #[test]
    fn test_append_unseen_skips_persisted_and_session_ids() {
        let mut deck = deck_of(&["j1"]);
        deck.swipe(SwipeDirection::Left, 10);

        let seen: HashSet<PostingId> = ["j2".to_string()].into_iter().collect();
        let fetched = vec![
            JobPosting::bare("j1"),
            JobPosting::bare("j2"),
            JobPosting::bare("j3"),
        ];

        assert_eq!(deck.count_unseen(&fetched, &seen), 1);
        assert_eq!(deck.append_unseen(fetched, &seen), 1);
        assert_eq!(deck.queue.current().unwrap().id, "j3");
    }

    #[test]
    fn test_undo_after_requeue_keeps_single_copy() {
        let mut deck = deck_of(&["j1", "j2"]);
        deck.swipe(SwipeDirection::Left, 10);
        deck.forget_session_seen();
        deck.append_all(vec![JobPosting::bare("j1")]);

        deck.undo();
        let ids: Vec<_> = deck.queue.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["j1", "j2"]);
    }

    #[test]
    fn test_history_index_tracks_swipe_count() {
        let mut deck = deck_of(&["j1", "j2"]);
        let first = deck.swipe(SwipeDirection::Left, 10).unwrap();
        let second = deck.swipe(SwipeDirection::Left, 10).unwrap();
        assert_eq!(first.queue_index_at_swipe, 0);
        assert_eq!(second.queue_index_at_swipe, 1);
    }
}
