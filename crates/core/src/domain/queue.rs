// Working Queue Domain Model

use super::error::{DomainError, Result};
use super::posting::JobPosting;
use std::collections::VecDeque;

/// Ordered sequence of postings eligible for display
///
/// Swiped cards are physically removed, so the "cursor" always sits at the front.
/// `append` de-duplicates by posting id; `insert_front` does not.
#[derive(Debug, Default, Clone)]
pub struct WorkingQueue {
    items: VecDeque<JobPosting>,
}

impl WorkingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Card at the front of the queue
    pub fn current(&self) -> Option<&JobPosting> {
        self.items.front()
    }

    /// Second card (UI pre-render)
    pub fn peek_next(&self) -> Option<&JobPosting> {
        self.items.get(1)
    }

    /// Pop the front card
    ///
    /// # Errors
    /// - `DomainError::EmptyQueue` if there is nothing to remove
    pub fn remove_front(&mut self) -> Result<JobPosting> {
        self.items.pop_front().ok_or(DomainError::EmptyQueue)
    }

    /// Put a card back at the front (undo). Duplicate checks are the caller's job.
    pub fn insert_front(&mut self, job: JobPosting) {
        self.items.push_front(job);
    }

    /// Append postings whose id is not already queued
    ///
    /// Duplicates inside `jobs` itself are also dropped (first one wins).
    /// Returns the number of postings actually appended.
    pub fn append(&mut self, jobs: impl IntoIterator<Item = JobPosting>) -> usize {
        let mut added = 0;
        for job in jobs {
            if self.contains(&job.id) {
                continue;
            }
            self.items.push_back(job);
            added += 1;
        }
        added
    }

    /// Remove the posting with `id`, wherever it sits
    pub fn remove(&mut self, id: &str) -> Option<JobPosting> {
        let pos = self.items.iter().position(|j| j.id == id)?;
        self.items.remove(pos)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|j| j.id == id)
    }

    pub fn size(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &JobPosting> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue_of(ids: &[&str]) -> WorkingQueue {
        let mut q = WorkingQueue::new();
        q.append(ids.iter().map(|id| JobPosting::bare(*id)));
        q
    }

    #[test]
    fn test_current_and_peek_next() {
        let q = queue_of(&["j1", "j2", "j3"]);
        assert_eq!(q.current().map(|j| j.id.as_str()), Some("j1"));
        assert_eq!(q.peek_next().map(|j| j.id.as_str()), Some("j2"));
        assert_eq!(q.size(), 3);
    }

    #[test]
    fn test_empty_queue_boundaries() {
        let mut q = WorkingQueue::new();
        assert!(q.current().is_none());
        assert!(q.peek_next().is_none());
        assert_eq!(q.remove_front(), Err(DomainError::EmptyQueue));
    }

    #[test]
    fn test_remove_front_advances() {
        let mut q = queue_of(&["j1", "j2"]);
        let removed = q.remove_front().unwrap();
        assert_eq!(removed.id, "j1");
        assert_eq!(q.current().map(|j| j.id.as_str()), Some("j2"));
        assert!(q.peek_next().is_none());
    }

    #[test]
    fn test_append_dedups_by_id() {
        let mut q = queue_of(&["j1", "j2"]);
        let added = q.append(vec![
            JobPosting::bare("j2"),
            JobPosting::bare("j3"),
            JobPosting::bare("j3"),
        ]);
        assert_eq!(added, 1);
        let ids: Vec<_> = q.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["j1", "j2", "j3"]);
    }

    #[test]
    fn test_insert_front_does_not_dedup() {
        let mut q = queue_of(&["j1"]);
        q.insert_front(JobPosting::bare("j1"));
        assert_eq!(q.size(), 2);
    }
}
