// Swipe History (undo stack)

use super::posting::SwipeEvent;

/// LIFO stack of recent swipes
///
/// Unbounded by itself; `push_bounded` lets the owner enforce a cap by
/// discarding the oldest entry.
#[derive(Debug, Default, Clone)]
pub struct SwipeHistoryStack {
    events: Vec<SwipeEvent>,
}

impl SwipeHistoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: SwipeEvent) {
        self.events.push(event);
    }

    /// Push, dropping the oldest entry if the stack already holds `cap` events.
    /// Returns the evicted event, if any.
    pub fn push_bounded(&mut self, event: SwipeEvent, cap: usize) -> Option<SwipeEvent> {
        if cap == 0 {
            return Some(event);
        }
        let evicted = if self.events.len() >= cap {
            Some(self.events.remove(0))
        } else {
            None
        };
        self.events.push(event);
        evicted
    }

    pub fn pop(&mut self) -> Option<SwipeEvent> {
        self.events.pop()
    }

    pub fn peek(&self) -> Option<&SwipeEvent> {
        self.events.last()
    }

    pub fn size(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
