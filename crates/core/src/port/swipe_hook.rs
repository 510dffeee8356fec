// Swipe Hook Port (side-effect sink, e.g. application tracking)

use crate::domain::{SwipeEvent, UserId};
use crate::error::Result;
use async_trait::async_trait;

/// External side effect fired after a swipe
///
/// Runs best-effort in the background; failures are logged by the engine and
/// never reach the UI. Reversing the effect on undo belongs to whoever owns it:
/// the engine hands the undone `SwipeEvent` back to its caller.
#[async_trait]
pub trait SwipeHook: Send + Sync {
    async fn on_swipe(&self, user_id: Option<&UserId>, event: &SwipeEvent) -> Result<()>;
}

/// Hook that does nothing (default)
pub struct NoopSwipeHook;

#[async_trait]
impl SwipeHook for NoopSwipeHook {
    async fn on_swipe(&self, _user_id: Option<&UserId>, _event: &SwipeEvent) -> Result<()> {
        Ok(())
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::SwipeDirection;
    use crate::error::AppError;
    use parking_lot::Mutex;

    /// Hook that records every event it sees
    #[derive(Default)]
    pub struct RecordingSwipeHook {
        events: Mutex<Vec<SwipeEvent>>,
        fail: bool,
    }

    impl RecordingSwipeHook {
        pub fn new() -> Self {
            Self::default()
        }

        /// Records events but reports failure for each one
        pub fn failing() -> Self {
            Self {
                events: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        pub fn events(&self) -> Vec<SwipeEvent> {
            self.events.lock().clone()
        }

        /// Ids of right-swiped postings ("applications")
        pub fn applied_ids(&self) -> Vec<String> {
            self.events
                .lock()
                .iter()
                .filter(|e| e.direction == SwipeDirection::Right)
                .map(|e| e.job.id.clone())
                .collect()
        }
    }

    #[async_trait]
    impl SwipeHook for RecordingSwipeHook {
        async fn on_swipe(&self, _user_id: Option<&UserId>, event: &SwipeEvent) -> Result<()> {
            self.events.lock().push(event.clone());
            if self.fail {
                return Err(AppError::Internal("hook failure".to_string()));
            }
            Ok(())
        }
    }
}
