// Swipe hook that records right swipes in the log

use async_trait::async_trait;
use swipedeck_core::domain::{SwipeDirection, SwipeEvent, UserId};
use swipedeck_core::error::Result;
use swipedeck_core::port::SwipeHook;
use tracing::info;

pub struct LoggingSwipeHook;

#[async_trait]
impl SwipeHook for LoggingSwipeHook {
    async fn on_swipe(&self, user_id: Option<&UserId>, event: &SwipeEvent) -> Result<()> {
        if event.direction == SwipeDirection::Right {
            info!(
                user_id = user_id.map(String::as_str).unwrap_or("guest"),
                posting_id = %event.job.id,
                title = event.job.attribute_str("title").unwrap_or(""),
                "Application recorded"
            );
        }
        Ok(())
    }
}
