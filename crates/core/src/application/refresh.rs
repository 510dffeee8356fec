// Background Refresh Scheduler
// Periodically nudges the refill controller so an idle deck stays topped up

use super::refill::{RefillController, RefillTrigger};
use super::shutdown::ShutdownToken;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

/// Periodic refill trigger
///
/// Each tick goes through the normal `maybe_refill` gate, so watermark,
/// single-flight and debounce rules still apply.
pub struct RefreshScheduler {
    refill: RefillController,
    every: Duration,
}

impl RefreshScheduler {
    /// Create a new refresh scheduler
    ///
    /// # Arguments
    /// * `refill` - Controller to nudge
    /// * `every` - Tick period
    pub fn new(refill: RefillController, every: Duration) -> Self {
        Self { refill, every }
    }

    /// Run the refresh loop until shutdown (spawn in tokio::spawn)
    ///
    /// Returns the number of ticks that started a fetch.
    pub async fn run(self, mut shutdown: ShutdownToken) -> usize {
        info!(interval_secs = self.every.as_secs(), "Refresh scheduler started");

        let mut tick = interval(self.every);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately; the initial load is the engine's job
        tick.tick().await;

        let mut started = 0;
        loop {
            tokio::select! {
                _ = shutdown.wait() => break,
                _ = tick.tick() => {
                    match self.refill.maybe_refill() {
                        RefillTrigger::Started { generation } => {
                            started += 1;
                            debug!(generation, "Background refresh started a fetch");
                        }
                        RefillTrigger::Skipped(reason) => {
                            debug!(reason = ?reason, "Background refresh skipped");
                        }
                    }
                }
            }
        }

        info!(fetches_started = started, "Refresh scheduler stopped");
        started
    }
}
