// Application Layer - deck engine and its background machinery

pub mod config;
pub mod constants;
pub mod engine;
pub mod refill;
pub mod refresh;
pub mod sample_jobs;
pub mod seen_set;
pub mod seen_tracker;
pub mod shutdown;

// Re-exports
pub use config::DeckConfig;
pub use engine::{IntentOutcome, SwipeDeckEngine};
pub use refill::{RefillController, RefillOutcome, RefillPhase, RefillTrigger, SharedDeck, SkipReason};
pub use refresh::RefreshScheduler;
pub use seen_set::PersistedSeenSet;
pub use seen_tracker::SeenTracker;
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
