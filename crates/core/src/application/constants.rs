// Deck constants (No magic values)
use std::time::Duration;

/// Refill when fewer than this many cards remain (5)
pub const DEFAULT_LOW_WATERMARK: usize = 5;

/// Minimum spacing between refill attempts (2s debounce)
pub const DEFAULT_MIN_REFILL_INTERVAL: Duration = Duration::from_secs(2);

/// Hard timeout on an in-flight provider fetch (30s)
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Postings requested per provider page (50)
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Fewer genuinely new postings than this in a page means starvation (5)
pub const DEFAULT_STARVATION_THRESHOLD: usize = 5;

/// Undo history depth kept per session (200 swipes)
pub const DEFAULT_HISTORY_CAP: usize = 200;

/// Background refresh nudge interval (10 minutes)
pub const DEFAULT_BACKGROUND_REFRESH_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Persistence key prefix; full key is `seenJobs_<userId>`
pub const SEEN_KEY_PREFIX: &str = "seenJobs_";

/// Extra attempts for a failed seen-set write (retry once, then drop)
pub const SEEN_WRITE_RETRIES: usize = 1;
