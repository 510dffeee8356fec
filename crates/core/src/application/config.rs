// Deck Configuration

use super::constants::*;
use crate::domain::DomainError;
use std::time::Duration;

/// Tunables for one deck engine
///
/// The defaults mirror the constants module; none of the values are
/// load-bearing for correctness.
#[derive(Debug, Clone)]
pub struct DeckConfig {
    /// Refill when the queue holds fewer cards than this
    pub low_watermark: usize,
    /// Debounce between refill attempts
    pub min_refill_interval: Duration,
    /// Hard timeout on a provider fetch
    pub fetch_timeout: Duration,
    /// Page size requested from the provider
    pub page_size: usize,
    /// Fewer new postings than this after filtering triggers the starvation policy
    pub starvation_threshold: usize,
    /// Starvation policy: clear the seen set and show repeats (true) or keep
    /// filtering and accept a short deck (false)
    pub reset_seen_on_starvation: bool,
    /// Maximum undo depth
    pub history_cap: usize,
    /// Period of the background refresh nudge
    pub background_refresh_interval: Duration,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            low_watermark: DEFAULT_LOW_WATERMARK,
            min_refill_interval: DEFAULT_MIN_REFILL_INTERVAL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            page_size: DEFAULT_PAGE_SIZE,
            starvation_threshold: DEFAULT_STARVATION_THRESHOLD,
            reset_seen_on_starvation: true,
            history_cap: DEFAULT_HISTORY_CAP,
            background_refresh_interval: DEFAULT_BACKGROUND_REFRESH_INTERVAL,
        }
    }
}

impl DeckConfig {
    pub fn min_refill_interval_millis(&self) -> i64 {
        i64::try_from(self.min_refill_interval.as_millis()).unwrap_or(i64::MAX)
    }

    /// Reject settings that would stall the deck
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.low_watermark == 0 {
            return Err(DomainError::ValidationError(
                "low_watermark must be at least 1".to_string(),
            ));
        }
        if self.page_size == 0 {
            return Err(DomainError::ValidationError(
                "page_size must be at least 1".to_string(),
            ));
        }
        if self.fetch_timeout.is_zero() {
            return Err(DomainError::ValidationError(
                "fetch_timeout must be non-zero".to_string(),
            ));
        }
        if self.history_cap == 0 {
            return Err(DomainError::ValidationError(
                "history_cap must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
