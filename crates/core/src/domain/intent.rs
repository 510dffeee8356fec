// UI Intents

use super::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Intent emitted by the UI event source, mapped 1:1 to an engine method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeckIntent {
    SwipeLeft,
    SwipeRight,
    Undo,
    ResetFilters,
}

impl std::fmt::Display for DeckIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeckIntent::SwipeLeft => write!(f, "SWIPE_LEFT"),
            DeckIntent::SwipeRight => write!(f, "SWIPE_RIGHT"),
            DeckIntent::Undo => write!(f, "UNDO"),
            DeckIntent::ResetFilters => write!(f, "RESET_FILTERS"),
        }
    }
}

impl FromStr for DeckIntent {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SWIPE_LEFT" => Ok(DeckIntent::SwipeLeft),
            "SWIPE_RIGHT" => Ok(DeckIntent::SwipeRight),
            "UNDO" => Ok(DeckIntent::Undo),
            "RESET_FILTERS" => Ok(DeckIntent::ResetFilters),
            other => Err(DomainError::UnknownIntent(other.to_string())),
        }
    }
}
