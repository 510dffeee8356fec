// Domain Layer - Pure deck logic and entities

pub mod deck;
pub mod error;
pub mod history;
pub mod intent;
pub mod posting;
pub mod queue;

// Re-exports
pub use deck::DeckState;
pub use error::DomainError;
pub use history::SwipeHistoryStack;
pub use intent::DeckIntent;
pub use posting::{JobPosting, PostingId, SwipeDirection, SwipeEvent, UserId};
pub use queue::WorkingQueue;
