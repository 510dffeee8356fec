// Port Layer - Interfaces for external collaborators

pub mod job_provider;
pub mod kv_store;
pub mod swipe_hook;
pub mod time_provider; // For deterministic testing

// Re-exports
pub use job_provider::JobProvider;
pub use kv_store::KeyValueStore;
pub use swipe_hook::{NoopSwipeHook, SwipeHook};
pub use time_provider::{SystemTimeProvider, TimeProvider};
