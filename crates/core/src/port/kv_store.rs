// Key/Value Store Port (persistence backend)

use crate::error::Result;
use async_trait::async_trait;

/// Namespaced async key/value store
///
/// Implementations:
/// - SqliteKvStore: durable store (infra-sqlite)
/// - mocks::InMemoryKvStore: tests and guest sessions
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if the key is absent
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write (insert or replace) a value
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a key. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory store with failure injection
    #[derive(Default)]
    pub struct InMemoryKvStore {
        entries: Mutex<HashMap<String, String>>,
        failing_gets: AtomicUsize,
        failing_sets: AtomicUsize,
        set_calls: AtomicUsize,
    }

    impl InMemoryKvStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make the next `n` reads fail
        pub fn fail_next_gets(&self, n: usize) {
            self.failing_gets.store(n, Ordering::SeqCst);
        }

        /// Make the next `n` writes (set or remove) fail
        pub fn fail_next_sets(&self, n: usize) {
            self.failing_sets.store(n, Ordering::SeqCst);
        }

        /// Number of write attempts, failed ones included
        pub fn set_calls(&self) -> usize {
            self.set_calls.load(Ordering::SeqCst)
        }

        pub fn raw(&self, key: &str) -> Option<String> {
            self.entries.lock().get(key).cloned()
        }

        pub fn insert_raw(&self, key: &str, value: &str) {
            self.entries.lock().insert(key.to_string(), value.to_string());
        }

        fn take_failure(counter: &AtomicUsize) -> bool {
            counter
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        }
    }

    #[async_trait]
    impl KeyValueStore for InMemoryKvStore {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            if Self::take_failure(&self.failing_gets) {
                return Err(AppError::Storage(format!("injected read failure: {}", key)));
            }
            Ok(self.entries.lock().get(key).cloned())
        }

        async fn set(&self, key: &str, value: &str) -> Result<()> {
            self.set_calls.fetch_add(1, Ordering::SeqCst);
            if Self::take_failure(&self.failing_sets) {
                return Err(AppError::Storage(format!("injected write failure: {}", key)));
            }
            self.entries.lock().insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn remove(&self, key: &str) -> Result<()> {
            self.set_calls.fetch_add(1, Ordering::SeqCst);
            if Self::take_failure(&self.failing_sets) {
                return Err(AppError::Storage(format!("injected write failure: {}", key)));
            }
            self.entries.lock().remove(key);
            Ok(())
        }
    }
}
