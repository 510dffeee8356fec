//! Persisted Seen Set - durable per-user record of swiped posting ids
//!
//! Stored as a JSON array under `seenJobs_<userId>` in the key/value store.
//! Every operation fails softly: a lost dedup record only means a card may
//! repeat, so storage errors are logged and never returned.

use super::constants::{SEEN_KEY_PREFIX, SEEN_WRITE_RETRIES};
use crate::domain::PostingId;
use crate::error::{AppError, Result};
use crate::port::KeyValueStore;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

pub struct PersistedSeenSet {
    store: Arc<dyn KeyValueStore>,
    // Serializes read-modify-write cycles issued from this process
    write_lock: Mutex<()>,
}

impl PersistedSeenSet {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Storage key for a user (namespaced so accounts never share history)
    pub fn key_for(user_id: &str) -> String {
        format!("{}{}", SEEN_KEY_PREFIX, user_id)
    }

    /// Load the user's seen ids
    ///
    /// Returns an empty set on any read or decode error.
    pub async fn load(&self, user_id: &str) -> HashSet<PostingId> {
        match self.try_load(user_id).await {
            Ok(ids) => ids,
            Err(e) => {
                error!(user_id = %user_id, error = %e, "Failed to load seen set, using empty set");
                HashSet::new()
            }
        }
    }

    /// Replace the user's seen ids
    ///
    /// A failed write is retried once, then logged and dropped.
    pub async fn save(&self, user_id: &str, ids: &HashSet<PostingId>) {
        let _guard = self.write_lock.lock().await;
        self.persist(user_id, ids).await;
    }

    /// Add one id (read-modify-write)
    ///
    /// Set union is order-independent, so concurrent adds never conflict on content.
    /// If the store cannot be read, the write is skipped rather than overwriting the
    /// stored history with a partial set. An undecodable value is replaced.
    pub async fn add_one(&self, user_id: &str, id: &str) {
        let _guard = self.write_lock.lock().await;
        let Some((mut ids, repair)) = self.load_for_update(user_id, id).await else {
            return;
        };
        if ids.insert(id.to_string()) || repair {
            self.persist(user_id, &ids).await;
        }
    }

    /// Remove one id (undo)
    pub async fn remove_one(&self, user_id: &str, id: &str) {
        let _guard = self.write_lock.lock().await;
        let Some((mut ids, repair)) = self.load_for_update(user_id, id).await else {
            return;
        };
        if ids.remove(id) || repair {
            self.persist(user_id, &ids).await;
        }
    }

    /// Forget every seen id for the user
    pub async fn reset(&self, user_id: &str) {
        let _guard = self.write_lock.lock().await;
        let key = Self::key_for(user_id);

        for attempt in 0..=SEEN_WRITE_RETRIES {
            match self.store.remove(&key).await {
                Ok(()) => {
                    debug!(user_id = %user_id, "Seen set cleared");
                    return;
                }
                Err(e) if attempt < SEEN_WRITE_RETRIES => {
                    warn!(user_id = %user_id, error = %e, "Seen set reset failed, retrying");
                }
                Err(e) => {
                    error!(user_id = %user_id, error = %e, "Seen set reset dropped");
                }
            }
        }
    }

    /// Current ids for a read-modify-write, plus whether the stored value is
    /// corrupt and must be rewritten. `None` when the store itself failed.
    async fn load_for_update(&self, user_id: &str, id: &str) -> Option<(HashSet<PostingId>, bool)> {
        match self.try_load(user_id).await {
            Ok(ids) => Some((ids, false)),
            Err(AppError::Serialization(e)) => {
                warn!(user_id = %user_id, error = %e, "Seen set corrupt, starting over");
                Some((HashSet::new(), true))
            }
            Err(e) => {
                error!(user_id = %user_id, posting_id = %id, error = %e, "Seen set unreadable, dropping update");
                None
            }
        }
    }

    async fn try_load(&self, user_id: &str) -> Result<HashSet<PostingId>> {
        let raw = self.store.get(&Self::key_for(user_id)).await?;
        match raw {
            Some(json) => {
                let ids: Vec<PostingId> = serde_json::from_str(&json)?;
                Ok(ids.into_iter().collect())
            }
            None => Ok(HashSet::new()),
        }
    }

    async fn persist(&self, user_id: &str, ids: &HashSet<PostingId>) {
        let key = Self::key_for(user_id);

        // Sorted for a stable stored value
        let mut sorted: Vec<&PostingId> = ids.iter().collect();
        sorted.sort();
        let value = match serde_json::to_string(&sorted) {
            Ok(v) => v,
            Err(e) => {
                error!(user_id = %user_id, error = %e, "Failed to encode seen set");
                return;
            }
        };

        for attempt in 0..=SEEN_WRITE_RETRIES {
            match self.store.set(&key, &value).await {
                Ok(()) => {
                    debug!(user_id = %user_id, count = ids.len(), "Seen set saved");
                    return;
                }
                Err(e) if attempt < SEEN_WRITE_RETRIES => {
                    warn!(user_id = %user_id, error = %e, "Seen set write failed, retrying");
                }
                Err(e) => {
                    error!(user_id = %user_id, error = %e, "Seen set write dropped");
                }
            }
        }
    }
}
