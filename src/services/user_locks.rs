//! Per-user lock registry serializing session mutations.
//!
//! Every mutating operation (and the lazy-expiry read path) holds the owning
//! user's lock for the duration of its transaction, so concurrent requests
//! for one user observe a total order while different users never contend.
//! The partial unique index in the store remains the last line of defense.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};

/// Registry of per-user async mutexes.
pub struct UserLocks {
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
    max_wait: Duration,
}

impl UserLocks {
    pub fn new(max_wait: Duration) -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
            max_wait,
        }
    }

    /// Acquire the lock for a user, waiting at most the configured bound.
    ///
    /// A timed-out wait surfaces as the transient [`DomainError::Busy`];
    /// callers may retry.
    pub async fn acquire(&self, user_id: Uuid) -> DomainResult<OwnedMutexGuard<()>> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(user_id).or_default())
        };

        tokio::time::timeout(self.max_wait, lock.lock_owned())
            .await
            .map_err(|_| DomainError::Busy)
    }
}

impl Default for UserLocks {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}
