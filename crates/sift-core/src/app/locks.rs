//! LockTable - 識別子ごとの排他制御
//!
//! Cross-record invariants are checked and then written in two store calls.
//! Holding the lock for the contended identifier across both calls makes the
//! check-then-act sequence atomic within this process.
//!
//! # 設計
//! - key = (LockScope, ULID)、entry = `Arc<tokio::sync::Mutex<()>>`
//! - `tokio::time::timeout` による bounded wait（期限切れは Conflict）
//! - 最後の holder が解放したら entry を削除

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use ulid::Ulid;

use crate::domain::{ConflictReason, Id, IdMarker, WorkflowError};

/// What kind of identifier a lock is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockScope {
    Reviewer,
    Submitter,
    Recipe,
    Email,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LockKey {
    scope: LockScope,
    key: LockTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum LockTarget {
    Ulid(Ulid),
    Hash(u64),
}

impl LockKey {
    pub fn new<T: IdMarker>(scope: LockScope, id: Id<T>) -> Self {
        Self {
            scope,
            key: LockTarget::Ulid(id.as_ulid()),
        }
    }

    /// Key for identifiers that are not record ids, e.g. an email address.
    /// Hash collisions only cause extra contention.
    pub fn text(scope: LockScope, text: &str) -> Self {
        use std::hash::{DefaultHasher, Hash, Hasher};
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        Self {
            scope,
            key: LockTarget::Hash(hasher.finish()),
        }
    }
}

type Entries = Mutex<HashMap<LockKey, Arc<AsyncMutex<()>>>>;

/// In-process lock table with bounded waits.
pub struct LockTable {
    entries: Arc<Entries>,
    timeout: Duration,
}

impl LockTable {
    pub fn new(timeout: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            timeout,
        }
    }

    /// Wait up to the configured timeout for exclusive access to `key`.
    pub async fn acquire(&self, key: LockKey) -> Result<LockGuard, WorkflowError> {
        let mutex = {
            let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            entries.entry(key).or_default().clone()
        };

        match tokio::time::timeout(self.timeout, mutex.lock_owned()).await {
            Ok(guard) => {
                tracing::debug!(?key, "lock acquired");
                Ok(LockGuard {
                    key,
                    entries: Arc::clone(&self.entries),
                    guard: Some(guard),
                })
            }
            Err(_) => {
                tracing::warn!(
                    ?key,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "lock wait timed out"
                );
                release_entry(&self.entries, key, 0);
                Err(WorkflowError::Conflict(ConflictReason::LockTimeout))
            }
        }
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Drop the entry for `key` unless someone besides the table and the
/// caller's own `caller_refs` references still uses it.
fn release_entry(entries: &Entries, key: LockKey, caller_refs: usize) {
    let mut entries = entries.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(entry) = entries.get(&key)
        && Arc::strong_count(entry) <= 1 + caller_refs
    {
        entries.remove(&key);
    }
}

/// Held lock; released on drop.
#[derive(Debug)]
pub struct LockGuard {
    key: LockKey,
    entries: Arc<Entries>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        // The owned guard keeps one reference to the mutex until released.
        release_entry(&self.entries, self.key, 1);
        self.guard.take();
    }
}
