//! Per-task mutual exclusion for extension operations.

use crate::task::domain::TaskId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Registry of async locks keyed by task.
///
/// Entries are dropped once no caller holds or waits on them.
#[derive(Debug, Clone, Default)]
pub struct TaskLocks {
    inner: Arc<Mutex<HashMap<TaskId, Arc<AsyncMutex<()>>>>>,
}

impl TaskLocks {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `task_id`.
    pub async fn lock(&self, task_id: TaskId) -> OwnedMutexGuard<()> {
        let entry = self.entry(task_id);
        entry.lock_owned().await
    }

    fn entry(&self, task_id: TaskId) -> Arc<AsyncMutex<()>> {
        let mut locks = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(locks.entry(task_id).or_default())
    }
}
