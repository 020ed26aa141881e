// src/utils/locks.rs

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Entries are swept once the map grows past this size.
const PRUNE_THRESHOLD: usize = 1024;

/// Serializes read-modify-write cycles on one (user, course) progress record.
///
/// Requests for different pairs never wait on each other. Cloning shares the
/// same underlying map.
#[derive(Clone, Default)]
pub struct ProgressLocks {
    inner: Arc<Mutex<HashMap<(i64, i64), Arc<AsyncMutex<()>>>>>,
}

impl ProgressLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to the pair. Held until the guard drops.
    pub async fn lock(&self, user_id: i64, course_id: i64) -> OwnedMutexGuard<()> {
        let slot = {
            let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            if map.len() >= PRUNE_THRESHOLD {
                // Only the map itself holds idle entries.
                map.retain(|_, slot| Arc::strong_count(slot) > 1);
            }
            map.entry((user_id, course_id)).or_default().clone()
        };
        slot.lock_owned().await
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_pair_is_exclusive() {
        let locks = ProgressLocks::new();
        let guard = locks.lock(1, 1).await;

        let contender = locks.clone();
        let waiting = tokio::spawn(async move {
            let _guard = contender.lock(1, 1).await;
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiting.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), waiting)
            .await
            .expect("second lock should be granted")
            .unwrap();
    }

    #[tokio::test]
    async fn different_pairs_do_not_block() {
        let locks = ProgressLocks::new();
        let _first = locks.lock(1, 1).await;

        tokio::time::timeout(Duration::from_secs(1), locks.lock(1, 2))
            .await
            .expect("other course must not wait");
        tokio::time::timeout(Duration::from_secs(1), locks.lock(2, 1))
            .await
            .expect("other user must not wait");
    }

    #[tokio::test]
    async fn idle_entries_are_pruned() {
        let locks = ProgressLocks::new();
        for user in 0..PRUNE_THRESHOLD as i64 {
            drop(locks.lock(user, 1).await);
        }
        assert_eq!(locks.len(), PRUNE_THRESHOLD);

        let _held = locks.lock(-1, 1).await;
        assert_eq!(locks.len(), 1);
    }
}
