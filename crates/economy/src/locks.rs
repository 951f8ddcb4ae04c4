use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Registry of per-user async locks. Check-then-debit paths take the
/// user's lock so two concurrent commands for the same user cannot
/// interleave between the balance read and the write.
#[derive(Clone, Default)]
pub struct UserLocks {
    inner: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, user_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            // Locks nobody holds or waits on are dead weight; evict
            // them so the map does not grow with every user ever seen.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(user_id.to_string()).or_default())
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).len()
    }
}

#[cfg(test)]
mod tests {
    use super::UserLocks;

    #[tokio::test]
    async fn same_user_waits_while_other_users_proceed() {
        let locks = UserLocks::new();

        let held = locks.acquire("U1").await;
        // A different user's lock is independent.
        let _other = locks.acquire("U2").await;

        let contended = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire("U1").await;
            })
        };

        tokio::task::yield_now().await;
        assert!(!contended.is_finished());

        drop(held);
        contended.await.expect("contended task completes");
    }

    #[tokio::test]
    async fn released_locks_are_evicted_from_the_registry() {
        let locks = UserLocks::new();

        let guard = locks.acquire("U1").await;
        let _other = locks.acquire("U2").await;
        assert_eq!(locks.tracked(), 2);
        drop(guard);

        // The next acquire sweeps out U1's idle entry; U2's lock is
        // still held and U3's is freshly taken.
        let _fresh = locks.acquire("U3").await;
        assert_eq!(locks.tracked(), 2);
    }
}
