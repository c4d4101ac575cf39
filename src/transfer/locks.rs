//! Per-account async locks for the transfer engine.
//!
//! One mutex per account id. A transfer holds the locks of both accounts
//! for the duration of its atomic unit, so concurrent transfers touching
//! the same account serialize while disjoint pairs run in parallel.
//!
//! Pairs are always acquired in ascending id order; two transfers moving
//! funds in opposite directions between the same accounts cannot
//! deadlock.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::LedgerError;

#[derive(Default)]
pub struct AccountLocks {
    locks: DashMap<i64, Arc<Mutex<()>>>,
}

/// Guards for one account pair, released on drop.
pub struct PairGuard {
    _first: OwnedMutexGuard<()>,
    _second: OwnedMutexGuard<()>,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    fn lock_for(&self, account_id: i64) -> Arc<Mutex<()>> {
        self.locks
            .entry(account_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Acquire a single account lock within `timeout`.
    pub async fn acquire(
        &self,
        account_id: i64,
        timeout: Duration,
    ) -> Result<OwnedMutexGuard<()>, LedgerError> {
        let lock = self.lock_for(account_id);
        tokio::time::timeout(timeout, lock.lock_owned())
            .await
            .map_err(|_| LedgerError::Timeout)
    }

    /// Acquire both account locks in ascending id order within `timeout`
    /// total.
    pub async fn acquire_pair(
        &self,
        account_a: i64,
        account_b: i64,
        timeout: Duration,
    ) -> Result<PairGuard, LedgerError> {
        let (lo, hi) = if account_a <= account_b {
            (account_a, account_b)
        } else {
            (account_b, account_a)
        };

        let deadline = tokio::time::Instant::now() + timeout;
        let lo_lock = self.lock_for(lo);
        let hi_lock = self.lock_for(hi);

        let first = tokio::time::timeout_at(deadline, lo_lock.lock_owned())
            .await
            .map_err(|_| LedgerError::Timeout)?;
        let second = tokio::time::timeout_at(deadline, hi_lock.lock_owned())
            .await
            .map_err(|_| LedgerError::Timeout)?;

        Ok(PairGuard {
            _first: first,
            _second: second,
        })
    }

    /// Drop the lock entry of a deleted account.
    pub fn forget(&self, account_id: i64) {
        self.locks.remove(&account_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pair_acquired_regardless_of_argument_order() {
        let locks = AccountLocks::new();
        let timeout = Duration::from_millis(100);

        let guard = locks.acquire_pair(2, 1, timeout).await.unwrap();
        drop(guard);
        let guard = locks.acquire_pair(1, 2, timeout).await.unwrap();
        drop(guard);
    }

    #[tokio::test]
    async fn test_contended_pair_times_out() {
        let locks = Arc::new(AccountLocks::new());
        let held = locks
            .acquire(1, Duration::from_millis(100))
            .await
            .unwrap();

        let result = locks.acquire_pair(1, 2, Duration::from_millis(50)).await;
        assert!(matches!(result, Err(LedgerError::Timeout)));

        drop(held);
        let result = locks.acquire_pair(1, 2, Duration::from_millis(50)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_opposite_direction_pairs_no_deadlock() {
        let locks = Arc::new(AccountLocks::new());
        let timeout = Duration::from_secs(1);

        let mut handles = Vec::new();
        for i in 0..50 {
            let locks = locks.clone();
            handles.push(tokio::spawn(async move {
                // Alternate a->b and b->a acquisition
                let (x, y) = if i % 2 == 0 { (1, 2) } else { (2, 1) };
                let _guard = locks.acquire_pair(x, y, timeout).await.unwrap();
                tokio::task::yield_now().await;
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_disjoint_pairs_do_not_block() {
        let locks = Arc::new(AccountLocks::new());
        let guard_ab = locks
            .acquire_pair(1, 2, Duration::from_millis(50))
            .await
            .unwrap();

        // A disjoint pair must be acquirable while (1,2) is held.
        let guard_cd = locks
            .acquire_pair(3, 4, Duration::from_millis(50))
            .await
            .unwrap();

        drop(guard_ab);
        drop(guard_cd);
    }
}
