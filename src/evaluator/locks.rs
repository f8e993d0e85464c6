//! Per-login serialisation of checks.
//!
//! Two concurrent checks for the same author would otherwise both read "no
//! active cooldown" and both escalate. Holding a login's lock from the
//! cooldown read to the cooldown write makes the second check observe the
//! first one's result.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Held for the duration of one check.
pub type LoginGuard = OwnedMutexGuard<()>;

/// Lock table keyed by lower-cased login.
#[derive(Debug, Default)]
pub struct LoginLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl LoginLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other check for `login` is running.
    pub async fn acquire(&self, login: &str) -> LoginGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            // Entries nobody holds or waits on only reference themselves.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(login.to_ascii_lowercase()).or_default())
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::LoginLocks;

    #[tokio::test]
    async fn same_login_is_serialised_case_insensitively() {
        let locks = LoginLocks::new();
        let _held = locks.acquire("OctoCat").await;

        let second = tokio::time::timeout(Duration::from_millis(50), locks.acquire("octocat")).await;

        assert!(second.is_err(), "second acquisition should wait");
    }

    #[tokio::test]
    async fn different_logins_do_not_block_each_other() {
        let locks = LoginLocks::new();
        let _held = locks.acquire("octocat").await;

        let other = tokio::time::timeout(Duration::from_millis(50), locks.acquire("hubot")).await;

        assert!(other.is_ok(), "unrelated login should not wait");
    }

    #[tokio::test]
    async fn released_entries_are_pruned() {
        let locks = LoginLocks::new();
        drop(locks.acquire("octocat").await);

        let _held = locks.acquire("hubot").await;

        assert_eq!(locks.tracked(), 1);
    }
}
