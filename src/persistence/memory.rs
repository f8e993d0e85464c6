//! In-process [`CooldownStore`] for tests and local tooling.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::cooldown::{Cooldown, PullRequestActivity, UserCache};

use super::{CooldownStore, PersistenceError};

type ActivityKey = (String, String, u64);

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<String, UserCache>,
    activity: HashMap<ActivityKey, PullRequestActivity>,
    cooldowns: HashMap<String, Cooldown>,
}

/// Map-backed store mirroring the `SQLite` store's filtering, ordering, and
/// upsert rules.
#[derive(Debug, Default)]
pub struct InMemoryCooldownStore {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
}

impl InMemoryCooldownStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation fail with
    /// [`PersistenceError::Unavailable`] until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), PersistenceError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(PersistenceError::Unavailable {
                message: "in-memory store switched off".to_owned(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CooldownStore for InMemoryCooldownStore {
    async fn user_cache(&self, login: &str) -> Result<Option<UserCache>, PersistenceError> {
        self.ensure_available()?;
        Ok(self.tables.read().await.users.get(login).cloned())
    }

    async fn save_user_cache(&self, user: &UserCache) -> Result<(), PersistenceError> {
        self.ensure_available()?;
        self.tables
            .write()
            .await
            .users
            .insert(user.login.clone(), user.clone());
        Ok(())
    }

    async fn pull_request_activity(
        &self,
        login: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<PullRequestActivity>, PersistenceError> {
        self.ensure_available()?;
        let tables = self.tables.read().await;
        let mut found: Vec<PullRequestActivity> = tables
            .activity
            .values()
            .filter(|record| {
                record.login == login && record.closed_at.is_some_and(|closed| closed >= since)
            })
            .cloned()
            .collect();
        found.sort_by(|left, right| right.closed_at.cmp(&left.closed_at));
        Ok(found)
    }

    async fn save_pull_request_activity(
        &self,
        activity: &[PullRequestActivity],
    ) -> Result<(), PersistenceError> {
        self.ensure_available()?;
        let mut tables = self.tables.write().await;
        for record in activity {
            let key = (
                record.login.clone(),
                record.repo_full_name.clone(),
                record.pr_number,
            );
            tables.activity.insert(key, record.clone());
        }
        Ok(())
    }

    async fn cooldown(&self, login: &str) -> Result<Option<Cooldown>, PersistenceError> {
        self.ensure_available()?;
        Ok(self.tables.read().await.cooldowns.get(login).cloned())
    }

    async fn save_cooldown(&self, cooldown: &Cooldown) -> Result<(), PersistenceError> {
        self.ensure_available()?;
        self.tables
            .write()
            .await
            .cooldowns
            .insert(cooldown.login.clone(), cooldown.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::InMemoryCooldownStore;
    use crate::cooldown::{ActivityState, PullRequestActivity};
    use crate::persistence::{CooldownStore, PersistenceError};

    fn closed(pr_number: u64, day: u32) -> PullRequestActivity {
        let closed_at = Utc
            .with_ymd_and_hms(2026, 10, day, 0, 0, 0)
            .single()
            .expect("fixed timestamp should be valid");
        PullRequestActivity {
            login: "octocat".to_owned(),
            pr_number,
            repo_full_name: "o/r".to_owned(),
            state: ActivityState::Closed,
            keyword_flagged: false,
            closed_at: Some(closed_at),
            cached_at: closed_at,
        }
    }

    #[tokio::test]
    async fn activity_is_ordered_newest_first_and_filtered() {
        let store = InMemoryCooldownStore::new();
        store
            .save_pull_request_activity(&[closed(1, 3), closed(2, 9), closed(3, 6)])
            .await
            .expect("save should succeed");
        let since = Utc
            .with_ymd_and_hms(2026, 10, 5, 0, 0, 0)
            .single()
            .expect("fixed timestamp should be valid");

        let numbers: Vec<u64> = store
            .pull_request_activity("octocat", since)
            .await
            .expect("query should succeed")
            .into_iter()
            .map(|record| record.pr_number)
            .collect();

        assert_eq!(numbers, vec![2, 3]);
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_operation() {
        let store = InMemoryCooldownStore::new();
        store.set_unavailable(true);

        let result = store.cooldown("octocat").await;

        assert!(matches!(result, Err(PersistenceError::Unavailable { .. })));

        store.set_unavailable(false);
        assert_eq!(store.cooldown("octocat").await, Ok(None));
    }
}
