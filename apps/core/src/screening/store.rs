use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::state::ScreeningState;

/// Process-wide map from user id to that user's screening state.
///
/// Each user gets its own lock so concurrent requests for one user are
/// serialized while different users never wait on each other. The map lock is
/// only held long enough to fetch or create an entry.
#[derive(Clone, Default)]
pub struct ScreeningStore {
    states: Arc<Mutex<HashMap<String, Arc<Mutex<ScreeningState>>>>>,
}

impl ScreeningStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The state handle for `user_id`, created with defaults on first use.
    pub async fn entry(&self, user_id: &str) -> Arc<Mutex<ScreeningState>> {
        let mut states = self.states.lock().await;
        states
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(ScreeningState::new())))
            .clone()
    }

    /// A copy of the current state, without creating one
    pub async fn snapshot(&self, user_id: &str) -> Option<ScreeningState> {
        let handle = self.states.lock().await.get(user_id).cloned()?;
        let state = handle.lock().await;
        Some(state.clone())
    }

    /// Forget everything about `user_id`
    pub async fn remove(&self, user_id: &str) -> bool {
        self.states.lock().await.remove(user_id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.states.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.states.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_entry_is_created_lazily() {
        let store = ScreeningStore::new();
        assert!(store.snapshot("u1").await.is_none());

        let handle = store.entry("u1").await;
        handle.lock().await.cumulative_score = 4;

        let snapshot = store.snapshot("u1").await.unwrap();
        assert_eq!(snapshot.cumulative_score, 4);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_users_do_not_share_state() {
        let store = ScreeningStore::new();
        store.entry("a").await.lock().await.next_index = 3;

        let other = store.entry("b").await;
        assert_eq!(other.lock().await.next_index, 0);
    }

    #[tokio::test]
    async fn test_concurrent_updates_are_not_lost() {
        let store = ScreeningStore::new();
        let mut tasks = Vec::new();
        for _ in 0..50 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                let handle = store.entry("same-user").await;
                let mut state = handle.lock().await;
                let current = state.cumulative_score;
                tokio::task::yield_now().await;
                state.cumulative_score = current + 1;
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(store.snapshot("same-user").await.unwrap().cumulative_score, 50);
    }

    #[tokio::test]
    async fn test_remove() {
        let store = ScreeningStore::new();
        store.entry("u1").await;

        assert!(store.remove("u1").await);
        assert!(!store.remove("u1").await);
        assert!(store.is_empty().await);
    }
}
