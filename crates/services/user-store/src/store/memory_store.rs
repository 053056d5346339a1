//! In-process store implementation.
//!
//! Mirrors the Redis semantics the repository relies on: counters, sorted
//! sets with NX/XX inserts, hashes, and batches applied under one lock so no
//! other caller observes a partially applied batch.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use common::AppResult;

use super::{Command, KeyValueStore, Reply};

#[derive(Debug, Default)]
struct State {
    counters: HashMap<String, i64>,
    sorted_sets: HashMap<String, HashMap<String, f64>>,
    hashes: HashMap<String, HashMap<String, String>>,
}

impl State {
    fn contains(&self, key: &str) -> bool {
        self.counters.contains_key(key)
            || self.sorted_sets.contains_key(key)
            || self.hashes.contains_key(key)
    }

    fn delete(&mut self, key: &str) -> i64 {
        let removed = self.counters.remove(key).is_some()
            | self.sorted_sets.remove(key).is_some()
            | self.hashes.remove(key).is_some();
        i64::from(removed)
    }

    fn apply(&mut self, command: Command) -> Reply {
        match command {
            Command::Score { key, member } => Reply::Score(
                self.sorted_sets
                    .get(&key)
                    .and_then(|set| set.get(&member))
                    .copied(),
            ),
            Command::InsertIfAbsent { key, member, score } => {
                let set = self.sorted_sets.entry(key).or_default();
                if set.contains_key(&member) {
                    Reply::Count(0)
                } else {
                    set.insert(member, score as f64);
                    Reply::Count(1)
                }
            }
            Command::UpdateIfPresent { key, member, score } => {
                if let Some(existing) = self
                    .sorted_sets
                    .get_mut(&key)
                    .and_then(|set| set.get_mut(&member))
                {
                    *existing = score as f64;
                }
                Reply::Count(0)
            }
            Command::RemoveMember { key, member } => {
                let Some(set) = self.sorted_sets.get_mut(&key) else {
                    return Reply::Count(0);
                };
                let removed = set.remove(&member).is_some();
                if set.is_empty() {
                    self.sorted_sets.remove(&key);
                }
                Reply::Count(i64::from(removed))
            }
            Command::SetAllFields { key, fields } => {
                let hash = self.hashes.entry(key).or_default();
                let mut added = 0;
                for (field, value) in fields {
                    if hash.insert(field, value).is_none() {
                        added += 1;
                    }
                }
                Reply::Count(added)
            }
            Command::DeleteKey { key } => Reply::Count(self.delete(&key)),
            Command::Exists { key } => Reply::Exists(self.contains(&key)),
        }
    }
}

/// In-memory [`KeyValueStore`], for tests and local runs without Redis.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a counter, 0 if never incremented
    pub async fn counter(&self, key: &str) -> i64 {
        self.state.lock().await.counters.get(key).copied().unwrap_or(0)
    }

    /// Number of members in a sorted set
    pub async fn set_len(&self, key: &str) -> usize {
        self.state
            .lock()
            .await
            .sorted_sets
            .get(key)
            .map_or(0, HashMap::len)
    }

    /// Keys of every stored hash
    pub async fn hash_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.state.lock().await.hashes.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn incr(&self, key: &str) -> AppResult<i64> {
        let mut state = self.state.lock().await;
        let value = state.counters.entry(key.to_string()).or_insert(0);
        *value += 1;
        Ok(*value)
    }

    async fn get_all_fields(&self, key: &str) -> AppResult<HashMap<String, String>> {
        let state = self.state.lock().await;
        Ok(state.hashes.get(key).cloned().unwrap_or_default())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.state.lock().await.contains(key))
    }

    async fn batch(&self, commands: Vec<Command>) -> AppResult<Vec<Reply>> {
        let mut state = self.state.lock().await;
        Ok(commands
            .into_iter()
            .map(|command| state.apply(command))
            .collect())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_incr_starts_at_one() {
        let store = MemoryStore::new();
        assert_eq!(store.incr("userid").await.unwrap(), 1);
        assert_eq!(store.incr("userid").await.unwrap(), 2);
        assert_eq!(store.counter("userid").await, 2);
    }

    #[tokio::test]
    async fn test_insert_if_absent_keeps_first_owner() {
        let store = MemoryStore::new();
        let replies = store
            .batch(vec![
                Command::insert_if_absent("usernames", "bob", 1),
                Command::insert_if_absent("usernames", "bob", 2),
            ])
            .await
            .unwrap();

        assert_eq!(replies, vec![Reply::Count(1), Reply::Count(0)]);
        assert_eq!(store.score("usernames", "bob").await.unwrap(), Some(1.0));
    }

    #[tokio::test]
    async fn test_update_if_present_ignores_missing_member() {
        let store = MemoryStore::new();
        store
            .batch(vec![
                Command::insert_if_absent("emails", "a@x.com", 1),
                Command::update_if_present("emails", "a@x.com", 5),
                Command::update_if_present("emails", "b@x.com", 5),
            ])
            .await
            .unwrap();

        assert_eq!(store.score("emails", "a@x.com").await.unwrap(), Some(5.0));
        assert_eq!(store.score("emails", "b@x.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_hash_lifecycle() {
        let store = MemoryStore::new();
        let fields = vec![
            ("id".to_string(), "1".to_string()),
            ("name".to_string(), "bob".to_string()),
        ];
        let replies = store
            .batch(vec![
                Command::set_all_fields("user:1", fields),
                Command::exists("user:1"),
            ])
            .await
            .unwrap();

        assert_eq!(replies[0], Reply::Count(2));
        assert_eq!(replies[1], Reply::Exists(true));
        assert_eq!(store.get_all_fields("user:1").await.unwrap().len(), 2);

        let replies = store
            .batch(vec![Command::delete_key("user:1"), Command::delete_key("user:1")])
            .await
            .unwrap();
        assert_eq!(replies, vec![Reply::Count(1), Reply::Count(0)]);
        assert!(!store.exists("user:1").await.unwrap());
        assert!(store.get_all_fields("user:1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_last_member_drops_set() {
        let store = MemoryStore::new();
        store
            .batch(vec![Command::insert_if_absent("emails", "a@x.com", 1)])
            .await
            .unwrap();
        assert!(store.exists("emails").await.unwrap());

        store
            .batch(vec![Command::remove_member("emails", "a@x.com")])
            .await
            .unwrap();
        assert!(!store.exists("emails").await.unwrap());
        assert_eq!(store.set_len("emails").await, 0);
    }
}
