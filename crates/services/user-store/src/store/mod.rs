//! Key-value store abstraction used by the repository.
//!
//! The repository only ever talks to a [`KeyValueStore`]; the Redis client
//! and the in-process store are interchangeable behind it.

mod command;
mod memory_store;
mod redis_store;

use std::collections::HashMap;

use async_trait::async_trait;

use common::AppResult;

pub use command::{expect_replies, Command, Reply};
pub use memory_store::MemoryStore;
pub use redis_store::RedisStore;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Store client contract.
///
/// Single-key operations are one round trip each. [`KeyValueStore::batch`]
/// sends several commands in one round trip that the store applies
/// atomically, with no other client's commands interleaved.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Atomically increment an integer counter and return the new value
    async fn incr(&self, key: &str) -> AppResult<i64>;

    /// All fields of a hash; empty if the key does not exist
    async fn get_all_fields(&self, key: &str) -> AppResult<HashMap<String, String>>;

    /// Whether a key exists
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Execute commands in one atomic round trip, one reply per command
    async fn batch(&self, commands: Vec<Command>) -> AppResult<Vec<Reply>>;

    /// Check connectivity
    async fn ping(&self) -> AppResult<()>;

    /// Score of a sorted-set member, `None` if absent
    async fn score(&self, key: &str, member: &str) -> AppResult<Option<f64>> {
        let [reply] = expect_replies::<1>(self.batch(vec![Command::score(key, member)]).await?)?;
        reply.into_score()
    }
}
