//! User Store Library
//!
//! Data access for user records kept in a key-value store. Usernames and
//! emails are unique, ids come from an atomic counter. The repository runs
//! against Redis in production and against [`store::MemoryStore`] in tests.

pub mod cli;
pub mod commands;
pub mod config;
pub mod repository;
pub mod store;

use std::sync::Arc;

use common::AppResult;

use crate::cli::Commands;
use crate::config::UserStoreConfig;
use crate::repository::UserStore;
use crate::store::RedisStore;

pub use repository::UserRepository;
pub use store::{KeyValueStore, MemoryStore};

/// Connect to Redis, run one command and print its JSON output.
///
/// The connection lives for the duration of the call and is dropped on return.
pub async fn run(command: Commands, config: UserStoreConfig) -> AppResult<()> {
    let store = Arc::new(RedisStore::connect(&config.store).await?);
    let repo = UserStore::new(store.clone());

    let output = commands::execute(command, &repo, store.as_ref()).await?;
    println!("{:#}", output);

    Ok(())
}
