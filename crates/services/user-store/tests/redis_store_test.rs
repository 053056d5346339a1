//! Tests against a live Redis.
//!
//! Ignored by default. Run with a disposable database, e.g.
//! `REDIS_URL=redis://127.0.0.1:6379/15 cargo test -- --ignored`.
//! Each test flushes the selected database first.

use std::sync::Arc;

use common::{AppError, StoreConfig};
use domain::{User, EMAIL_INDEX_KEY, USERNAME_INDEX_KEY};
use user_store_lib::repository::{UserRepository, UserStore};
use user_store_lib::store::{Command, RedisStore, Reply};
use user_store_lib::KeyValueStore;

async fn connect() -> RedisStore {
    let config = StoreConfig {
        url: std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379/15".to_string()),
        ..StoreConfig::default()
    };
    let store = RedisStore::connect(&config).await.expect("redis not reachable");

    let mut conn = store.connection();
    let _: () = redis::cmd("FLUSHDB")
        .query_async(&mut conn)
        .await
        .expect("flush failed");
    store
}

#[tokio::test]
#[ignore]
async fn test_redis_batch_semantics() {
    let store = connect().await;

    let replies = store
        .batch(vec![
            Command::insert_if_absent("usernames", "bob", 1),
            Command::insert_if_absent("usernames", "bob", 2),
            Command::score("usernames", "bob"),
            Command::score("usernames", "nobody"),
            Command::exists("user:1"),
        ])
        .await
        .unwrap();

    assert_eq!(
        replies,
        vec![
            Reply::Count(1),
            Reply::Count(0),
            Reply::Score(Some(1.0)),
            Reply::Score(None),
            Reply::Exists(false),
        ]
    );
    store.ping().await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_redis_user_lifecycle() {
    let store = Arc::new(connect().await);
    let repo = UserStore::new(store.clone());

    let mut user = User::new("alice", "alice@x.com").with_attribute("city", "Bursa");
    repo.create(&mut user).await.unwrap();
    assert_eq!(user.id, 1);
    assert_eq!(repo.get(1).await.unwrap(), user);

    let err = repo
        .create(&mut User::new("alice", "second@x.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Duplicate(_)));

    repo.delete(1).await.unwrap();
    assert_eq!(repo.count(1).await.unwrap(), 0);
    assert_eq!(store.score(USERNAME_INDEX_KEY, "alice").await.unwrap(), None);
    assert_eq!(store.score(EMAIL_INDEX_KEY, "alice@x.com").await.unwrap(), None);
}
