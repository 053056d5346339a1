//! CLI command implementations.

use serde_json::{json, Value};

use common::{AppError, AppResult};

use crate::cli::Commands;
use crate::repository::UserRepository;
use crate::store::KeyValueStore;

/// Run one command and return the JSON document to print.
pub async fn execute(
    command: Commands,
    repo: &dyn UserRepository,
    store: &dyn KeyValueStore,
) -> AppResult<Value> {
    match command {
        Commands::Get { id } => {
            let user = repo.get(id).await?;
            to_json(&user)
        }
        Commands::Create(args) => {
            let mut user = args.into_user();
            repo.create(&mut user).await?;
            to_json(&user)
        }
        Commands::Update { id, user } => {
            let mut user = user.into_user();
            user.id = id;
            repo.update(id, &user).await?;
            to_json(&user)
        }
        Commands::Delete { id } => {
            repo.delete(id).await?;
            Ok(json!({ "deleted": id }))
        }
        Commands::Count { id } => {
            let count = repo.count(id).await?;
            Ok(json!({ "id": id, "count": count }))
        }
        Commands::Ping => {
            store.ping().await?;
            Ok(json!({ "pong": true }))
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> AppResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| AppError::internal(format!("Serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::UserArgs;
    use crate::repository::MockUserRepository;
    use crate::store::MemoryStore;
    use domain::User;
    use mockall::predicate::eq;

    fn args(name: &str, email: &str) -> UserArgs {
        UserArgs {
            name: name.to_string(),
            email: email.to_string(),
            attributes: vec![],
        }
    }

    #[tokio::test]
    async fn test_create_prints_assigned_id() {
        let mut repo = MockUserRepository::new();
        repo.expect_create().times(1).returning(|user| {
            user.id = 11;
            Ok(())
        });

        let output = execute(
            Commands::Create(args("zoe", "zoe@x.com")),
            &repo,
            &MemoryStore::new(),
        )
        .await
        .unwrap();

        assert_eq!(output["id"], 11);
        assert_eq!(output["email"], "zoe@x.com");
    }

    #[tokio::test]
    async fn test_update_targets_given_id() {
        let mut repo = MockUserRepository::new();
        repo.expect_update()
            .withf(|id, user| *id == 2 && user.id == 2 && user.name == "bo")
            .times(1)
            .returning(|_, _| Ok(()));

        let output = execute(
            Commands::Update {
                id: 2,
                user: args("bo", "bo@x.com"),
            },
            &repo,
            &MemoryStore::new(),
        )
        .await
        .unwrap();
        assert_eq!(output["id"], 2);
    }

    #[tokio::test]
    async fn test_get_propagates_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_get()
            .with(eq(8))
            .returning(|id| Err(AppError::not_found(format!("user {}", id))));

        let err = execute(Commands::Get { id: 8 }, &repo, &MemoryStore::new())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_get_prints_user() {
        let mut repo = MockUserRepository::new();
        repo.expect_get().returning(|id| {
            let mut user = User::new("kim", "kim@x.com").with_attribute("team", "ops");
            user.id = id;
            Ok(user)
        });

        let output = execute(Commands::Get { id: 6 }, &repo, &MemoryStore::new())
            .await
            .unwrap();
        assert_eq!(output["id"], 6);
        assert_eq!(output["attributes"]["team"], "ops");
    }

    #[tokio::test]
    async fn test_count_and_ping() {
        let mut repo = MockUserRepository::new();
        repo.expect_count().returning(|_| Ok(0));
        let store = MemoryStore::new();

        let output = execute(Commands::Count { id: 4 }, &repo, &store).await.unwrap();
        assert_eq!(output, json!({ "id": 4, "count": 0 }));

        let output = execute(Commands::Ping, &repo, &store).await.unwrap();
        assert_eq!(output, json!({ "pong": true }));
    }
}
