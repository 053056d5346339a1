//! User repository backed by a key-value store.
//!
//! Layout: `userid` counter, `usernames` / `emails` sorted sets scored with
//! the owner id, and one hash per user under `user:{id}`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use common::{AppError, AppResult};
use domain::{user_key, User, EMAIL_INDEX_KEY, USERNAME_INDEX_KEY, USER_ID_COUNTER_KEY};

use crate::store::{expect_replies, Command, KeyValueStore, Reply};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const UNIQUE_FIELDS: &str = "name and/or email";

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by id
    async fn get(&self, id: i64) -> AppResult<User>;

    /// Create a user with a freshly assigned id, written back to `user.id`
    async fn create(&self, user: &mut User) -> AppResult<()>;

    /// Overwrite an existing user whose name and email it already owns
    async fn update(&self, id: i64, user: &User) -> AppResult<()>;

    /// Remove a user and its index entries
    async fn delete(&self, id: i64) -> AppResult<()>;

    /// 1 if a record exists for the id, 0 otherwise
    async fn count(&self, id: i64) -> AppResult<i64>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    store: Arc<dyn KeyValueStore>,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Undo the writes of a create that lost a name/email to a concurrent
    /// writer. Only index members this call added are removed.
    async fn rollback_create(
        &self,
        user: &User,
        name_claimed: bool,
        email_claimed: bool,
    ) -> AppResult<()> {
        let mut commands = Vec::with_capacity(3);
        if name_claimed {
            commands.push(Command::remove_member(USERNAME_INDEX_KEY, &user.name));
        }
        if email_claimed {
            commands.push(Command::remove_member(EMAIL_INDEX_KEY, &user.email));
        }
        commands.push(Command::delete_key(&user_key(user.id)));

        self.store.batch(commands).await.inspect_err(|e| {
            tracing::error!(id = user.id, error = %e, "Rolling back orphaned user record failed");
        })?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn get(&self, id: i64) -> AppResult<User> {
        let fields = self
            .store
            .get_all_fields(&user_key(id))
            .await
            .inspect_err(|e| tracing::error!(id, error = %e, "Getting user failed"))?;

        decode_record(id, &fields)
    }

    async fn create(&self, user: &mut User) -> AppResult<()> {
        user.validate()?;

        // Check name and email in one round trip
        let replies = self
            .store
            .batch(vec![
                Command::score(USERNAME_INDEX_KEY, &user.name),
                Command::score(EMAIL_INDEX_KEY, &user.email),
            ])
            .await
            .inspect_err(|e| {
                tracing::error!(
                    name = %user.name,
                    email = %user.email,
                    error = %e,
                    "Getting score of username and/or email failed"
                )
            })?;
        let [name_score, email_score] = expect_replies::<2>(replies)?;

        if owner(name_score)?.is_some() || owner(email_score)?.is_some() {
            tracing::warn!(name = %user.name, email = %user.email, "Username and/or email already exists");
            return Err(AppError::duplicate(UNIQUE_FIELDS));
        }

        let id = self
            .store
            .incr(USER_ID_COUNTER_KEY)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Incrementing user id failed"))?;

        let mut record = user.clone();
        record.id = id;

        let replies = self
            .store
            .batch(vec![
                Command::insert_if_absent(USERNAME_INDEX_KEY, &record.name, id),
                Command::insert_if_absent(EMAIL_INDEX_KEY, &record.email, id),
                Command::set_all_fields(&user_key(id), record.to_fields()),
            ])
            .await
            .inspect_err(|e| {
                tracing::error!(
                    id,
                    name = %record.name,
                    email = %record.email,
                    error = %e,
                    "Creating user failed"
                )
            })?;
        let [name_added, email_added, _] = expect_replies::<3>(replies)?;
        let name_claimed = name_added.into_count()? == 1;
        let email_claimed = email_added.into_count()? == 1;

        // Another create claimed a value between the check and the commit
        if !(name_claimed && email_claimed) {
            tracing::warn!(
                id,
                name = %record.name,
                email = %record.email,
                "Username and/or email claimed concurrently, rolling back"
            );
            self.rollback_create(&record, name_claimed, email_claimed)
                .await?;
            return Err(AppError::duplicate(UNIQUE_FIELDS));
        }

        user.id = id;
        tracing::info!(id, name = %user.name, "User created");
        Ok(())
    }

    async fn update(&self, id: i64, user: &User) -> AppResult<()> {
        user.validate()?;
        if user.id != 0 && user.id != id {
            return Err(AppError::validation(format!(
                "user id {} does not match target id {}",
                user.id, id
            )));
        }

        let key = user_key(id);
        let replies = self
            .store
            .batch(vec![
                Command::score(USERNAME_INDEX_KEY, &user.name),
                Command::score(EMAIL_INDEX_KEY, &user.email),
                Command::exists(&key),
            ])
            .await
            .inspect_err(|e| {
                tracing::error!(
                    id,
                    name = %user.name,
                    email = %user.email,
                    error = %e,
                    "Getting score of username and/or email failed"
                )
            })?;
        let [name_score, email_score, record_exists] = expect_replies::<3>(replies)?;

        let (Some(name_owner), Some(email_owner)) = (owner(name_score)?, owner(email_score)?)
        else {
            tracing::warn!(id, name = %user.name, email = %user.email, "Username and/or email does not exist");
            return Err(AppError::not_found(UNIQUE_FIELDS));
        };

        if name_owner != id || email_owner != id {
            tracing::warn!(
                id,
                name_owner,
                email_owner,
                "Username and/or email belongs to another user"
            );
            return Err(AppError::duplicate(UNIQUE_FIELDS));
        }

        if !record_exists.into_exists()? {
            tracing::warn!(id, "Indexed user has no record");
            return Err(AppError::not_found(format!("user {}", id)));
        }

        let mut record = user.clone();
        record.id = id;

        let replies = self
            .store
            .batch(vec![
                Command::update_if_present(USERNAME_INDEX_KEY, &record.name, id),
                Command::update_if_present(EMAIL_INDEX_KEY, &record.email, id),
                Command::score(USERNAME_INDEX_KEY, &record.name),
                Command::score(EMAIL_INDEX_KEY, &record.email),
                Command::delete_key(&key),
                Command::set_all_fields(&key, record.to_fields()),
            ])
            .await
            .inspect_err(|e| {
                tracing::error!(
                    id,
                    name = %record.name,
                    email = %record.email,
                    error = %e,
                    "Updating user failed"
                )
            })?;
        let [_, _, name_score, email_score, _, _] = expect_replies::<6>(replies)?;

        // The indexes may have changed between the check and the commit.
        if owner(name_score)? != Some(id) || owner(email_score)? != Some(id) {
            tracing::warn!(
                id,
                name = %record.name,
                email = %record.email,
                "Username and/or email removed concurrently, dropping record"
            );
            self.store
                .batch(vec![Command::delete_key(&key)])
                .await
                .inspect_err(|e| {
                    tracing::error!(id, error = %e, "Dropping unindexed user record failed")
                })?;
            return Err(AppError::not_found(UNIQUE_FIELDS));
        }

        tracing::info!(id, "User updated");
        Ok(())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let key = user_key(id);
        let fields = self
            .store
            .get_all_fields(&key)
            .await
            .inspect_err(|e| tracing::error!(id, error = %e, "Getting user failed"))?;
        let user = decode_record(id, &fields)?;

        self.store
            .batch(vec![
                Command::remove_member(USERNAME_INDEX_KEY, &user.name),
                Command::remove_member(EMAIL_INDEX_KEY, &user.email),
                Command::delete_key(&key),
            ])
            .await
            .inspect_err(|e| {
                tracing::error!(
                    id,
                    name = %user.name,
                    email = %user.email,
                    error = %e,
                    "Deleting user failed"
                )
            })?;

        tracing::info!(id, "User deleted");
        Ok(())
    }

    async fn count(&self, id: i64) -> AppResult<i64> {
        let exists = self.store.exists(&user_key(id)).await?;
        Ok(i64::from(exists))
    }
}

/// Owner id recorded in an index score reply.
fn owner(reply: Reply) -> AppResult<Option<i64>> {
    Ok(reply.into_score()?.map(|score| score as i64))
}

fn decode_record(id: i64, fields: &HashMap<String, String>) -> AppResult<User> {
    if fields.is_empty() {
        tracing::debug!(id, "User record not found");
        return Err(AppError::not_found(format!("user {}", id)));
    }

    User::from_fields(fields).map_err(|e| {
        tracing::error!(id, error = %e, "Decoding user record failed");
        AppError::from(e)
    })
}
