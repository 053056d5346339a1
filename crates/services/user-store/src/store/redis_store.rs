//! Redis store implementation.
//!
//! Wraps a multiplexed, auto-reconnecting connection. Batches are sent as
//! MULTI/EXEC pipelines so the server applies them as one unit.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client, Pipeline, RedisError, RedisResult, Value};

use common::{AppError, AppResult, StoreConfig};

use super::{Command, KeyValueStore, Reply};

/// Redis-backed [`KeyValueStore`].
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
    request_timeout: Duration,
}

impl RedisStore {
    /// Connect to Redis, bounded by the configured request timeout.
    pub async fn connect(config: &StoreConfig) -> AppResult<Self> {
        let request_timeout = Duration::from_millis(config.request_timeout_ms);
        let client = Client::open(config.url.as_str())?;

        let connection = tokio::time::timeout(request_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| {
                AppError::store(format!(
                    "connecting timed out after {} ms",
                    config.request_timeout_ms
                ))
            })??;

        tracing::info!("Redis store connected");

        Ok(Self {
            connection,
            request_timeout,
        })
    }

    /// Get the connection manager for direct Redis operations.
    pub fn connection(&self) -> ConnectionManager {
        self.connection.clone()
    }

    async fn with_timeout<T, F>(&self, op: &str, fut: F) -> AppResult<T>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match tokio::time::timeout(self.request_timeout, fut).await {
            Ok(result) => result.map_err(store_error),
            Err(_) => {
                let timeout_ms = self.request_timeout.as_millis();
                tracing::debug!(op = %op, timeout_ms = %timeout_ms, "Redis request timed out");
                Err(AppError::store(format!(
                    "{} timed out after {} ms",
                    op, timeout_ms
                )))
            }
        }
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn incr(&self, key: &str) -> AppResult<i64> {
        let mut conn = self.connection.clone();
        let value: i64 = self.with_timeout("INCR", conn.incr(key, 1)).await?;
        Ok(value)
    }

    async fn get_all_fields(&self, key: &str) -> AppResult<HashMap<String, String>> {
        let mut conn = self.connection.clone();
        let fields: HashMap<String, String> =
            self.with_timeout("HGETALL", conn.hgetall(key)).await?;
        Ok(fields)
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let mut conn = self.connection.clone();
        let exists: bool = self.with_timeout("EXISTS", conn.exists(key)).await?;
        Ok(exists)
    }

    async fn batch(&self, commands: Vec<Command>) -> AppResult<Vec<Reply>> {
        if commands.is_empty() {
            return Ok(Vec::new());
        }

        let mut pipe = redis::pipe();
        pipe.atomic();
        for command in &commands {
            push_command(&mut pipe, command);
        }

        tracing::debug!(
            commands = ?commands.iter().map(Command::name).collect::<Vec<_>>(),
            "Executing batch"
        );

        let mut conn = self.connection.clone();
        let values: Vec<Value> = self.with_timeout("MULTI/EXEC", pipe.query_async(&mut conn)).await?;

        if values.len() != commands.len() {
            return Err(AppError::store(format!(
                "batch of {} commands returned {} replies",
                commands.len(),
                values.len()
            )));
        }

        commands
            .iter()
            .zip(values.iter())
            .map(|(command, value)| decode_reply(command, value).map_err(store_error))
            .collect()
    }

    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: String = self
            .with_timeout("PING", redis::cmd("PING").query_async(&mut conn))
            .await?;
        Ok(())
    }
}

fn push_command(pipe: &mut Pipeline, command: &Command) {
    match command {
        Command::Score { key, member } => {
            pipe.cmd("ZSCORE").arg(key).arg(member);
        }
        Command::InsertIfAbsent { key, member, score } => {
            pipe.cmd("ZADD").arg(key).arg("NX").arg(*score).arg(member);
        }
        Command::UpdateIfPresent { key, member, score } => {
            pipe.cmd("ZADD").arg(key).arg("XX").arg(*score).arg(member);
        }
        Command::RemoveMember { key, member } => {
            pipe.cmd("ZREM").arg(key).arg(member);
        }
        Command::SetAllFields { key, fields } => {
            let hset = pipe.cmd("HSET").arg(key);
            for (field, value) in fields {
                hset.arg(field).arg(value);
            }
        }
        Command::DeleteKey { key } => {
            pipe.cmd("DEL").arg(key);
        }
        Command::Exists { key } => {
            pipe.cmd("EXISTS").arg(key);
        }
    }
}

fn decode_reply(command: &Command, value: &Value) -> RedisResult<Reply> {
    let reply = match command {
        Command::Score { .. } => Reply::Score(redis::from_redis_value(value)?),
        Command::Exists { .. } => Reply::Exists(redis::from_redis_value(value)?),
        Command::InsertIfAbsent { .. }
        | Command::UpdateIfPresent { .. }
        | Command::RemoveMember { .. }
        | Command::SetAllFields { .. }
        | Command::DeleteKey { .. } => Reply::Count(redis::from_redis_value(value)?),
    };
    Ok(reply)
}

/// Convert Redis error to AppError. Callers log the failure with context.
fn store_error(e: RedisError) -> AppError {
    tracing::debug!(error = %e, "Redis command failed");
    AppError::from(e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_score_reply() {
        let score = Command::score("usernames", "bob");
        let reply = decode_reply(&score, &Value::BulkString(b"3".to_vec())).unwrap();
        assert_eq!(reply, Reply::Score(Some(3.0)));

        let reply = decode_reply(&score, &Value::Nil).unwrap();
        assert_eq!(reply, Reply::Score(None));
    }

    #[test]
    fn test_decode_count_and_exists_replies() {
        let insert = Command::insert_if_absent("emails", "bob@x.com", 1);
        assert_eq!(decode_reply(&insert, &Value::Int(0)).unwrap(), Reply::Count(0));

        let exists = Command::exists("user:1");
        assert_eq!(decode_reply(&exists, &Value::Int(1)).unwrap(), Reply::Exists(true));
    }

    #[test]
    fn test_decode_type_mismatch_fails() {
        let exists = Command::exists("user:1");
        assert!(decode_reply(&exists, &Value::Array(vec![])).is_err());
    }

    #[test]
    fn test_pipeline_encoding() {
        let mut pipe = redis::pipe();
        push_command(
            &mut pipe,
            &Command::set_all_fields(
                "user:1",
                vec![
                    ("id".to_string(), "1".to_string()),
                    ("name".to_string(), "bob".to_string()),
                ],
            ),
        );
        let packed = String::from_utf8(pipe.get_packed_pipeline()).unwrap();
        assert!(packed.contains("HSET"));
        assert!(packed.contains("user:1"));
        assert!(packed.contains("bob"));
    }
}
