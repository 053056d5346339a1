//! Commands that can be grouped into one atomic round trip.

use common::{AppError, AppResult};

/// A single store command inside a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Score of `member` in sorted set `key` (ZSCORE)
    Score { key: String, member: String },
    /// Add `member` only if absent (ZADD NX); replies with the number added
    InsertIfAbsent {
        key: String,
        member: String,
        score: i64,
    },
    /// Rescore `member` only if present (ZADD XX); replies with the number added (always 0)
    UpdateIfPresent {
        key: String,
        member: String,
        score: i64,
    },
    /// Remove `member` from sorted set `key` (ZREM)
    RemoveMember { key: String, member: String },
    /// Write every field of hash `key` (HSET)
    SetAllFields {
        key: String,
        fields: Vec<(String, String)>,
    },
    /// Delete `key` whatever its type (DEL)
    DeleteKey { key: String },
    /// Whether `key` exists (EXISTS)
    Exists { key: String },
}

impl Command {
    pub fn score(key: &str, member: &str) -> Self {
        Command::Score {
            key: key.to_string(),
            member: member.to_string(),
        }
    }

    pub fn insert_if_absent(key: &str, member: &str, score: i64) -> Self {
        Command::InsertIfAbsent {
            key: key.to_string(),
            member: member.to_string(),
            score,
        }
    }

    pub fn update_if_present(key: &str, member: &str, score: i64) -> Self {
        Command::UpdateIfPresent {
            key: key.to_string(),
            member: member.to_string(),
            score,
        }
    }

    pub fn remove_member(key: &str, member: &str) -> Self {
        Command::RemoveMember {
            key: key.to_string(),
            member: member.to_string(),
        }
    }

    pub fn set_all_fields(key: &str, fields: Vec<(String, String)>) -> Self {
        Command::SetAllFields {
            key: key.to_string(),
            fields,
        }
    }

    pub fn delete_key(key: &str) -> Self {
        Command::DeleteKey {
            key: key.to_string(),
        }
    }

    pub fn exists(key: &str) -> Self {
        Command::Exists {
            key: key.to_string(),
        }
    }

    /// Redis command name, used in log fields.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Score { .. } => "ZSCORE",
            Command::InsertIfAbsent { .. } => "ZADD NX",
            Command::UpdateIfPresent { .. } => "ZADD XX",
            Command::RemoveMember { .. } => "ZREM",
            Command::SetAllFields { .. } => "HSET",
            Command::DeleteKey { .. } => "DEL",
            Command::Exists { .. } => "EXISTS",
        }
    }
}

/// Result of one command in a batch, in the same position as its command.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Score(Option<f64>),
    Count(i64),
    Exists(bool),
}

impl Reply {
    pub fn into_score(self) -> AppResult<Option<f64>> {
        match self {
            Reply::Score(score) => Ok(score),
            other => Err(unexpected("score", &other)),
        }
    }

    pub fn into_count(self) -> AppResult<i64> {
        match self {
            Reply::Count(n) => Ok(n),
            other => Err(unexpected("count", &other)),
        }
    }

    pub fn into_exists(self) -> AppResult<bool> {
        match self {
            Reply::Exists(exists) => Ok(exists),
            other => Err(unexpected("exists", &other)),
        }
    }
}

fn unexpected(expected: &str, got: &Reply) -> AppError {
    AppError::store(format!("expected {} reply, got {:?}", expected, got))
}

/// Take exactly `N` replies from a batch result.
pub fn expect_replies<const N: usize>(replies: Vec<Reply>) -> AppResult<[Reply; N]> {
    let len = replies.len();
    replies
        .try_into()
        .map_err(|_| AppError::store(format!("expected {} replies, got {}", N, len)))
}
