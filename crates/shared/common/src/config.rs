//! Shared configuration structures.

use serde::{Deserialize, Serialize};

/// Key-value store connection configuration.
#[derive(Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Redis connection URL
    pub url: String,
    /// Upper bound for a single round trip in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            request_timeout_ms: 5000,
        }
    }
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("url", &"[REDACTED]")
            .field("request_timeout_ms", &self.request_timeout_ms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_url() {
        let config = StoreConfig {
            url: "redis://:secret@cache:6379".to_string(),
            ..StoreConfig::default()
        };
        let printed = format!("{:?}", config);
        assert!(!printed.contains("secret"));
        assert!(printed.contains("5000"));
    }
}
