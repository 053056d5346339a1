//! User store configuration.

use std::env;

use common::StoreConfig;

/// User store configuration.
#[derive(Debug, Clone, Default)]
pub struct UserStoreConfig {
    /// Key-value store connection settings
    pub store: StoreConfig,
}

impl UserStoreConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from any variable source.
    ///
    /// `USER_STORE_REDIS_URL` takes precedence over the shared `REDIS_URL`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = StoreConfig::default();
        Self {
            store: StoreConfig {
                url: lookup("USER_STORE_REDIS_URL")
                    .or_else(|| lookup("REDIS_URL"))
                    .unwrap_or(defaults.url),
                request_timeout_ms: lookup("USER_STORE_REQUEST_TIMEOUT_MS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.request_timeout_ms),
            },
        }
    }

    /// Override the store URL (e.g. from a command-line flag).
    pub fn with_store_url(mut self, url: impl Into<String>) -> Self {
        self.store.url = url.into();
        self
    }
}
