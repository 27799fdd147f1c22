//! Client configuration, read from the environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Storage key the cart lives under unless overridden.
pub const DEFAULT_CART_KEY: &str = "@RocketShoes:cart";

/// Stock API base URL used when `STOREFRONT_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://localhost:3333";

pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_millis(5000);

pub const ENV_API_URL: &str = "STOREFRONT_API_URL";
pub const ENV_AUTH_TOKEN: &str = "STOREFRONT_AUTH_TOKEN";
pub const ENV_CART_KEY: &str = "STOREFRONT_CART_KEY";
pub const ENV_STORAGE: &str = "STOREFRONT_STORAGE";
pub const ENV_STORAGE_PATH: &str = "STOREFRONT_STORAGE_PATH";
pub const ENV_HTTP_TIMEOUT_MS: &str = "STOREFRONT_HTTP_TIMEOUT_MS";

/// Which local storage backend holds the cart.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum StorageKind {
    #[default]
    Sqlite,
    File,
    Memory,
}

impl StorageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKind::Sqlite => "sqlite",
            StorageKind::File => "file",
            StorageKind::Memory => "memory",
        }
    }
}

impl FromStr for StorageKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StorageKind::Sqlite),
            "file" => Ok(StorageKind::File),
            "memory" => Ok(StorageKind::Memory),
            other => Err(ConfigError::InvalidStorage(other.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown storage backend '{0}' (expected sqlite, file or memory)")]
    InvalidStorage(String),
    #[error("invalid HTTP timeout '{0}': expected milliseconds")]
    InvalidTimeout(String),
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    pub api_url: String,
    pub auth_token: Option<String>,
    pub storage_key: String,
    pub storage: StorageKind,
    /// Backend location; `None` resolves to the OS data directory.
    pub storage_path: Option<PathBuf>,
    pub http_timeout: Duration,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            auth_token: None,
            storage_key: DEFAULT_CART_KEY.to_string(),
            storage: StorageKind::default(),
            storage_path: None,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

impl CartConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Unset variables fall back to defaults; set-but-blank ones are treated
    /// as unset, except the cart key, which must be non-empty when given.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get(ENV_API_URL) {
            config.api_url = url.trim_end_matches('/').to_string();
        }

        config.auth_token = get(ENV_AUTH_TOKEN);

        if let Some(key) = lookup(ENV_CART_KEY) {
            if key.trim().is_empty() {
                return Err(ConfigError::Empty(ENV_CART_KEY));
            }
            config.storage_key = key;
        }

        if let Some(kind) = get(ENV_STORAGE) {
            config.storage = kind.parse()?;
        }

        config.storage_path = get(ENV_STORAGE_PATH).map(PathBuf::from);

        if let Some(raw) = get(ENV_HTTP_TIMEOUT_MS) {
            let millis = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?;
            config.http_timeout = Duration::from_millis(millis);
        }

        Ok(config)
    }
}
