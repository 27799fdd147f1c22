//! Local key-value storage for the persisted cart.
//!
//! The cart is stored as one string value under one key, the way a browser's
//! local storage would hold it. Backends only move strings; encoding belongs
//! to the store.

pub mod file;
pub mod memory;
pub mod sqlite;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use thiserror::Error;

use crate::config::{CartConfig, StorageKind};

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage backend error: {0:#}")]
    Backend(#[from] anyhow::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// String key-value store.
#[async_trait]
pub trait CartStorage: Send + Sync {
    /// Value under `key`, or `None` when nothing was stored.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Open the backend selected by `config`.
///
/// File and SQLite backends default to `{app_data_dir}/storefront/`.
pub fn open_storage(config: &CartConfig) -> Result<Arc<dyn CartStorage>, StorageError> {
    tracing::info!("opening {} cart storage", config.storage.as_str());

    let storage: Arc<dyn CartStorage> = match config.storage {
        StorageKind::Memory => Arc::new(MemoryStorage::new()),
        StorageKind::File => {
            let dir = match &config.storage_path {
                Some(path) => path.clone(),
                None => data_dir()?,
            };
            Arc::new(FileStorage::new(dir))
        }
        StorageKind::Sqlite => {
            let path = match &config.storage_path {
                Some(path) => path.clone(),
                None => data_dir()?.join("cart.db"),
            };
            Arc::new(SqliteStorage::new(path))
        }
    };

    Ok(storage)
}

/// Resolve the app data directory: `{app_data_dir}/storefront`.
fn data_dir() -> anyhow::Result<PathBuf> {
    let base = dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|mut h| {
            h.push(".local");
            h.push("share");
            h
        }))
        .context("failed to resolve OS app data directory - tried data_dir() and home_dir()/.local/share")?;

    let mut dir = base;
    dir.push("storefront");
    Ok(dir)
}
