//! `storefront-client`
//!
//! **Responsibility:** the storefront's cart state container.
//!
//! This crate provides:
//! - `CartStore`: stock-aware add/remove/update over the cart, persisted after
//!   every change
//! - Local key-value storage backends (memory, JSON files, SQLite)
//! - Stock service clients (HTTP, in-memory)
//! - User notices for rejected operations
//!
//! The stock API remains the authority on availability; the cart never writes
//! stock back.

pub mod config;
pub mod notifier;
pub mod stock;
pub mod storage;
pub mod store;

pub use config::{CartConfig, ConfigError, StorageKind};
pub use notifier::{CartNotice, Notifier, RecordingNotifier, TracingNotifier};
pub use stock::{HttpStockService, InMemoryStockService, StockService, StockServiceError};
pub use storage::{CartStorage, FileStorage, MemoryStorage, SqliteStorage, StorageError, open_storage};
pub use store::{CartError, CartOperation, CartStore, UpdateProductAmount};
