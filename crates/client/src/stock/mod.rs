//! Remote stock and product lookups.
//!
//! The stock API is the authority on availability. The cart only reads from
//! it: current stock before any quantity goes up, and product metadata when a
//! new line is added.

pub mod http;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use storefront_cart::{Product, Stock};
use storefront_core::ProductId;

pub use http::HttpStockService;
pub use memory::InMemoryStockService;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StockServiceError {
    #[error("product {0} not found")]
    NotFound(ProductId),
    #[error("network error: {0}")]
    Network(String),
    #[error("API error ({0}): {1}")]
    Api(u16, String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("service returned product {returned} when {requested} was requested")]
    Mismatch {
        requested: ProductId,
        returned: ProductId,
    },
}

/// Read access to stock levels and product metadata.
#[async_trait]
pub trait StockService: Send + Sync {
    /// Units currently available for `id`.
    async fn get_stock(&self, id: ProductId) -> Result<Stock, StockServiceError>;

    /// Catalog record for `id`. The returned `amount` carries no meaning.
    async fn get_product(&self, id: ProductId) -> Result<Product, StockServiceError>;
}
