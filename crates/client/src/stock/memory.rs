use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use storefront_cart::{Product, Stock};
use storefront_core::ProductId;

use super::{StockService, StockServiceError};

/// In-memory catalog and stock table.
///
/// Intended for tests/dev. Can be switched offline to simulate an outage.
#[derive(Debug, Default)]
pub struct InMemoryStockService {
    products: RwLock<HashMap<ProductId, Product>>,
    stock: RwLock<HashMap<ProductId, i64>>,
    offline: AtomicBool,
    product_lookups: AtomicUsize,
}

impl InMemoryStockService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a product with `available` units.
    pub fn with_product(self, product: Product, available: i64) -> Self {
        let id = product.id;
        if let Ok(mut products) = self.products.write() {
            products.insert(id, product);
        }
        self.set_stock(id, available);
        self
    }

    /// Set the available units for `id`, with or without a catalog record.
    pub fn set_stock(&self, id: ProductId, available: i64) {
        if let Ok(mut stock) = self.stock.write() {
            stock.insert(id, available);
        }
    }

    /// While offline, every lookup fails with a network error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of `get_product` calls served or attempted.
    pub fn product_lookups(&self) -> usize {
        self.product_lookups.load(Ordering::SeqCst)
    }

    fn ensure_online(&self) -> Result<(), StockServiceError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StockServiceError::Network("stock service offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl StockService for InMemoryStockService {
    async fn get_stock(&self, id: ProductId) -> Result<Stock, StockServiceError> {
        self.ensure_online()?;
        let stock = self
            .stock
            .read()
            .map_err(|_| StockServiceError::Network("lock poisoned".to_string()))?;
        stock
            .get(&id)
            .map(|amount| Stock::new(id, *amount))
            .ok_or(StockServiceError::NotFound(id))
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, StockServiceError> {
        self.product_lookups.fetch_add(1, Ordering::SeqCst);
        self.ensure_online()?;
        let products = self
            .products
            .read()
            .map_err(|_| StockServiceError::Network("lock poisoned".to_string()))?;
        products
            .get(&id)
            .cloned()
            .ok_or(StockServiceError::NotFound(id))
    }
}
