//! The cart state container.
//!
//! `CartStore` owns the one mutable cart. Every operation either commits a
//! new cart (persisted first, then swapped in) or leaves the current one
//! untouched and raises exactly one notice. Operations take `&mut self`, so
//! they run one at a time even though they suspend on the stock service.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use storefront_cart::Cart;
use storefront_core::{DomainError, ProductId};

use crate::notifier::{CartNotice, Notifier};
use crate::stock::{StockService, StockServiceError};
use crate::storage::{CartStorage, StorageError};

/// Arguments for [`CartStore::update_product_amount`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    pub amount: i64,
}

/// The three cart mutations, used to pick the failure notice.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CartOperation {
    Add,
    Remove,
    Update,
}

impl CartOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            CartOperation::Add => "add",
            CartOperation::Remove => "remove",
            CartOperation::Update => "update",
        }
    }

    fn failure_notice(&self) -> CartNotice {
        match self {
            CartOperation::Add => CartNotice::AddFailed,
            CartOperation::Remove => CartNotice::RemoveFailed,
            CartOperation::Update => CartNotice::UpdateFailed,
        }
    }
}

#[derive(Debug, Error)]
pub enum CartError {
    #[error("requested {requested} of product {product_id}, only {available} in stock")]
    StockExceeded {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },
    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),
    #[error("stock service failed: {0}")]
    Service(#[from] StockServiceError),
    #[error("failed to persist cart: {0}")]
    Storage(#[from] StorageError),
    #[error("failed to encode cart: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl CartError {
    /// Notice shown to the user when `operation` fails with this error.
    pub fn notice(&self, operation: CartOperation) -> CartNotice {
        match self {
            CartError::StockExceeded { .. } => CartNotice::StockExceeded,
            _ => operation.failure_notice(),
        }
    }
}

pub struct CartStore {
    cart: Cart,
    key: String,
    storage: Arc<dyn CartStorage>,
    stock: Arc<dyn StockService>,
    notifier: Arc<dyn Notifier>,
}

impl core::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.key)
            .field("cart", &self.cart)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Load the persisted cart under `key` and build the store around it.
    ///
    /// Missing data starts an empty cart. Unreadable or malformed data also
    /// starts an empty cart, with a warning; nothing is written here.
    pub async fn load(
        key: impl Into<String>,
        storage: Arc<dyn CartStorage>,
        stock: Arc<dyn StockService>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let key = key.into();
        let cart = restore_cart(storage.as_ref(), &key).await;

        tracing::info!("cart loaded from '{}' with {} line(s)", key, cart.len());

        Self {
            cart,
            key,
            storage,
            stock,
            notifier,
        }
    }

    /// Current cart snapshot.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    /// Add one unit of `product_id`. Returns whether the cart changed.
    pub async fn add_product(&mut self, product_id: ProductId) -> bool {
        let result = self.try_add_product(product_id).await;
        self.settle(CartOperation::Add, product_id, result)
    }

    /// Drop the line for `product_id`. Returns whether the cart changed.
    pub async fn remove_product(&mut self, product_id: ProductId) -> bool {
        let result = self.try_remove_product(product_id).await;
        self.settle(CartOperation::Remove, product_id, result)
    }

    /// Set the quantity of an existing line. Returns whether the cart changed.
    ///
    /// Non-positive amounts are ignored without a notice.
    pub async fn update_product_amount(&mut self, update: UpdateProductAmount) -> bool {
        let result = self.try_update_product_amount(update).await;
        self.settle(CartOperation::Update, update.product_id, result)
    }

    /// Fallible form of [`add_product`](Self::add_product); raises no notice.
    pub async fn try_add_product(&mut self, product_id: ProductId) -> Result<bool, CartError> {
        let stock = self.stock.get_stock(product_id).await?;

        // A line already at i64::MAX cannot grow; no stock covers that.
        let Some(requested) = self.cart.amount_of(product_id).checked_add(1) else {
            return Err(CartError::StockExceeded {
                product_id,
                requested: i64::MAX,
                available: stock.amount,
            });
        };
        if !stock.covers(requested) {
            return Err(CartError::StockExceeded {
                product_id,
                requested,
                available: stock.amount,
            });
        }

        let next = if self.cart.contains(product_id) {
            self.cart.with_amount(product_id, requested)?
        } else {
            let product = self.stock.get_product(product_id).await?;
            if product.id != product_id {
                return Err(StockServiceError::Mismatch {
                    requested: product_id,
                    returned: product.id,
                }
                .into());
            }
            self.cart.with_added(product.with_amount(requested))?
        };

        self.commit(next).await
    }

    /// Fallible form of [`remove_product`](Self::remove_product); raises no notice.
    pub async fn try_remove_product(&mut self, product_id: ProductId) -> Result<bool, CartError> {
        let next = self
            .cart
            .without(product_id)
            .map_err(|err| not_in_cart(err, product_id))?;

        self.commit(next).await
    }

    /// Fallible form of [`update_product_amount`](Self::update_product_amount);
    /// raises no notice.
    pub async fn try_update_product_amount(
        &mut self,
        update: UpdateProductAmount,
    ) -> Result<bool, CartError> {
        let UpdateProductAmount { product_id, amount } = update;
        if amount <= 0 {
            tracing::debug!("ignoring update of product {} to {}", product_id, amount);
            return Ok(false);
        }

        let stock = self.stock.get_stock(product_id).await?;
        if !stock.covers(amount) {
            return Err(CartError::StockExceeded {
                product_id,
                requested: amount,
                available: stock.amount,
            });
        }

        let next = self
            .cart
            .with_amount(product_id, amount)
            .map_err(|err| not_in_cart(err, product_id))?;

        self.commit(next).await
    }

    /// Persist `next` and make it current. Unchanged carts are not written.
    async fn commit(&mut self, next: Cart) -> Result<bool, CartError> {
        if next == self.cart {
            return Ok(false);
        }

        let payload = serde_json::to_string(&next)?;
        self.storage.set(&self.key, &payload).await?;
        self.cart = next;
        Ok(true)
    }

    fn settle(
        &self,
        operation: CartOperation,
        product_id: ProductId,
        result: Result<bool, CartError>,
    ) -> bool {
        match result {
            Ok(true) => {
                tracing::info!(
                    "cart {} of product {} committed ({} line(s), {} item(s))",
                    operation.as_str(),
                    product_id,
                    self.cart.len(),
                    self.cart.total_items()
                );
                true
            }
            Ok(false) => false,
            Err(err) => {
                match &err {
                    CartError::StockExceeded { .. } | CartError::NotInCart(_) => {
                        tracing::warn!("cart {} of product {} rejected: {}", operation.as_str(), product_id, err);
                    }
                    _ => {
                        tracing::error!("cart {} of product {} failed: {}", operation.as_str(), product_id, err);
                    }
                }
                self.notifier.notify(err.notice(operation));
                false
            }
        }
    }
}

fn not_in_cart(err: DomainError, product_id: ProductId) -> CartError {
    match err {
        DomainError::NotFound => CartError::NotInCart(product_id),
        other => CartError::Domain(other),
    }
}

async fn restore_cart(storage: &dyn CartStorage, key: &str) -> Cart {
    let raw = match storage.get(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return Cart::new(),
        Err(err) => {
            tracing::warn!("failed to read cart from '{}', starting empty: {}", key, err);
            return Cart::new();
        }
    };

    match serde_json::from_str::<Cart>(&raw) {
        Ok(cart) => cart,
        Err(err) => {
            tracing::warn!("discarding malformed cart stored under '{}': {}", key, err);
            Cart::new()
        }
    }
}
