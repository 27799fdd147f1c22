use serde::{Deserialize, Serialize};

use storefront_core::{Entity, ProductId};

/// A catalog product as held in the cart.
///
/// `amount` is the quantity in the cart. Records served by the stock API
/// carry no amount, so it defaults to zero when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: f64,
    pub image: String,
    #[serde(default)]
    pub amount: i64,
}

impl Product {
    pub fn new(
        id: ProductId,
        title: impl Into<String>,
        price: f64,
        image: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            price,
            image: image.into(),
            amount: 0,
        }
    }

    /// Same product with the given cart quantity.
    pub fn with_amount(mut self, amount: i64) -> Self {
        self.amount = amount;
        self
    }

    /// Line total: unit price times quantity.
    pub fn line_total(&self) -> f64 {
        self.price * self.amount as f64
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

/// Units available remotely for a product.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub id: ProductId,
    pub amount: i64,
}

impl Stock {
    pub fn new(id: ProductId, amount: i64) -> Self {
        Self { id, amount }
    }

    /// Whether `requested` units can be served from this stock level.
    pub fn covers(&self, requested: i64) -> bool {
        requested <= self.amount
    }
}
