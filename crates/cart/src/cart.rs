use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, Entity, ProductId};

use crate::product::Product;

/// Ordered, unique-by-id collection of cart lines.
///
/// Insertion order is first-added order. Every line holds a positive amount;
/// a line is removed rather than taken to zero.
///
/// Serializes as a plain JSON array of products. Decoding re-checks the
/// invariants, so a stored array with duplicate ids or non-positive amounts is
/// rejected instead of loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Product>", into = "Vec<Product>")]
pub struct Cart {
    items: Vec<Product>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from existing lines, checking uniqueness and positivity.
    pub fn from_items(items: Vec<Product>) -> DomainResult<Self> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id()) {
                return Err(DomainError::invariant(format!(
                    "duplicate product {} in cart",
                    item.id()
                )));
            }
            ensure_positive(item.amount)?;
        }
        Ok(Self { items })
    }

    pub fn items(&self) -> &[Product] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Quantity held for `id`, zero when absent.
    pub fn amount_of(&self, id: ProductId) -> i64 {
        self.get(id).map(|item| item.amount).unwrap_or(0)
    }

    /// Sum of all line quantities, saturating at `i64::MAX`.
    pub fn total_items(&self) -> i64 {
        self.items
            .iter()
            .fold(0i64, |total, item| total.saturating_add(item.amount))
    }

    /// Sum of all line totals.
    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(Product::line_total).sum()
    }

    /// Append a product not yet in the cart.
    pub fn with_added(&self, product: Product) -> DomainResult<Self> {
        if self.contains(product.id()) {
            return Err(DomainError::invariant(format!(
                "product {} already in cart",
                product.id()
            )));
        }
        ensure_positive(product.amount)?;

        let mut items = self.items.clone();
        items.push(product);
        Ok(Self { items })
    }

    /// Overwrite the amount of an existing line, keeping its position.
    pub fn with_amount(&self, id: ProductId, amount: i64) -> DomainResult<Self> {
        ensure_positive(amount)?;
        let index = self.position(id).ok_or_else(DomainError::not_found)?;

        let mut items = self.items.clone();
        items[index].amount = amount;
        Ok(Self { items })
    }

    /// Drop the line for `id`; the remaining lines keep their order.
    pub fn without(&self, id: ProductId) -> DomainResult<Self> {
        let index = self.position(id).ok_or_else(DomainError::not_found)?;

        let mut items = self.items.clone();
        items.remove(index);
        Ok(Self { items })
    }

    fn position(&self, id: ProductId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }
}

impl TryFrom<Vec<Product>> for Cart {
    type Error = DomainError;

    fn try_from(items: Vec<Product>) -> Result<Self, Self::Error> {
        Self::from_items(items)
    }
}

impl From<Cart> for Vec<Product> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a Product;
    type IntoIter = std::slice::Iter<'a, Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

fn ensure_positive(amount: i64) -> DomainResult<()> {
    if amount <= 0 {
        return Err(DomainError::validation(format!(
            "cart amount must be positive, got {amount}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64, amount: i64) -> Product {
        Product::new(
            ProductId::new(id),
            format!("Product {id}"),
            100.0 + id as f64,
            format!("https://example.test/{id}.jpg"),
        )
        .with_amount(amount)
    }

    fn ids(cart: &Cart) -> Vec<i64> {
        cart.iter().map(|p| p.id.get()).collect()
    }

    #[test]
    fn new_cart_is_empty() {
        let cart = Cart::new();
        assert!(cart.is_empty());
        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.amount_of(ProductId::new(1)), 0);
    }

    #[test]
    fn from_items_rejects_duplicate_ids() {
        let err = Cart::from_items(vec![product(1, 1), product(1, 2)]).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn from_items_rejects_non_positive_amounts() {
        let err = Cart::from_items(vec![product(1, 1), product(2, 0)]).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = Cart::from_items(vec![product(3, -4)]).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn with_added_appends_at_the_end() {
        let cart = Cart::from_items(vec![product(2, 1)]).unwrap();
        let cart = cart.with_added(product(1, 1)).unwrap();
        assert_eq!(ids(&cart), vec![2, 1]);
    }

    #[test]
    fn with_added_rejects_existing_id() {
        let cart = Cart::from_items(vec![product(1, 1)]).unwrap();
        assert!(cart.with_added(product(1, 1)).is_err());
    }

    #[test]
    fn with_amount_overwrites_in_place() {
        let cart = Cart::from_items(vec![product(1, 1), product(2, 2), product(3, 3)]).unwrap();
        let updated = cart.with_amount(ProductId::new(2), 5).unwrap();

        assert_eq!(ids(&updated), vec![1, 2, 3]);
        assert_eq!(updated.amount_of(ProductId::new(1)), 1);
        assert_eq!(updated.amount_of(ProductId::new(2)), 5);
        assert_eq!(updated.amount_of(ProductId::new(3)), 3);
        // original untouched
        assert_eq!(cart.amount_of(ProductId::new(2)), 2);
    }

    #[test]
    fn with_amount_on_missing_id_is_not_found() {
        let cart = Cart::from_items(vec![product(1, 1)]).unwrap();
        assert_eq!(
            cart.with_amount(ProductId::new(9), 2).unwrap_err(),
            DomainError::NotFound
        );
    }

    #[test]
    fn with_amount_rejects_zero() {
        let cart = Cart::from_items(vec![product(1, 1)]).unwrap();
        assert!(matches!(
            cart.with_amount(ProductId::new(1), 0).unwrap_err(),
            DomainError::Validation(_)
        ));
    }

    #[test]
    fn without_removes_exactly_one_line() {
        let cart = Cart::from_items(vec![product(1, 1), product(2, 4), product(3, 2)]).unwrap();
        let removed = cart.without(ProductId::new(2)).unwrap();

        assert_eq!(ids(&removed), vec![1, 3]);
        assert_eq!(removed.amount_of(ProductId::new(1)), 1);
        assert_eq!(removed.amount_of(ProductId::new(3)), 2);
    }

    #[test]
    fn without_missing_id_is_not_found() {
        let cart = Cart::new();
        assert_eq!(
            cart.without(ProductId::new(1)).unwrap_err(),
            DomainError::NotFound
        );
    }

    #[test]
    fn totals_sum_amounts_and_line_totals() {
        let cart = Cart::from_items(vec![
            Product::new(ProductId::new(1), "A", 10.0, "a.jpg").with_amount(2),
            Product::new(ProductId::new(2), "B", 2.5, "b.jpg").with_amount(4),
        ])
        .unwrap();

        assert_eq!(cart.total_items(), 6);
        assert!((cart.subtotal() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn total_items_saturates_instead_of_overflowing() {
        let cart = Cart::from_items(vec![product(1, i64::MAX), product(2, 5)]).unwrap();
        assert_eq!(cart.total_items(), i64::MAX);
    }

    #[test]
    fn borrowed_cart_iterates_in_insertion_order() {
        let cart = Cart::from_items(vec![product(3, 1), product(1, 2)]).unwrap();

        let mut seen = Vec::new();
        for item in &cart {
            seen.push((item.id.get(), item.amount));
        }
        assert_eq!(seen, vec![(3, 1), (1, 2)]);
    }

    #[test]
    fn serializes_as_a_plain_array() {
        let cart = Cart::from_items(vec![product(1, 2)]).unwrap();
        let value = serde_json::to_value(&cart).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["id"], 1);
        assert_eq!(value[0]["amount"], 2);
    }

    #[test]
    fn decoding_rejects_invariant_violations() {
        let json = r#"[
            {"id":1,"title":"A","price":1.0,"image":"a","amount":1},
            {"id":1,"title":"A","price":1.0,"image":"a","amount":2}
        ]"#;
        assert!(serde_json::from_str::<Cart>(json).is_err());

        let json = r#"[{"id":1,"title":"A","price":1.0,"image":"a","amount":0}]"#;
        assert!(serde_json::from_str::<Cart>(json).is_err());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn arb_cart() -> impl Strategy<Value = Cart> {
            prop::collection::btree_map(0i64..500, 1i64..50, 0..12).prop_flat_map(|lines| {
                let items: Vec<Product> = lines
                    .into_iter()
                    .map(|(id, amount)| product(id, amount))
                    .collect();
                Just(items).prop_shuffle().prop_map(|items| {
                    Cart::from_items(items).expect("generated lines are unique and positive")
                })
            })
        }

        proptest! {
            /// Property: JSON encoding preserves every line and its order.
            #[test]
            fn json_round_trip_preserves_order(cart in arb_cart()) {
                let json = serde_json::to_string(&cart).unwrap();
                let back: Cart = serde_json::from_str(&json).unwrap();
                prop_assert_eq!(back, cart);
            }

            /// Property: removing a line keeps the relative order and amounts of the rest.
            #[test]
            fn removal_preserves_remaining_lines(cart in arb_cart(), pick in any::<prop::sample::Index>()) {
                prop_assume!(!cart.is_empty());
                let target = cart.items()[pick.index(cart.len())].id;

                let removed = cart.without(target).unwrap();
                let expected: Vec<Product> = cart
                    .iter()
                    .filter(|p| p.id != target)
                    .cloned()
                    .collect();

                prop_assert_eq!(removed.items(), expected.as_slice());
                prop_assert!(!removed.contains(target));
            }

            /// Property: updating an amount never duplicates or reorders lines.
            #[test]
            fn update_keeps_ids_unique_and_ordered(
                cart in arb_cart(),
                pick in any::<prop::sample::Index>(),
                amount in 1i64..100
            ) {
                prop_assume!(!cart.is_empty());
                let target = cart.items()[pick.index(cart.len())].id;

                let updated = cart.with_amount(target, amount).unwrap();
                prop_assert_eq!(ids(&updated), ids(&cart));
                prop_assert_eq!(updated.amount_of(target), amount);
                prop_assert!(updated.iter().all(|p| p.amount > 0));
            }
        }
    }
}
