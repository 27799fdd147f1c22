//! Cart domain module.
//!
//! This crate contains the cart's business rules, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage). Every transition
//! returns a new `Cart`, so callers can validate and persist before swapping
//! state in.

pub mod cart;
pub mod product;

pub use cart::Cart;
pub use product::{Product, Stock};
