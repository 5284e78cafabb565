//! Domain layer for the storefront service.
//!
//! This crate provides the core business rules:
//! - Product catalog entries with a non-negative stock level
//! - Users and the roles that gate administrative use cases
//! - ShoppingCart aggregate with quantity-merging line items
//! - Order aggregate with an enforced status state machine
//! - Flat-rate tax calculation

pub mod cart;
pub mod error;
pub mod order;
pub mod product;
pub mod tax;
pub mod user;

pub use cart::{ShoppingCart, ShoppingCartItem};
pub use common::{CartId, Money, OrderId, ProductId, UserId};
pub use error::DomainError;
pub use order::{Order, OrderItem, OrderParts, OrderStatus};
pub use product::{MAX_PRICE_CENTS, Product};
pub use tax::{CartTotal, TaxRate};
pub use user::{Role, User};
