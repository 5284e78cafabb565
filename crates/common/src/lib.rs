//! Shared kernel for the storefront workspace.
//!
//! Typed identifiers and the [`Money`] amount used by every layer.

pub mod money;
pub mod types;

pub use money::Money;
pub use types::{CartId, OrderId, ProductId, UserId};
