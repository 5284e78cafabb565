//! Domain error types.

use common::ProductId;
use thiserror::Error;

use crate::order::OrderStatus;

/// Errors raised when a business rule rejects an operation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid quantity.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// Price is not positive or exceeds the catalog ceiling.
    #[error("Invalid price: {cents} cents (must be between 1 and {max})", max = crate::product::MAX_PRICE_CENTS)]
    InvalidPrice { cents: i64 },

    /// Merging into a cart line would exceed the largest representable quantity.
    #[error("Quantity for product {product_id} exceeds the per-line limit")]
    QuantityOverflow { product_id: ProductId },

    /// A cart or order amount does not fit in the money representation.
    #[error("Amount exceeds the largest supported value")]
    AmountOverflow,

    /// Stock levels can never drop below zero.
    #[error("Invalid stock level: {stock} (must not be negative)")]
    NegativeStock { stock: i64 },

    /// Product name is blank.
    #[error("Product name is required")]
    ProductNameRequired,

    /// Requested quantity exceeds the stock on hand.
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: i64,
    },

    /// Item not found in cart.
    #[error("Item not found: {product_id}")]
    ItemNotFound { product_id: ProductId },

    /// Cart has no items to check out.
    #[error("Cart has no items")]
    EmptyCart,

    /// Order status change not permitted from the current status.
    #[error("Invalid status transition: cannot move order from {from} to {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },
}
