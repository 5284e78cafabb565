//! Application layer for the storefront service.
//!
//! Every use case is a command or query object dispatched through the
//! [`Mediator`]. Dispatch validates the request, records metrics and runs
//! the matching [`Handler`] inside a tracing span.
//!
//! Commands:
//! - [`AddItemToCart`], [`RemoveItemFromCart`]
//! - [`ProcessPayment`] (checkout)
//! - [`UpdateStock`] (inventory management), [`CreateProduct`]
//! - [`RegisterUser`], [`UpdateOrderStatus`]
//!
//! Queries:
//! - [`CalculateCartTotal`], [`GetCart`]
//! - [`AccessCustomerData`], [`GetOrder`], [`ListOrders`]
//! - [`GetProduct`], [`ListProducts`]

mod authorization;
pub mod commands;
pub mod error;
mod handlers;
pub mod mediator;
pub mod payment;
pub mod queries;
pub mod validation;

#[cfg(test)]
mod test_support;

pub use commands::{
    AddItemToCart, CreateProduct, ProcessPayment, RegisterUser, RemoveItemFromCart,
    UpdateOrderStatus, UpdateStock,
};
pub use error::ApplicationError;
pub use mediator::{Handler, Mediator, Request};
pub use payment::{
    HttpPaymentGateway, InMemoryPaymentGateway, PaymentError, PaymentGateway, PaymentOutcome,
    PaymentRequest,
};
pub use queries::{
    AccessCustomerData, CalculateCartTotal, CustomerData, GetCart, GetOrder, GetProduct,
    ListOrders, ListProducts,
};
pub use validation::{FieldError, Validate, ValidationErrors};
