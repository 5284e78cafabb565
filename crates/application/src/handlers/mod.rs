//! [`Handler`](crate::Handler) implementations on the mediator, one module
//! per area of the store.

mod cart;
mod catalog;
mod checkout;
mod customers;
mod orders;
