//! Order aggregate and related types.

mod aggregate;
mod status;

pub use aggregate::{Order, OrderItem, OrderParts};
pub use status::OrderStatus;
