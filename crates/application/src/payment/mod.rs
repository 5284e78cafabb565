//! Payment gateway port and its implementations.

mod http;
mod memory;

pub use http::HttpPaymentGateway;
pub use memory::InMemoryPaymentGateway;

use async_trait::async_trait;
use domain::{Money, OrderId, UserId};
use serde::Serialize;
use thiserror::Error;

/// Currency every charge is made in.
pub const CURRENCY: &str = "USD";

/// A request to charge a customer for one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentRequest {
    pub order_id: OrderId,
    pub user_id: UserId,
    #[serde(rename = "amount_cents")]
    pub amount: Money,
    pub currency: String,
}

impl PaymentRequest {
    pub fn new(order_id: OrderId, user_id: UserId, amount: Money) -> Self {
        Self {
            order_id,
            user_id,
            amount,
            currency: CURRENCY.to_string(),
        }
    }
}

/// The gateway's answer to a charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Approved { payment_id: String },
    Declined { reason: String },
}

/// Failures talking to the gateway. A decline is not an error.
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gateway returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected gateway response: {0}")]
    InvalidResponse(String),
}

/// Charges customers for placed orders.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, request: &PaymentRequest) -> Result<PaymentOutcome, PaymentError>;
}
