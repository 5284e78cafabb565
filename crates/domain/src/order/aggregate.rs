//! Order aggregate implementation.

use chrono::{DateTime, Utc};
use common::{Money, OrderId, ProductId, UserId};
use serde::{Deserialize, Serialize};

use crate::cart::ShoppingCart;
use crate::error::DomainError;
use crate::tax::TaxRate;

use super::OrderStatus;

/// An item in an order, copied from the cart at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// The product identifier.
    pub product_id: ProductId,

    /// Human-readable product name.
    pub product_name: String,

    /// Quantity ordered.
    pub quantity: u32,

    /// Price per unit.
    pub unit_price: Money,
}

impl OrderItem {
    /// Returns the total price for this item (quantity * unit_price).
    pub fn total_price(&self) -> Result<Money, DomainError> {
        self.unit_price
            .checked_multiply(self.quantity)
            .ok_or(DomainError::AmountOverflow)
    }
}

/// Persisted state of an order, used to rebuild the aggregate.
#[derive(Debug, Clone)]
pub struct OrderParts {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub subtotal: Money,
    pub tax: Money,
    pub total_amount: Money,
    pub status: OrderStatus,
    pub payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Order aggregate root.
///
/// Items and amounts are fixed when the order is placed; only the status and
/// payment reference change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    user_id: UserId,
    items: Vec<OrderItem>,
    subtotal: Money,
    tax: Money,
    total_amount: Money,
    status: OrderStatus,
    payment_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl Order {
    /// Places a pending order from the contents of a cart.
    pub fn place(
        user_id: UserId,
        cart: &ShoppingCart,
        tax_rate: TaxRate,
    ) -> Result<Self, DomainError> {
        if cart.is_empty() {
            return Err(DomainError::EmptyCart);
        }

        let items: Vec<OrderItem> = cart
            .items()
            .iter()
            .map(|line| OrderItem {
                product_id: line.product_id,
                product_name: line.product_name.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
            })
            .collect();

        let lines = items
            .iter()
            .map(OrderItem::total_price)
            .collect::<Result<Vec<_>, _>>()?;
        let subtotal = Money::checked_sum(lines).ok_or(DomainError::AmountOverflow)?;
        let totals = tax_rate.totals(subtotal)?;

        Ok(Self {
            id: OrderId::new(),
            user_id,
            items,
            subtotal: totals.subtotal,
            tax: totals.tax,
            total_amount: totals.total,
            status: OrderStatus::Pending,
            payment_id: None,
            created_at: Utc::now(),
        })
    }

    /// Rebuilds an order from persisted state.
    pub fn restore(parts: OrderParts) -> Self {
        Self {
            id: parts.id,
            user_id: parts.user_id,
            items: parts.items,
            subtotal: parts.subtotal,
            tax: parts.tax,
            total_amount: parts.total_amount,
            status: parts.status,
            payment_id: parts.payment_id,
            created_at: parts.created_at,
        }
    }
}

// Query methods
impl Order {
    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    pub fn tax(&self) -> Money {
        self.tax
    }

    /// Returns the tax-inclusive total.
    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn payment_id(&self) -> Option<&str> {
        self.payment_id.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

// Status transitions
impl Order {
    /// Moves the order to `next`, rejecting transitions the lifecycle forbids.
    pub fn transition_to(&mut self, next: OrderStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidStatusTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Records a captured payment.
    pub fn mark_paid(&mut self, payment_id: impl Into<String>) -> Result<(), DomainError> {
        self.transition_to(OrderStatus::Paid)?;
        self.payment_id = Some(payment_id.into());
        Ok(())
    }

    pub fn mark_payment_failed(&mut self) -> Result<(), DomainError> {
        self.transition_to(OrderStatus::PaymentFailed)
    }

    pub fn ship(&mut self) -> Result<(), DomainError> {
        self.transition_to(OrderStatus::Shipped)
    }

    pub fn deliver(&mut self) -> Result<(), DomainError> {
        self.transition_to(OrderStatus::Delivered)
    }

    pub fn cancel(&mut self) -> Result<(), DomainError> {
        self.transition_to(OrderStatus::Cancelled)
    }
}
