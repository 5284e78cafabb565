//! ShoppingCart aggregate.

use common::{CartId, Money, ProductId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A line in a shopping cart.
///
/// Name and unit price are copied from the product when the line is added so
/// the cart can be rendered without loading the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingCartItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Money,
    pub quantity: u32,
}

impl ShoppingCartItem {
    /// Returns unit price times quantity.
    pub fn line_total(&self) -> Result<Money, DomainError> {
        self.unit_price
            .checked_multiply(self.quantity)
            .ok_or(DomainError::AmountOverflow)
    }
}

fn subtotal_of(items: &[ShoppingCartItem]) -> Result<Money, DomainError> {
    let lines = items
        .iter()
        .map(ShoppingCartItem::line_total)
        .collect::<Result<Vec<_>, _>>()?;
    Money::checked_sum(lines).ok_or(DomainError::AmountOverflow)
}

/// Shopping cart aggregate root. Each user owns at most one cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingCart {
    id: CartId,
    user_id: UserId,
    items: Vec<ShoppingCartItem>,
}

impl ShoppingCart {
    /// Creates an empty cart for a user.
    pub fn new(user_id: UserId) -> Self {
        Self {
            id: CartId::new(),
            user_id,
            items: Vec::new(),
        }
    }

    /// Rebuilds a cart from persisted state.
    pub fn restore(id: CartId, user_id: UserId, items: Vec<ShoppingCartItem>) -> Self {
        Self { id, user_id, items }
    }

    pub fn id(&self) -> CartId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn items(&self) -> &[ShoppingCartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the quantity of a product currently in the cart (0 if absent).
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.items
            .iter()
            .find(|item| item.product_id == product_id)
            .map_or(0, |item| item.quantity)
    }

    /// Returns Σ(unit price × quantity) over all lines.
    pub fn subtotal(&self) -> Result<Money, DomainError> {
        subtotal_of(&self.items)
    }

    /// Adds `quantity` units of a product.
    ///
    /// If the product is already in the cart the quantities are merged and the
    /// name/price snapshot is refreshed; otherwise a new line is appended.
    /// The cart is left unchanged if the merged quantity or the resulting
    /// subtotal would overflow.
    pub fn add_item(
        &mut self,
        product_id: ProductId,
        product_name: impl Into<String>,
        unit_price: Money,
        quantity: u32,
    ) -> Result<(), DomainError> {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity { quantity });
        }

        let product_name = product_name.into();
        let mut items = self.items.clone();
        match items.iter_mut().find(|item| item.product_id == product_id) {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(quantity)
                    .ok_or(DomainError::QuantityOverflow { product_id })?;
                existing.product_name = product_name;
                existing.unit_price = unit_price;
            }
            None => items.push(ShoppingCartItem {
                product_id,
                product_name,
                unit_price,
                quantity,
            }),
        }

        subtotal_of(&items)?;
        self.items = items;
        Ok(())
    }

    /// Removes `quantity` units of a product, dropping the line once its
    /// quantity reaches zero.
    pub fn remove_item(&mut self, product_id: ProductId, quantity: u32) -> Result<(), DomainError> {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity { quantity });
        }

        let position = self
            .items
            .iter()
            .position(|item| item.product_id == product_id)
            .ok_or(DomainError::ItemNotFound { product_id })?;

        let remaining = self.items[position].quantity.saturating_sub(quantity);
        if remaining == 0 {
            self.items.remove(position);
        } else {
            self.items[position].quantity = remaining;
        }

        Ok(())
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
