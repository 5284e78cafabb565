//! Catalog products and their stock levels.

use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Highest unit price the catalog accepts ($10 billion).
pub const MAX_PRICE_CENTS: i64 = 1_000_000_000_000;

/// A product available for purchase.
///
/// The stock level is signed so that a negative request can be expressed and
/// rejected, but a `Product` never holds a negative stock level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    price: Money,
    stock: i64,
}

impl Product {
    /// Creates a new product with a generated identifier.
    pub fn new(name: impl Into<String>, price: Money, stock: i64) -> Result<Self, DomainError> {
        Self::with_id(ProductId::new(), name, price, stock)
    }

    /// Creates a product with a known identifier, validating every field.
    pub fn with_id(
        id: ProductId,
        name: impl Into<String>,
        price: Money,
        stock: i64,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::ProductNameRequired);
        }
        if !price.is_positive() || price.cents() > MAX_PRICE_CENTS {
            return Err(DomainError::InvalidPrice {
                cents: price.cents(),
            });
        }
        if stock < 0 {
            return Err(DomainError::NegativeStock { stock });
        }

        Ok(Self {
            id,
            name,
            price,
            stock,
        })
    }

    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn stock(&self) -> i64 {
        self.stock
    }

    /// Returns true if `quantity` units can be taken from stock.
    pub fn has_stock(&self, quantity: u32) -> bool {
        i64::from(quantity) <= self.stock
    }

    /// Fails with `InsufficientStock` unless `quantity` units are on hand.
    pub fn ensure_available(&self, quantity: u32) -> Result<(), DomainError> {
        if self.has_stock(quantity) {
            Ok(())
        } else {
            Err(DomainError::InsufficientStock {
                product_id: self.id,
                requested: quantity,
                available: self.stock,
            })
        }
    }

    /// Replaces the stock level.
    pub fn set_stock(&mut self, stock: i64) -> Result<(), DomainError> {
        if stock < 0 {
            return Err(DomainError::NegativeStock { stock });
        }
        self.stock = stock;
        Ok(())
    }

    /// Takes `quantity` units out of stock.
    pub fn remove_stock(&mut self, quantity: u32) -> Result<(), DomainError> {
        self.ensure_available(quantity)?;
        self.stock -= i64::from(quantity);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(stock: i64) -> Product {
        Product::new("Widget", Money::from_cents(1000), stock).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_fields() {
        assert_eq!(
            Product::new("  ", Money::from_cents(100), 1),
            Err(DomainError::ProductNameRequired)
        );
        assert_eq!(
            Product::new("Widget", Money::zero(), 1),
            Err(DomainError::InvalidPrice { cents: 0 })
        );
        assert_eq!(
            Product::new("Widget", Money::from_cents(MAX_PRICE_CENTS + 1), 1),
            Err(DomainError::InvalidPrice {
                cents: MAX_PRICE_CENTS + 1
            })
        );
        assert!(Product::new("Widget", Money::from_cents(MAX_PRICE_CENTS), 1).is_ok());
        assert_eq!(
            Product::new("Widget", Money::from_cents(100), -1),
            Err(DomainError::NegativeStock { stock: -1 })
        );
    }

    #[test]
    fn test_set_stock_rejects_negative() {
        let mut product = widget(5);
        assert_eq!(
            product.set_stock(-3),
            Err(DomainError::NegativeStock { stock: -3 })
        );
        assert_eq!(product.stock(), 5);

        product.set_stock(0).unwrap();
        assert_eq!(product.stock(), 0);
    }

    #[test]
    fn test_remove_stock() {
        let mut product = widget(5);
        product.remove_stock(2).unwrap();
        assert_eq!(product.stock(), 3);

        let err = product.remove_stock(4).unwrap_err();
        assert!(matches!(
            err,
            DomainError::InsufficientStock {
                requested: 4,
                available: 3,
                ..
            }
        ));
        assert_eq!(product.stock(), 3);
    }

    #[test]
    fn test_has_stock_boundaries() {
        let product = widget(2);
        assert!(product.has_stock(0));
        assert!(product.has_stock(2));
        assert!(!product.has_stock(3));
    }
}
