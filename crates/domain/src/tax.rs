//! Flat-rate sales tax.

use common::Money;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A tax rate expressed in basis points (1/100 of a percent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxRate(u32);

impl TaxRate {
    /// The store-wide 8% rate.
    pub const STANDARD: TaxRate = TaxRate(800);

    pub fn from_basis_points(basis_points: u32) -> Self {
        Self(basis_points)
    }

    pub fn basis_points(&self) -> u32 {
        self.0
    }

    /// Returns the tax owed on `subtotal`, rounded half-up to the cent.
    pub fn tax_on(&self, subtotal: Money) -> Result<Money, DomainError> {
        subtotal
            .checked_scale_basis_points(self.0)
            .ok_or(DomainError::AmountOverflow)
    }

    /// Breaks a subtotal into subtotal, tax and tax-inclusive total.
    pub fn totals(&self, subtotal: Money) -> Result<CartTotal, DomainError> {
        let tax = self.tax_on(subtotal)?;
        let total = subtotal
            .checked_add(tax)
            .ok_or(DomainError::AmountOverflow)?;
        Ok(CartTotal {
            subtotal,
            tax,
            total,
        })
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Tax-inclusive totals for a cart or order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotal {
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}
