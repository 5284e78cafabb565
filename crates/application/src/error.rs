//! Application error types.

use domain::{DomainError, UserId};
use store::StoreError;
use thiserror::Error;

use crate::payment::PaymentError;
use crate::validation::ValidationErrors;

/// Errors returned by mediator dispatch.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// The request failed structural validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// The acting user does not exist.
    #[error("Unknown user: {0}")]
    Unauthenticated(UserId),

    /// The acting user lacks the role the operation requires.
    #[error("Unauthorized: {action} is not permitted for this user")]
    Unauthorized { action: &'static str },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The payment gateway could not be reached or answered nonsense.
    #[error("Payment gateway error: {0}")]
    Payment(#[from] PaymentError),
}

impl ApplicationError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ApplicationError>;
