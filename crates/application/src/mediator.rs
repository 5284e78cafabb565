//! Request dispatch.

use std::sync::Arc;

use async_trait::async_trait;
use domain::{TaxRate, User, UserId};
use store::Repositories;
use tracing::Instrument;

use crate::error::{ApplicationError, Result};
use crate::payment::PaymentGateway;
use crate::validation::Validate;

/// A command or query the [`Mediator`] can dispatch.
pub trait Request: Validate + Send + std::fmt::Debug {
    /// What a successful dispatch returns.
    type Response: Send;

    /// Label used in spans and metrics.
    const NAME: &'static str;
}

/// Executes one kind of request.
#[async_trait]
pub trait Handler<R: Request>: Send + Sync {
    async fn handle(&self, request: R) -> Result<R::Response>;
}

/// Dispatches commands and queries to their handlers.
///
/// The mediator owns every collaborator a use case needs and implements
/// [`Handler`] for each request type.
#[derive(Clone)]
pub struct Mediator {
    pub(crate) repositories: Repositories,
    pub(crate) payments: Arc<dyn PaymentGateway>,
    pub(crate) tax_rate: TaxRate,
}

impl Mediator {
    pub fn new(repositories: Repositories, payments: Arc<dyn PaymentGateway>) -> Self {
        Self {
            repositories,
            payments,
            tax_rate: TaxRate::default(),
        }
    }

    pub fn with_tax_rate(mut self, tax_rate: TaxRate) -> Self {
        self.tax_rate = tax_rate;
        self
    }

    pub fn repositories(&self) -> &Repositories {
        &self.repositories
    }

    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    /// Validates `request` and runs its handler.
    pub async fn send<R>(&self, request: R) -> Result<R::Response>
    where
        R: Request + 'static,
        Self: Handler<R>,
    {
        let span = tracing::info_span!("mediator.send", request = R::NAME);

        async move {
            metrics::counter!("mediator_requests_total", "request" => R::NAME).increment(1);

            if let Err(errors) = request.validate() {
                tracing::debug!(%errors, "Request rejected by validation");
                return Err(errors.into());
            }

            let result = Handler::<R>::handle(self, request).await;
            if let Err(error) = &result {
                tracing::debug!(%error, "Request failed");
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Loads the acting user.
    pub(crate) async fn actor(&self, user_id: UserId) -> Result<User> {
        self.repositories
            .users
            .get(user_id)
            .await?
            .ok_or(ApplicationError::Unauthenticated(user_id))
    }
}

impl std::fmt::Debug for Mediator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mediator")
            .field("tax_rate", &self.tax_rate)
            .finish_non_exhaustive()
    }
}
