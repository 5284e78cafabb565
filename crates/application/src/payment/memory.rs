use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use super::{PaymentError, PaymentGateway, PaymentOutcome, PaymentRequest};

#[derive(Debug, Default)]
struct InMemoryPaymentState {
    payments: HashMap<String, PaymentRequest>,
    next_id: u32,
    decline_reason: Option<String>,
}

/// In-memory payment gateway that approves every charge unless told to
/// decline.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentGateway {
    state: Arc<RwLock<InMemoryPaymentState>>,
}

impl InMemoryPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declines every following charge with `reason`, or approves again
    /// when `None`.
    pub fn set_decline(&self, reason: Option<&str>) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .decline_reason = reason.map(str::to_string);
    }

    /// Returns the number of approved charges.
    pub fn payment_count(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .payments
            .len()
    }

    /// Returns the request behind an approved payment.
    pub fn payment(&self, payment_id: &str) -> Option<PaymentRequest> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .payments
            .get(payment_id)
            .cloned()
    }
}

#[async_trait]
impl PaymentGateway for InMemoryPaymentGateway {
    async fn charge(&self, request: &PaymentRequest) -> Result<PaymentOutcome, PaymentError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(reason) = &state.decline_reason {
            return Ok(PaymentOutcome::Declined {
                reason: reason.clone(),
            });
        }

        state.next_id += 1;
        let payment_id = format!("PAY-{:04}", state.next_id);
        state.payments.insert(payment_id.clone(), request.clone());

        Ok(PaymentOutcome::Approved { payment_id })
    }
}
