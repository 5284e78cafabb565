use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use super::{PaymentError, PaymentGateway, PaymentOutcome, PaymentRequest};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Body returned by the gateway for `POST /payments`.
#[derive(Debug, Default, Deserialize)]
struct ChargeResponse {
    status: String,
    #[serde(default)]
    payment_id: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

/// Payment gateway reached over HTTP.
///
/// Charges are posted as JSON to `{base_url}/payments`. A 2xx body with
/// `"status": "approved"` and a `payment_id` approves the charge; a body with
/// `"status": "declined"` or an HTTP 402 declines it. Anything else is a
/// [`PaymentError`].
#[derive(Clone)]
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPaymentGateway {
    /// Creates a gateway client for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, PaymentError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn read_body(response: reqwest::Response) -> Result<ChargeResponse, PaymentError> {
        response
            .json()
            .await
            .map_err(|e| PaymentError::InvalidResponse(format!("Failed to parse response: {e}")))
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    #[tracing::instrument(skip(self, request), fields(order_id = %request.order_id))]
    async fn charge(&self, request: &PaymentRequest) -> Result<PaymentOutcome, PaymentError> {
        let url = format!("{}/payments", self.base_url);
        let response = self.client.post(&url).json(request).send().await?;
        let status = response.status();

        if status == StatusCode::PAYMENT_REQUIRED {
            // The decline reason is optional on a 402
            let body = response.json::<ChargeResponse>().await.unwrap_or_default();
            return Ok(PaymentOutcome::Declined {
                reason: body.reason.unwrap_or_else(|| "payment declined".to_string()),
            });
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = Self::read_body(response).await?;
        match body.status.as_str() {
            "approved" => body
                .payment_id
                .filter(|id| !id.is_empty())
                .map(|payment_id| PaymentOutcome::Approved { payment_id })
                .ok_or_else(|| {
                    PaymentError::InvalidResponse("approved charge without payment_id".to_string())
                }),
            "declined" => Ok(PaymentOutcome::Declined {
                reason: body.reason.unwrap_or_else(|| "payment declined".to_string()),
            }),
            other => Err(PaymentError::InvalidResponse(format!(
                "unknown charge status '{other}'"
            ))),
        }
    }
}

impl std::fmt::Debug for HttpPaymentGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPaymentGateway")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
