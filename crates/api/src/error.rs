//! API error types with HTTP response mapping.

use application::ApplicationError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::DomainError;
use store::StoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed path, query or body.
    BadRequest(String),
    /// No usable `x-user-id` header.
    Unauthenticated(String),
    /// Error raised while dispatching a command or query.
    Application(ApplicationError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Application(err) => application_error_to_response(err),
        };

        if status.is_server_error() {
            tracing::error!(%status, error = %message, "request failed");
        }
        metrics::counter!("api_errors_total", "status" => status.as_str().to_string())
            .increment(1);

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn application_error_to_response(err: ApplicationError) -> (StatusCode, String) {
    let status = match &err {
        ApplicationError::Validation(_) => StatusCode::BAD_REQUEST,
        ApplicationError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
        ApplicationError::Unauthorized { .. } => StatusCode::FORBIDDEN,
        ApplicationError::NotFound { .. } => StatusCode::NOT_FOUND,
        ApplicationError::Domain(domain_err) => domain_status(domain_err),
        ApplicationError::Store(StoreError::Conflict(_)) => StatusCode::CONFLICT,
        ApplicationError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ApplicationError::Payment(_) => StatusCode::BAD_GATEWAY,
    };
    (status, err.to_string())
}

fn domain_status(err: &DomainError) -> StatusCode {
    match err {
        DomainError::InvalidQuantity { .. }
        | DomainError::InvalidPrice { .. }
        | DomainError::NegativeStock { .. }
        | DomainError::ProductNameRequired
        | DomainError::QuantityOverflow { .. }
        | DomainError::AmountOverflow
        | DomainError::EmptyCart => StatusCode::BAD_REQUEST,
        DomainError::ItemNotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::InsufficientStock { .. } | DomainError::InvalidStatusTransition { .. } => {
            StatusCode::CONFLICT
        }
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        ApiError::Application(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Application(err.into())
    }
}
