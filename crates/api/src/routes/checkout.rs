//! Checkout endpoint.

use std::sync::Arc;

use application::ProcessPayment;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use domain::OrderStatus;

use super::orders::OrderResponse;
use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::ApiError;

/// `POST /checkout`: turns the caller's cart into an order and charges it.
///
/// Responds `201 Created` with the paid order, or `402 Payment Required`
/// with the order in `PaymentFailed` when the charge is declined.
#[tracing::instrument(skip(state))]
pub async fn checkout(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let order = state.mediator.send(ProcessPayment { user_id }).await?;

    let status = if order.status() == OrderStatus::PaymentFailed {
        StatusCode::PAYMENT_REQUIRED
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(order.into())))
}
