//! Order endpoints.

use std::sync::Arc;

use application::{GetOrder, ListOrders, UpdateOrderStatus};
use axum::Json;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use domain::{Order, OrderStatus};
use serde::{Deserialize, Serialize};

use super::parse_id;
use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

// -- Response types --

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderResponse {
    pub id: String,
    pub user_id: String,
    pub status: String,
    pub items: Vec<OrderItemResponse>,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderItemResponse {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id().to_string(),
            user_id: order.user_id().to_string(),
            status: order.status().to_string(),
            items: order
                .items()
                .iter()
                .map(|item| OrderItemResponse {
                    product_id: item.product_id.to_string(),
                    product_name: item.product_name.clone(),
                    quantity: item.quantity,
                    unit_price_cents: item.unit_price.cents(),
                })
                .collect(),
            subtotal_cents: order.subtotal().cents(),
            tax_cents: order.tax().cents(),
            total_cents: order.total_amount().cents(),
            payment_id: order.payment_id().map(str::to_string),
            created_at: order.created_at(),
        }
    }
}

// -- Handlers --

/// `GET /orders`: the caller's orders, newest first.
pub async fn list(
    State(state): State<Arc<AppState>>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let orders = state.mediator.send(ListOrders { actor }).await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// `GET /orders/{id}`
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_id(&id, "order")?;
    let order = state.mediator.send(GetOrder { actor, order_id }).await?;
    Ok(Json(order.into()))
}

/// `PUT /orders/{id}/status`: staff move an order through its lifecycle.
#[tracing::instrument(skip(state, req))]
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_id(&id, "order")?;
    let status: OrderStatus = req
        .status
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid status: {e}")))?;

    let order = state
        .mediator
        .send(UpdateOrderStatus {
            actor,
            order_id,
            status,
        })
        .await?;
    Ok(Json(order.into()))
}
