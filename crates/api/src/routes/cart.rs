//! Shopping cart endpoints. Every route acts on the caller's own cart.

use std::sync::Arc;

use application::{AddItemToCart, CalculateCartTotal, GetCart, RemoveItemFromCart};
use axum::Json;
use axum::extract::{Path, Query, State};
use domain::{CartTotal, DomainError, ShoppingCart};
use serde::{Deserialize, Serialize};

use super::parse_id;
use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct RemoveItemParams {
    /// Units to remove; the whole line when absent.
    pub quantity: Option<u32>,
}

// -- Response types --

#[derive(Debug, Serialize, Deserialize)]
pub struct CartResponse {
    pub id: String,
    pub user_id: String,
    pub items: Vec<CartItemResponse>,
    pub subtotal_cents: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CartItemResponse {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

impl TryFrom<ShoppingCart> for CartResponse {
    type Error = ApiError;

    fn try_from(cart: ShoppingCart) -> Result<Self, Self::Error> {
        let items = cart
            .items()
            .iter()
            .map(|item| {
                Ok(CartItemResponse {
                    product_id: item.product_id.to_string(),
                    product_name: item.product_name.clone(),
                    quantity: item.quantity,
                    unit_price_cents: item.unit_price.cents(),
                    line_total_cents: item.line_total()?.cents(),
                })
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        Ok(Self {
            id: cart.id().to_string(),
            user_id: cart.user_id().to_string(),
            subtotal_cents: cart.subtotal()?.cents(),
            items,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CartTotalResponse {
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
}

impl From<CartTotal> for CartTotalResponse {
    fn from(total: CartTotal) -> Self {
        Self {
            subtotal_cents: total.subtotal.cents(),
            tax_cents: total.tax.cents(),
            total_cents: total.total.cents(),
        }
    }
}

// -- Handlers --

/// `GET /cart`
pub async fn get(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = state.mediator.send(GetCart { user_id }).await?;
    Ok(Json(cart.try_into()?))
}

/// `POST /cart/items`
#[tracing::instrument(skip(state, req))]
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let product_id = parse_id(&req.product_id, "product")?;
    let cart = state
        .mediator
        .send(AddItemToCart {
            user_id,
            product_id,
            quantity: req.quantity,
        })
        .await?;
    Ok(Json(cart.try_into()?))
}

/// `DELETE /cart/items/{product_id}?quantity=N`
#[tracing::instrument(skip(state, params))]
pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Path(product_id): Path<String>,
    Query(params): Query<RemoveItemParams>,
) -> Result<Json<CartResponse>, ApiError> {
    let product_id = parse_id(&product_id, "product")?;
    let cart = state
        .mediator
        .send(RemoveItemFromCart {
            user_id,
            product_id,
            // Removing more than the line holds drops the line
            quantity: params.quantity.unwrap_or(u32::MAX),
        })
        .await?;
    Ok(Json(cart.try_into()?))
}

/// `GET /cart/total`: subtotal, tax and total in cents.
pub async fn total(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<CartTotalResponse>, ApiError> {
    let total = state.mediator.send(CalculateCartTotal { user_id }).await?;
    Ok(Json(total.into()))
}
