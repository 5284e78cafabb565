//! Catalog endpoints.

use std::sync::Arc;

use application::{CreateProduct, GetProduct, ListProducts, UpdateStock};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use domain::{Money, Product};
use serde::{Deserialize, Serialize};

use super::parse_id;
use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub price_cents: i64,
    pub stock: i64,
}

#[derive(Deserialize)]
pub struct UpdateStockRequest {
    pub stock: i64,
}

// -- Response types --

#[derive(Debug, Serialize, Deserialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub stock: i64,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id().to_string(),
            name: product.name().to_string(),
            price_cents: product.price().cents(),
            stock: product.stock(),
        }
    }
}

// -- Handlers --

/// `GET /products`
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state.mediator.send(ListProducts).await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// `GET /products/{id}`
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product_id = parse_id(&id, "product")?;
    let product = state.mediator.send(GetProduct { product_id }).await?;
    Ok(Json(product.into()))
}

/// `POST /products`: administrators add a product to the catalog.
#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    CurrentUser(actor): CurrentUser,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let product = state
        .mediator
        .send(CreateProduct {
            actor,
            name: req.name,
            price: Money::from_cents(req.price_cents),
            stock: req.stock,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

/// `PUT /products/{id}/stock`: administrators set the stock level.
#[tracing::instrument(skip(state, req))]
pub async fn update_stock(
    State(state): State<Arc<AppState>>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateStockRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product_id = parse_id(&id, "product")?;
    let product = state
        .mediator
        .send(UpdateStock {
            actor,
            product_id,
            stock: req.stock,
        })
        .await?;
    Ok(Json(product.into()))
}
