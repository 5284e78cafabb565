//! User registration and customer data endpoints.

use std::sync::Arc;

use application::{AccessCustomerData, CustomerData, RegisterUser};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use domain::{Role, User};
use serde::{Deserialize, Serialize};

use super::orders::OrderResponse;
use super::parse_id;
use crate::AppState;
use crate::auth::{CurrentUser, OptionalUser};
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
    /// Defaults to `["Customer"]`.
    #[serde(default)]
    pub roles: Vec<String>,
}

// -- Response types --

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username,
            email: user.email,
            roles: user.roles.iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CustomerDataResponse {
    pub user: UserResponse,
    pub orders: Vec<OrderResponse>,
}

impl From<CustomerData> for CustomerDataResponse {
    fn from(data: CustomerData) -> Self {
        Self {
            user: data.user.into(),
            orders: data.orders.into_iter().map(Into::into).collect(),
        }
    }
}

// -- Handlers --

/// `POST /users`: open registration; granting staff roles takes an
/// administrator in `x-user-id`.
#[tracing::instrument(skip(state, req))]
pub async fn register(
    State(state): State<Arc<AppState>>,
    OptionalUser(actor): OptionalUser,
    Json(req): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let roles = req
        .roles
        .iter()
        .map(|role| role.parse::<Role>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ApiError::BadRequest(format!("Invalid role: {e}")))?;

    let user = state
        .mediator
        .send(RegisterUser {
            actor,
            username: req.username,
            email: req.email,
            roles,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// `GET /users/{id}`: profile and orders, for the customer or staff.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<CustomerDataResponse>, ApiError> {
    let customer_id = parse_id(&id, "user")?;
    let data = state
        .mediator
        .send(AccessCustomerData { actor, customer_id })
        .await?;
    Ok(Json(data.into()))
}
