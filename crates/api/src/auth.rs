//! Identification of the acting user.
//!
//! Requests name their user in the `x-user-id` header. The handlers pass the
//! id on to the mediator, which rejects ids that belong to no one.

use axum::{extract::FromRequestParts, http::request::Parts};
use domain::UserId;

use crate::error::ApiError;

/// Header carrying the acting user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Extractor that requires an `x-user-id` header.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentUser(user_id): CurrentUser) -> impl IntoResponse {
///     format!("Hello, {user_id}!")
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub UserId);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match user_id_from_parts(parts)? {
            Some(user_id) => Ok(Self(user_id)),
            None => Err(ApiError::Unauthenticated(format!(
                "missing {USER_ID_HEADER} header"
            ))),
        }
    }
}

/// Extractor that optionally gets the acting user.
///
/// A malformed header is still rejected.
#[derive(Debug, Clone, Copy)]
pub struct OptionalUser(pub Option<UserId>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(user_id_from_parts(parts)?))
    }
}

fn user_id_from_parts(parts: &Parts) -> Result<Option<UserId>, ApiError> {
    let Some(value) = parts.headers.get(USER_ID_HEADER) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .map(Some)
        .ok_or_else(|| ApiError::Unauthenticated(format!("invalid {USER_ID_HEADER} header")))
}
