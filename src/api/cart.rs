//! Cart endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::cart::{AddCartEntryRequest, CartEntryDetails},
};

use super::AuthenticatedUser;

/// Cart contents response
#[derive(Serialize, ToSchema)]
pub struct CartResponse {
    pub entries: Vec<CartEntryDetails>,
}

/// List the caller's cart
#[utoipa::path(
    get,
    path = "/cart",
    tag = "cart",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Cart contents", body = CartResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_cart(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<CartResponse>> {
    let user_id = claims.user_id()?;
    let entries = state.services.cart.list(user_id).await?;
    Ok(Json(CartResponse { entries }))
}

/// Stage a copy in the caller's cart
#[utoipa::path(
    post,
    path = "/cart/items",
    tag = "cart",
    security(("bearer_auth" = [])),
    request_body = AddCartEntryRequest,
    responses(
        (status = 201, description = "Copy staged", body = CartEntryDetails),
        (status = 404, description = "Copy not found"),
        (status = 409, description = "Copy not available or already staged"),
        (status = 422, description = "Cart is full")
    )
)]
pub async fn add_cart_entry(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<AddCartEntryRequest>,
) -> AppResult<(StatusCode, Json<CartEntryDetails>)> {
    let user_id = claims.user_id()?;
    let entry = state.services.cart.add(user_id, request.copy_id).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Remove a staged copy from the caller's cart
#[utoipa::path(
    delete,
    path = "/cart/items/{copy_id}",
    tag = "cart",
    security(("bearer_auth" = [])),
    params(
        ("copy_id" = Uuid, Path, description = "Copy ID")
    ),
    responses(
        (status = 204, description = "Copy removed"),
        (status = 404, description = "Copy not in cart")
    )
)]
pub async fn remove_cart_entry(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(copy_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let user_id = claims.user_id()?;
    state.services.cart.remove(user_id, copy_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Clear the caller's cart. Idempotent.
#[utoipa::path(
    delete,
    path = "/cart",
    tag = "cart",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Cart cleared")
    )
)]
pub async fn clear_cart(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<StatusCode> {
    let user_id = claims.user_id()?;
    state.services.cart.clear(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
