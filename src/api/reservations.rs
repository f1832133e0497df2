//! Reservation lifecycle endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::reservation::{
        CreateReservationRequest, ReservationDetails, ReservationFilters,
        UpdateReservationStatusRequest,
    },
};

use super::AuthenticatedUser;

/// Paginated reservation listing
#[derive(Serialize, ToSchema)]
pub struct ReservationListResponse {
    pub reservations: Vec<ReservationDetails>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

/// Pagination query for per-user listings
#[derive(Deserialize, ToSchema)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Checkout: create a reservation from the caller's cart
#[utoipa::path(
    post,
    path = "/reservations",
    tag = "reservations",
    security(("bearer_auth" = [])),
    request_body = CreateReservationRequest,
    responses(
        (status = 201, description = "Reservation created", body = ReservationDetails),
        (status = 400, description = "Invalid dates or timeslots"),
        (status = 409, description = "A staged copy is no longer available"),
        (status = 422, description = "Cart empty or active-item limit exceeded")
    )
)]
pub async fn create_reservation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateReservationRequest>,
) -> AppResult<(StatusCode, Json<ReservationDetails>)> {
    let user_id = claims.user_id()?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let reservation = state
        .services
        .reservations
        .create_reservation(user_id, &request)
        .await?;

    Ok((StatusCode::CREATED, Json(reservation)))
}

/// List all reservations with filters (admin)
#[utoipa::path(
    get,
    path = "/reservations",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(
        ("email" = Option<String>, Query, description = "Filter by user email substring"),
        ("status" = Option<String>, Query, description = "Filter by reservation status"),
        ("book_title" = Option<String>, Query, description = "Filter by book title substring"),
        ("page" = Option<i64>, Query, description = "Page number (default: 1)"),
        ("per_page" = Option<i64>, Query, description = "Results per page (default: 10)")
    ),
    responses(
        (status = 200, description = "Reservations", body = ReservationListResponse),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn list_reservations(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(filters): Query<ReservationFilters>,
) -> AppResult<Json<ReservationListResponse>> {
    claims.require_admin()?;

    let page = filters.page.unwrap_or(1);
    let per_page = filters.per_page.unwrap_or(10);
    let (reservations, total) = state.services.reservations.list_reservations(&filters).await?;

    Ok(Json(ReservationListResponse {
        reservations,
        total,
        page,
        per_page,
    }))
}

/// Get one reservation (owner or admin)
#[utoipa::path(
    get,
    path = "/reservations/{id}",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Reservation ID")
    ),
    responses(
        (status = 200, description = "Reservation details", body = ReservationDetails),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn get_reservation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ReservationDetails>> {
    let reservation = state.services.reservations.get_reservation(id).await?;

    if reservation.user.id != claims.user_id()? {
        claims.require_admin()?;
    }

    Ok(Json(reservation))
}

/// Update a reservation's status (admin)
#[utoipa::path(
    put,
    path = "/reservations/{id}/status",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Reservation ID")
    ),
    request_body = UpdateReservationStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ReservationDetails),
        (status = 400, description = "Missing approval times"),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Reservation not found"),
        (status = 422, description = "Illegal status transition")
    )
)]
pub async fn update_reservation_status(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateReservationStatusRequest>,
) -> AppResult<Json<ReservationDetails>> {
    claims.require_admin()?;

    let reservation = state
        .services
        .reservations
        .update_status(id, &request)
        .await?;

    Ok(Json(reservation))
}

/// List a user's reservations (self or admin)
#[utoipa::path(
    get,
    path = "/users/{id}/reservations",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID"),
        ("page" = Option<i64>, Query, description = "Page number (default: 1)"),
        ("per_page" = Option<i64>, Query, description = "Results per page (default: 10)")
    ),
    responses(
        (status = 200, description = "User's reservations", body = ReservationListResponse),
        (status = 403, description = "Not the user or an administrator"),
        (status = 404, description = "User not found")
    )
)]
pub async fn list_user_reservations(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ReservationListResponse>> {
    if user_id != claims.user_id()? {
        claims.require_admin()?;
    }

    let page = query.page.unwrap_or(1);
    let per_page = query.per_page.unwrap_or(10);
    let (reservations, total) = state
        .services
        .reservations
        .list_user_reservations(user_id, page, per_page)
        .await?;

    Ok(Json(ReservationListResponse {
        reservations,
        total,
        page,
        per_page,
    }))
}
