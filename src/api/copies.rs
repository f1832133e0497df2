//! Copy inventory endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::copy::{BookCopy, ProvisionCopiesRequest},
};

use super::AuthenticatedUser;

/// Get a single copy
#[utoipa::path(
    get,
    path = "/copies/{id}",
    tag = "copies",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    responses(
        (status = 200, description = "Copy details", body = BookCopy),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn get_copy(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BookCopy>> {
    let copy = state.services.catalog.get_copy(id).await?;
    Ok(Json(copy))
}

/// List all copies of a book
#[utoipa::path(
    get,
    path = "/books/{id}/copies",
    tag = "copies",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Copies of the book", body = Vec<BookCopy>),
        (status = 404, description = "Book not found")
    )
)]
pub async fn list_book_copies(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<BookCopy>>> {
    let copies = state.services.catalog.list_copies_by_book(id).await?;
    Ok(Json(copies))
}

/// Bulk-provision copies of a book (admin)
#[utoipa::path(
    post,
    path = "/books/{id}/copies",
    tag = "copies",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book ID")
    ),
    request_body = ProvisionCopiesRequest,
    responses(
        (status = 201, description = "Copies created", body = Vec<BookCopy>),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn provision_copies(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ProvisionCopiesRequest>,
) -> AppResult<(StatusCode, Json<Vec<BookCopy>>)> {
    claims.require_admin()?;

    let copies = state
        .services
        .catalog
        .provision_copies(id, request.count, request.condition, request.notes.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(copies)))
}

/// Delete a copy (admin). Refused while the copy is staged or attached to
/// an open reservation.
#[utoipa::path(
    delete,
    path = "/copies/{id}",
    tag = "copies",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    responses(
        (status = 204, description = "Copy deleted"),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Copy not found"),
        (status = 409, description = "Copy is referenced by a cart or open reservation")
    )
)]
pub async fn delete_copy(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;
    state.services.catalog.delete_copy(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
