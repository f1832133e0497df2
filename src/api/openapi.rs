//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{cart, copies, health, reservations};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lectern API",
        version = "0.3.0",
        description = "Small Library Reservation Server REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Copies
        copies::get_copy,
        copies::list_book_copies,
        copies::provision_copies,
        copies::delete_copy,
        // Cart
        cart::get_cart,
        cart::add_cart_entry,
        cart::remove_cart_entry,
        cart::clear_cart,
        // Reservations
        reservations::create_reservation,
        reservations::list_reservations,
        reservations::get_reservation,
        reservations::update_reservation_status,
        reservations::list_user_reservations,
    ),
    components(
        schemas(
            // Copies
            crate::models::copy::BookCopy,
            crate::models::copy::CopyStatus,
            crate::models::copy::CopyCondition,
            crate::models::copy::CopyDetails,
            crate::models::copy::ProvisionCopiesRequest,
            crate::models::book::BookSummary,
            // Cart
            crate::models::cart::AddCartEntryRequest,
            crate::models::cart::CartEntryDetails,
            cart::CartResponse,
            // Reservations
            crate::models::reservation::ReservationStatus,
            crate::models::reservation::ReservationDetails,
            crate::models::reservation::CreateReservationRequest,
            crate::models::reservation::UpdateReservationStatusRequest,
            reservations::ReservationListResponse,
            // Users
            crate::models::user::UserSummary,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "copies", description = "Physical copy inventory"),
        (name = "cart", description = "Per-user reservation staging"),
        (name = "reservations", description = "Reservation lifecycle")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
