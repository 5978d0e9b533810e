use axum::middleware;
use axum::routing::{delete, get, patch, post};
use axum::Router;

use crate::config::{create_cors_layer, security_headers};
use crate::engine::SharedEngine;
use crate::handlers::{bookings, health_check};

pub fn create_routes(engine: SharedEngine) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/bookings", post(bookings::create_booking))
        .route(
            "/bookings/reference/:reference",
            get(bookings::get_booking_by_reference),
        )
        .route("/bookings/:id/status", patch(bookings::update_booking_status))
        .route("/bookings/:id/payment", patch(bookings::update_booking_payment))
        .route("/bookings/:id/cancel", post(bookings::cancel_booking))
        .route("/bookings/:id", delete(bookings::delete_booking))
        .layer(middleware::from_fn(security_headers))
        .layer(create_cors_layer())
        .with_state(engine)
}
