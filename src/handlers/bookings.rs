use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::engine::{ReserveRequest, SharedEngine};
use crate::models::{BookingStatus, PaymentStatus};
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: BookingStatus,
}

#[derive(Deserialize)]
pub struct UpdatePaymentRequest {
    pub payment_status: PaymentStatus,
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
}

pub async fn create_booking(
    State(engine): State<SharedEngine>,
    Json(request): Json<ReserveRequest>,
) -> Result<Response, AppError> {
    let booking = engine.reserve(request).await?;
    Ok(created(booking, "Booking reserved").into_response())
}

pub async fn get_booking_by_reference(
    State(engine): State<SharedEngine>,
    Path(reference): Path<String>,
) -> Result<Response, AppError> {
    let booking = engine.lookup_by_reference(&reference).await?;
    Ok(success(booking, "Booking found").into_response())
}

pub async fn update_booking_status(
    State(engine): State<SharedEngine>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Response, AppError> {
    let booking = engine.update_status(id, request.status).await?;
    Ok(success(booking, "Booking status updated").into_response())
}

pub async fn update_booking_payment(
    State(engine): State<SharedEngine>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePaymentRequest>,
) -> Result<Response, AppError> {
    let booking = engine
        .update_payment(
            id,
            request.payment_status,
            request.payment_method,
            request.payment_reference,
        )
        .await?;
    Ok(success(booking, "Payment status updated").into_response())
}

pub async fn cancel_booking(
    State(engine): State<SharedEngine>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let booking = engine.cancel(id).await?;
    Ok(success(booking, "Booking cancelled").into_response())
}

pub async fn delete_booking(
    State(engine): State<SharedEngine>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    engine.delete(id).await?;
    Ok(empty_success("Booking deleted").into_response())
}
