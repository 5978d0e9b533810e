use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use crate::models::ticket::TicketType;
use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Booking closed: {0}")]
    BookingClosed(String),

    #[error("No {ticket_type} price configured for country {country_id}")]
    PricingUnavailable {
        country_id: Uuid,
        ticket_type: TicketType,
    },

    #[error("Insufficient inventory on the {ticket_type} line: requested {requested}, available {available}")]
    InsufficientInventory {
        ticket_type: TicketType,
        requested: i32,
        available: i32,
    },

    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("No unique booking reference found after {0} attempts")]
    ReferenceExhausted(u32),

    #[error("Inventory row contended; the request may be retried")]
    TransientContention,

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BookingClosed(_) => StatusCode::CONFLICT,
            AppError::PricingUnavailable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InsufficientInventory { .. } => StatusCode::CONFLICT,
            AppError::InvalidTransition { .. } => StatusCode::CONFLICT,
            AppError::ReferenceExhausted(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::TransientContention => StatusCode::SERVICE_UNAVAILABLE,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::BookingClosed(_) => "BOOKING_CLOSED",
            AppError::PricingUnavailable { .. } => "PRICING_UNAVAILABLE",
            AppError::InsufficientInventory { .. } => "INSUFFICIENT_INVENTORY",
            AppError::InvalidTransition { .. } => "INVALID_TRANSITION",
            AppError::ReferenceExhausted(_) => "REFERENCE_EXHAUSTED",
            AppError::TransientContention => "TRANSIENT_CONTENTION",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    fn log(&self) {
        match self {
            AppError::DatabaseError(e) => {
                error!(error = ?e, "Database error");
            }
            other => {
                error!(code = other.code(), message = %other, "Request failed");
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        // Log internal details
        self.log();

        // Only expose high-level messages to the client
        let public_message = match &self {
            AppError::DatabaseError(_) => "A database error occurred".to_string(),
            AppError::InternalServerError(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        error_response(code, public_message, None, status)
    }
}
