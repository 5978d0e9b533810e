use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Lifecycle of the reservation itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    /// Legal edges: pending -> confirmed, pending -> cancelled,
    /// confirmed -> cancelled. `cancelled` is terminal.
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Cancelled)
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::Confirmed => write!(f, "confirmed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Payment lifecycle. Independent of `BookingStatus`; neither axis drives
/// the other, except that cancellation triggers inventory restoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    /// Legal edges: pending -> paid, pending -> failed, paid -> refunded.
    pub fn can_transition_to(self, next: PaymentStatus) -> bool {
        use PaymentStatus::*;
        matches!((self, next), (Pending, Paid) | (Pending, Failed) | (Paid, Refunded))
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Paid => write!(f, "paid"),
            PaymentStatus::Failed => write!(f, "failed"),
            PaymentStatus::Refunded => write!(f, "refunded"),
        }
    }
}

/// What a booking draws on. Decided once at reservation time and stored
/// structurally as the `ticket_id` / `event_id` columns; never inferred
/// from free-text fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum BookingKind {
    /// Inventory comes from the referenced ticket's ledger.
    Ticket(Uuid),
    /// References an event directly; no shared inventory pool is touched.
    DirectEvent(Uuid),
}

impl BookingKind {
    pub fn ticket_id(&self) -> Option<Uuid> {
        match self {
            BookingKind::Ticket(id) => Some(*id),
            BookingKind::DirectEvent(_) => None,
        }
    }
}

/// The customer identity attached to a booking request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// A committed reservation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub booking_reference: String,
    pub event_id: Option<Uuid>,
    pub ticket_id: Option<Uuid>,
    pub country_id: Uuid,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub adult_tickets: i32,
    pub child_tickets: i32,
    /// Unit prices resolved at reservation time; later pricing edits never
    /// change what a committed booking owes or what restoration credits.
    pub adult_price: Decimal,
    pub child_price: Decimal,
    pub total_amount: Decimal,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
    pub payment_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Re-derives the kind from the structural columns. `ticket_id` wins:
    /// a ticket booking may also carry the event its ticket belongs to.
    pub fn kind(&self) -> BookingKind {
        match (self.ticket_id, self.event_id) {
            (Some(ticket_id), _) => BookingKind::Ticket(ticket_id),
            (None, Some(event_id)) => BookingKind::DirectEvent(event_id),
            (None, None) => unreachable!("booking persisted without ticket or event"),
        }
    }

    /// Total seats reserved, the legacy single-quantity view.
    pub fn quantity(&self) -> i32 {
        self.adult_tickets + self.child_tickets
    }
}

/// Everything the store needs to persist a reservation atomically with its
/// inventory decrements. Built only by the reservation coordinator.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub booking_reference: String,
    pub kind: BookingKind,
    /// For ticket bookings bound to an event, the owning event id.
    pub event_id: Option<Uuid>,
    pub country_id: Uuid,
    pub customer: CustomerInfo,
    pub adult_tickets: i32,
    pub child_tickets: i32,
    pub adult_price: Decimal,
    pub child_price: Decimal,
    pub total_amount: Decimal,
}

impl NewBooking {
    pub fn ticket_id(&self) -> Option<Uuid> {
        self.kind.ticket_id()
    }
}
