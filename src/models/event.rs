use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A bookable event. Created and edited by administrative tooling; the
/// reservation engine only ever reads it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub event_date: DateTime<Utc>,
    pub booking_start_date: Option<DateTime<Utc>>,
    pub booking_end_date: Option<DateTime<Utc>>,
    /// Flat per-person prices for direct event bookings (bookings that
    /// reference the event without going through a ticket line).
    pub adult_price: Option<Decimal>,
    pub child_price: Option<Decimal>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Whether the event currently accepts bookings: it must be active,
    /// not yet started, and inside its booking window when one is set.
    pub fn is_booking_open(&self, now: DateTime<Utc>) -> bool {
        if !self.is_active || now >= self.event_date {
            return false;
        }
        if let Some(start) = self.booking_start_date {
            if now < start {
                return false;
            }
        }
        if let Some(end) = self.booking_end_date {
            if now > end {
                return false;
            }
        }
        true
    }
}
