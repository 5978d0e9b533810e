use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// A sellable ticket line carrying the inventory ledger. `available_quantity`
/// must stay within `0..=total_quantity`; the store enforces this with
/// conditional updates and the schema backstops it with a CHECK constraint.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub id: Uuid,
    /// A ticket may be bound to one event or sold independently.
    pub event_id: Option<Uuid>,
    pub name: String,
    pub total_quantity: i32,
    pub available_quantity: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-country pricing for a ticket. At most one row exists per
/// (ticket, country) pair; it is the authoritative price source.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TicketPricing {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub country_id: Uuid,
    pub adult_price: Decimal,
    pub child_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The two ticket-type lines a reservation may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketType {
    Adult,
    Child,
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketType::Adult => write!(f, "adult"),
            TicketType::Child => write!(f, "child"),
        }
    }
}
