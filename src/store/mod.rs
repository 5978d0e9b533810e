use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{
    Booking, BookingStatus, Country, Event, NewBooking, PaymentStatus, Ticket, TicketPricing,
};
use crate::utils::AppError;

pub mod memory;
pub mod pg;

pub use memory::MemoryStore;
pub use pg::PgStore;

/// A payment-state change, applied only if the row still holds the expected
/// prior payment status.
#[derive(Debug, Clone)]
pub struct PaymentUpdate {
    pub status: PaymentStatus,
    pub method: Option<String>,
    pub reference: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
}

/// Persistence seam for the booking engine.
///
/// The trait captures the atomic operations the engine's invariants rest on:
/// `commit_reservation` decrements every inventory line and inserts the
/// booking as one unit (or does nothing), `set_status`/`set_payment` are
/// compare-and-swap updates that return `None` when the row has moved on,
/// and `credit_inventory` refuses to push a ledger past its total.
#[allow(async_fn_in_trait)]
pub trait Store: Send + Sync {
    async fn event(&self, id: Uuid) -> Result<Option<Event>, AppError>;
    async fn ticket(&self, id: Uuid) -> Result<Option<Ticket>, AppError>;
    async fn country(&self, id: Uuid) -> Result<Option<Country>, AppError>;
    async fn pricing(
        &self,
        ticket_id: Uuid,
        country_id: Uuid,
    ) -> Result<Option<TicketPricing>, AppError>;

    async fn reference_exists(&self, reference: &str) -> Result<bool, AppError>;

    /// Atomically checks and decrements every requested inventory line and
    /// persists the booking. On `InsufficientInventory` no decrement
    /// survives, including lines that individually had stock.
    async fn commit_reservation(&self, new: NewBooking) -> Result<Booking, AppError>;

    async fn booking(&self, id: Uuid) -> Result<Option<Booking>, AppError>;
    async fn booking_by_reference(&self, reference: &str) -> Result<Option<Booking>, AppError>;

    /// Flips `status` to `next` iff the row still holds `expected`.
    /// `Ok(None)` means the precondition no longer held.
    async fn set_status(
        &self,
        id: Uuid,
        expected: BookingStatus,
        next: BookingStatus,
    ) -> Result<Option<Booking>, AppError>;

    /// Payment counterpart of [`Store::set_status`].
    async fn set_payment(
        &self,
        id: Uuid,
        expected: PaymentStatus,
        update: PaymentUpdate,
    ) -> Result<Option<Booking>, AppError>;

    /// Credits `quantity` back to the ticket ledger, failing rather than
    /// exceeding `total_quantity`.
    async fn credit_inventory(&self, ticket_id: Uuid, quantity: i32) -> Result<(), AppError>;

    async fn delete_booking(&self, id: Uuid) -> Result<(), AppError>;
}
