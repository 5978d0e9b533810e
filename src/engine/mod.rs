use std::sync::Arc;

use crate::models::Booking;
use crate::store::{PgStore, Store};
use crate::utils::AppError;

mod coordinator;
mod reference;
mod restoration;
mod state;

pub use coordinator::ReserveRequest;
pub use reference::REFERENCE_PREFIX;

/// The reservation and booking-state engine. Generic over the store so the
/// same invariants run against Postgres in production and the in-memory
/// store in tests.
pub struct BookingEngine<S: Store> {
    store: S,
}

/// The engine as handlers share it.
pub type SharedEngine = Arc<BookingEngine<PgStore>>;

impl<S: Store> BookingEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn lookup_by_reference(&self, reference: &str) -> Result<Booking, AppError> {
        self.store
            .booking_by_reference(reference)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking with reference '{reference}'")))
    }
}
