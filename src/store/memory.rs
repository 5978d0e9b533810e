use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::models::booking::BookingKind;
use crate::models::ticket::TicketType;
use crate::models::{
    Booking, BookingStatus, Country, Event, NewBooking, PaymentStatus, Ticket, TicketPricing,
};
use crate::store::{PaymentUpdate, Store};
use crate::utils::AppError;

#[derive(Default)]
struct Inner {
    events: HashMap<Uuid, Event>,
    countries: HashMap<Uuid, Country>,
    tickets: HashMap<Uuid, Ticket>,
    pricing: HashMap<(Uuid, Uuid), TicketPricing>,
    bookings: HashMap<Uuid, Booking>,
}

/// In-memory store used by the test suites and local experiments. A single
/// mutex stands in for the database transaction: everything
/// `commit_reservation` checks and applies happens under one lock hold, so
/// the engine sees the same all-or-nothing semantics as with Postgres.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("memory store mutex poisoned")
    }

    pub fn insert_event(&self, event: Event) {
        self.lock().events.insert(event.id, event);
    }

    pub fn insert_country(&self, country: Country) {
        self.lock().countries.insert(country.id, country);
    }

    pub fn insert_ticket(&self, ticket: Ticket) {
        self.lock().tickets.insert(ticket.id, ticket);
    }

    pub fn insert_pricing(&self, pricing: TicketPricing) {
        self.lock()
            .pricing
            .insert((pricing.ticket_id, pricing.country_id), pricing);
    }

    /// Current ledger state, for asserting on decrements and restoration.
    pub fn ticket_snapshot(&self, id: Uuid) -> Option<Ticket> {
        self.lock().tickets.get(&id).cloned()
    }
}

impl Store for MemoryStore {
    async fn event(&self, id: Uuid) -> Result<Option<Event>, AppError> {
        Ok(self.lock().events.get(&id).cloned())
    }

    async fn ticket(&self, id: Uuid) -> Result<Option<Ticket>, AppError> {
        Ok(self.lock().tickets.get(&id).cloned())
    }

    async fn country(&self, id: Uuid) -> Result<Option<Country>, AppError> {
        Ok(self.lock().countries.get(&id).cloned())
    }

    async fn pricing(
        &self,
        ticket_id: Uuid,
        country_id: Uuid,
    ) -> Result<Option<TicketPricing>, AppError> {
        Ok(self.lock().pricing.get(&(ticket_id, country_id)).cloned())
    }

    async fn reference_exists(&self, reference: &str) -> Result<bool, AppError> {
        Ok(self
            .lock()
            .bookings
            .values()
            .any(|b| b.booking_reference == reference))
    }

    async fn commit_reservation(&self, new: NewBooking) -> Result<Booking, AppError> {
        let mut inner = self.lock();

        // The unique-index backstop: a reference insert race is retryable.
        if inner
            .bookings
            .values()
            .any(|b| b.booking_reference == new.booking_reference)
        {
            return Err(AppError::TransientContention);
        }

        if let BookingKind::Ticket(ticket_id) = new.kind {
            let ticket = inner
                .tickets
                .get_mut(&ticket_id)
                .ok_or_else(|| AppError::NotFound(format!("Ticket {ticket_id}")))?;

            // Check every line before touching the ledger so a failing
            // child line leaves the adult line undecremented.
            let mut remaining = ticket.available_quantity;
            let lines = [
                (TicketType::Adult, new.adult_tickets),
                (TicketType::Child, new.child_tickets),
            ];
            for (ticket_type, requested) in lines {
                if requested == 0 {
                    continue;
                }
                if remaining < requested {
                    return Err(AppError::InsufficientInventory {
                        ticket_type,
                        requested,
                        available: remaining,
                    });
                }
                remaining -= requested;
            }
            ticket.available_quantity = remaining;
            ticket.updated_at = Utc::now();
        }

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            booking_reference: new.booking_reference,
            event_id: new.event_id,
            ticket_id: new.kind.ticket_id(),
            country_id: new.country_id,
            customer_name: new.customer.name,
            customer_email: new.customer.email,
            customer_phone: new.customer.phone,
            adult_tickets: new.adult_tickets,
            child_tickets: new.child_tickets,
            adult_price: new.adult_price,
            child_price: new.child_price,
            total_amount: new.total_amount,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_method: None,
            payment_reference: None,
            payment_date: None,
            created_at: now,
            updated_at: now,
        };
        inner.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn booking(&self, id: Uuid) -> Result<Option<Booking>, AppError> {
        Ok(self.lock().bookings.get(&id).cloned())
    }

    async fn booking_by_reference(&self, reference: &str) -> Result<Option<Booking>, AppError> {
        Ok(self
            .lock()
            .bookings
            .values()
            .find(|b| b.booking_reference == reference)
            .cloned())
    }

    async fn set_status(
        &self,
        id: Uuid,
        expected: BookingStatus,
        next: BookingStatus,
    ) -> Result<Option<Booking>, AppError> {
        let mut inner = self.lock();
        let Some(booking) = inner.bookings.get_mut(&id) else {
            return Ok(None);
        };
        if booking.status != expected {
            return Ok(None);
        }
        booking.status = next;
        booking.updated_at = Utc::now();
        Ok(Some(booking.clone()))
    }

    async fn set_payment(
        &self,
        id: Uuid,
        expected: PaymentStatus,
        update: PaymentUpdate,
    ) -> Result<Option<Booking>, AppError> {
        let mut inner = self.lock();
        let Some(booking) = inner.bookings.get_mut(&id) else {
            return Ok(None);
        };
        if booking.payment_status != expected {
            return Ok(None);
        }
        booking.payment_status = update.status;
        if update.method.is_some() {
            booking.payment_method = update.method;
        }
        if update.reference.is_some() {
            booking.payment_reference = update.reference;
        }
        if update.paid_at.is_some() {
            booking.payment_date = update.paid_at;
        }
        booking.updated_at = Utc::now();
        Ok(Some(booking.clone()))
    }

    async fn credit_inventory(&self, ticket_id: Uuid, quantity: i32) -> Result<(), AppError> {
        let mut inner = self.lock();
        let ticket = inner
            .tickets
            .get_mut(&ticket_id)
            .ok_or_else(|| AppError::NotFound(format!("Ticket {ticket_id}")))?;
        if ticket.available_quantity + quantity > ticket.total_quantity {
            return Err(AppError::InternalServerError(format!(
                "crediting {quantity} to ticket {ticket_id} (available {}) would exceed total_quantity",
                ticket.available_quantity
            )));
        }
        ticket.available_quantity += quantity;
        ticket.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_booking(&self, id: Uuid) -> Result<(), AppError> {
        if self.lock().bookings.remove(&id).is_none() {
            return Err(AppError::NotFound(format!("Booking {id}")));
        }
        Ok(())
    }
}
