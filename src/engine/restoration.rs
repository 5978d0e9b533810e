use crate::engine::BookingEngine;
use crate::models::booking::BookingKind;
use crate::models::Booking;
use crate::store::Store;

impl<S: Store> BookingEngine<S> {
    /// Credits back exactly what the booking reserved. Called only after a
    /// won status flip to `cancelled`, which is what makes restoration
    /// exactly-once: a booking already cancelled never reaches this point.
    ///
    /// A failed credit is logged and swallowed — the cancellation must stay
    /// visible — but it signals a broken ledger invariant, hence the error
    /// level.
    pub(crate) async fn restore(&self, booking: &Booking) {
        let ticket_id = match booking.kind() {
            BookingKind::Ticket(id) => id,
            // Direct event bookings hold no ledger-backed inventory.
            BookingKind::DirectEvent(_) => return,
        };

        let quantity = booking.quantity();
        match self.store.credit_inventory(ticket_id, quantity).await {
            Ok(()) => {
                tracing::info!(
                    reference = %booking.booking_reference,
                    ticket = %ticket_id,
                    quantity,
                    "Inventory restored for cancelled booking"
                );
            }
            Err(err) => {
                tracing::error!(
                    reference = %booking.booking_reference,
                    ticket = %ticket_id,
                    quantity,
                    error = %err,
                    "Failed to restore inventory for cancelled booking"
                );
            }
        }
    }
}
