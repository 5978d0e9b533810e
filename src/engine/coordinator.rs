use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::engine::{reference, BookingEngine};
use crate::models::booking::BookingKind;
use crate::models::ticket::TicketType;
use crate::models::{CustomerInfo, Booking, NewBooking};
use crate::store::Store;
use crate::utils::AppError;

/// A booking request as submitted by the booking form or admin tooling.
/// Exactly one kind is derivable: `ticket_id` present makes it a ticket
/// booking; otherwise `event_id` must be present and it books the event
/// directly, bypassing any ticket ledger.
#[derive(Debug, Clone, Deserialize)]
pub struct ReserveRequest {
    pub event_id: Option<Uuid>,
    pub ticket_id: Option<Uuid>,
    pub country_id: Uuid,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub adult_tickets: i32,
    #[serde(default)]
    pub child_tickets: i32,
}

impl<S: Store> BookingEngine<S> {
    /// Reserves inventory and persists the booking, or changes nothing.
    ///
    /// Availability checks, line decrements and the booking insert all
    /// happen inside one atomic store commit; pricing comes from the
    /// per-country association (ticket bookings) or the event's flat
    /// prices (direct event bookings), resolved before anything is touched.
    pub async fn reserve(&self, request: ReserveRequest) -> Result<Booking, AppError> {
        validate(&request)?;

        let country = self
            .store
            .country(request.country_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Country {}", request.country_id)))?;

        let now = Utc::now();
        let (kind, event_id, adult_price, child_price) = match request.ticket_id {
            Some(ticket_id) => {
                let ticket = self
                    .store
                    .ticket(ticket_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Ticket {ticket_id}")))?;
                if !ticket.is_active {
                    return Err(AppError::BookingClosed(format!(
                        "ticket '{}' is not on sale",
                        ticket.name
                    )));
                }
                if let (Some(requested), Some(owning)) = (request.event_id, ticket.event_id) {
                    if requested != owning {
                        return Err(AppError::ValidationError(
                            "Ticket does not belong to the requested event".to_string(),
                        ));
                    }
                }
                if let Some(owning) = ticket.event_id {
                    let event = self
                        .store
                        .event(owning)
                        .await?
                        .ok_or_else(|| AppError::NotFound(format!("Event {owning}")))?;
                    if !event.is_booking_open(now) {
                        return Err(AppError::BookingClosed(format!(
                            "event '{}' is not open for booking",
                            event.title
                        )));
                    }
                }

                let pricing = self.store.pricing(ticket_id, country.id).await?;
                let (adult_price, child_price) = resolve_prices(
                    country.id,
                    (request.adult_tickets, pricing.as_ref().map(|p| p.adult_price)),
                    (request.child_tickets, pricing.as_ref().map(|p| p.child_price)),
                )?;
                (BookingKind::Ticket(ticket_id), ticket.event_id, adult_price, child_price)
            }
            None => {
                // validate() guarantees an event id is present here.
                let event_id = request.event_id.ok_or_else(|| {
                    AppError::ValidationError(
                        "Either ticket_id or event_id must be provided".to_string(),
                    )
                })?;
                let event = self
                    .store
                    .event(event_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Event {event_id}")))?;
                if !event.is_booking_open(now) {
                    return Err(AppError::BookingClosed(format!(
                        "event '{}' is not open for booking",
                        event.title
                    )));
                }
                let (adult_price, child_price) = resolve_prices(
                    country.id,
                    (request.adult_tickets, event.adult_price),
                    (request.child_tickets, event.child_price),
                )?;
                (BookingKind::DirectEvent(event_id), Some(event_id), adult_price, child_price)
            }
        };

        let total_amount = adult_price * Decimal::from(request.adult_tickets)
            + child_price * Decimal::from(request.child_tickets);

        let booking_reference = reference::mint(&self.store).await?;

        let booking = self
            .store
            .commit_reservation(NewBooking {
                booking_reference,
                kind,
                event_id,
                country_id: country.id,
                customer: CustomerInfo {
                    name: request.customer_name,
                    email: request.customer_email,
                    phone: request.customer_phone,
                },
                adult_tickets: request.adult_tickets,
                child_tickets: request.child_tickets,
                adult_price,
                child_price,
                total_amount,
            })
            .await?;

        tracing::info!(
            reference = %booking.booking_reference,
            adult = booking.adult_tickets,
            child = booking.child_tickets,
            total = %booking.total_amount,
            "Reservation committed"
        );
        Ok(booking)
    }
}

fn validate(request: &ReserveRequest) -> Result<(), AppError> {
    if request.ticket_id.is_none() && request.event_id.is_none() {
        return Err(AppError::ValidationError(
            "Either ticket_id or event_id must be provided".to_string(),
        ));
    }
    if request.adult_tickets < 0 || request.child_tickets < 0 {
        return Err(AppError::ValidationError(
            "Ticket quantities cannot be negative".to_string(),
        ));
    }
    // Summed in i64: the two i32 lines together can exceed i32::MAX.
    if i64::from(request.adult_tickets) + i64::from(request.child_tickets) == 0 {
        return Err(AppError::ValidationError(
            "At least one ticket must be requested".to_string(),
        ));
    }
    if request.customer_name.trim().is_empty() || request.customer_email.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Customer name and email are required".to_string(),
        ));
    }
    Ok(())
}

/// A line with a non-zero quantity must have a price; a zero-quantity line
/// prices at zero even when no price is configured for its type.
fn resolve_prices(
    country_id: Uuid,
    adult: (i32, Option<Decimal>),
    child: (i32, Option<Decimal>),
) -> Result<(Decimal, Decimal), AppError> {
    let adult_price = resolve_line(country_id, TicketType::Adult, adult.0, adult.1)?;
    let child_price = resolve_line(country_id, TicketType::Child, child.0, child.1)?;
    Ok((adult_price, child_price))
}

fn resolve_line(
    country_id: Uuid,
    ticket_type: TicketType,
    requested: i32,
    price: Option<Decimal>,
) -> Result<Decimal, AppError> {
    match price {
        Some(price) => Ok(price),
        None if requested == 0 => Ok(Decimal::ZERO),
        None => Err(AppError::PricingUnavailable {
            country_id,
            ticket_type,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_quantity_line_needs_no_price() {
        let country_id = Uuid::new_v4();
        let (adult, child) =
            resolve_prices(country_id, (2, Some(Decimal::from(50))), (0, None)).unwrap();
        assert_eq!(adult, Decimal::from(50));
        assert_eq!(child, Decimal::ZERO);
    }

    #[test]
    fn nonzero_line_without_price_is_rejected() {
        let country_id = Uuid::new_v4();
        let err = resolve_prices(country_id, (2, Some(Decimal::from(50))), (1, None)).unwrap_err();
        assert!(matches!(
            err,
            AppError::PricingUnavailable {
                ticket_type: TicketType::Child,
                ..
            }
        ));
    }
}
