use sqlx::PgPool;
use uuid::Uuid;

use crate::models::booking::BookingKind;
use crate::models::ticket::TicketType;
use crate::models::{Booking, BookingStatus, Country, Event, NewBooking, PaymentStatus, Ticket, TicketPricing};
use crate::store::{PaymentUpdate, Store};
use crate::utils::AppError;

/// Postgres-backed store. Atomicity comes from transactions plus conditional
/// `UPDATE … WHERE` forms whose affected-row count is checked, so two racing
/// reservations can never both decrement the same last ticket.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const INSERT_BOOKING: &str = "\
    INSERT INTO bookings ( \
        booking_reference, event_id, ticket_id, country_id, \
        customer_name, customer_email, customer_phone, \
        adult_tickets, child_tickets, adult_price, child_price, total_amount \
    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
    RETURNING *";

/// Lock-timeout (55P03) and unique-violation (23505, the booking reference
/// insert race) both mean "retry may succeed"; everything else is a real
/// database error.
fn map_commit_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if matches!(db.code().as_deref(), Some("55P03") | Some("23505")) {
            return AppError::TransientContention;
        }
    }
    AppError::DatabaseError(err)
}

impl Store for PgStore {
    async fn event(&self, id: Uuid) -> Result<Option<Event>, AppError> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }

    async fn ticket(&self, id: Uuid) -> Result<Option<Ticket>, AppError> {
        let ticket = sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(ticket)
    }

    async fn country(&self, id: Uuid) -> Result<Option<Country>, AppError> {
        let country = sqlx::query_as::<_, Country>("SELECT * FROM countries WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(country)
    }

    async fn pricing(
        &self,
        ticket_id: Uuid,
        country_id: Uuid,
    ) -> Result<Option<TicketPricing>, AppError> {
        let pricing = sqlx::query_as::<_, TicketPricing>(
            "SELECT * FROM ticket_countries WHERE ticket_id = $1 AND country_id = $2",
        )
        .bind(ticket_id)
        .bind(country_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(pricing)
    }

    async fn reference_exists(&self, reference: &str) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM bookings WHERE booking_reference = $1)",
        )
        .bind(reference)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn commit_reservation(&self, new: NewBooking) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await?;

        // Bound lock waits so contention surfaces as a retryable error
        // instead of an indefinite stall.
        sqlx::query("SET LOCAL lock_timeout = '2s'")
            .execute(&mut *tx)
            .await?;

        if let BookingKind::Ticket(ticket_id) = new.kind {
            let lines = [
                (TicketType::Adult, new.adult_tickets),
                (TicketType::Child, new.child_tickets),
            ];
            for (ticket_type, requested) in lines {
                if requested == 0 {
                    continue;
                }
                let updated = sqlx::query(
                    "UPDATE tickets \
                     SET available_quantity = available_quantity - $2, updated_at = NOW() \
                     WHERE id = $1 AND available_quantity >= $2",
                )
                .bind(ticket_id)
                .bind(requested)
                .execute(&mut *tx)
                .await
                .map_err(map_commit_error)?;

                if updated.rows_affected() == 0 {
                    let available: Option<i32> =
                        sqlx::query_scalar("SELECT available_quantity FROM tickets WHERE id = $1")
                            .bind(ticket_id)
                            .fetch_optional(&mut *tx)
                            .await?;
                    let available = available
                        .ok_or_else(|| AppError::NotFound(format!("Ticket {ticket_id}")))?;
                    // Dropping the transaction rolls back any earlier line.
                    return Err(AppError::InsufficientInventory {
                        ticket_type,
                        requested,
                        available,
                    });
                }
            }
        }

        let booking = sqlx::query_as::<_, Booking>(INSERT_BOOKING)
            .bind(&new.booking_reference)
            .bind(new.event_id)
            .bind(new.ticket_id())
            .bind(new.country_id)
            .bind(&new.customer.name)
            .bind(&new.customer.email)
            .bind(&new.customer.phone)
            .bind(new.adult_tickets)
            .bind(new.child_tickets)
            .bind(new.adult_price)
            .bind(new.child_price)
            .bind(new.total_amount)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_commit_error)?;

        tx.commit().await?;
        Ok(booking)
    }

    async fn booking(&self, id: Uuid) -> Result<Option<Booking>, AppError> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(booking)
    }

    async fn booking_by_reference(&self, reference: &str) -> Result<Option<Booking>, AppError> {
        let booking =
            sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE booking_reference = $1")
                .bind(reference)
                .fetch_optional(&self.pool)
                .await?;
        Ok(booking)
    }

    async fn set_status(
        &self,
        id: Uuid,
        expected: BookingStatus,
        next: BookingStatus,
    ) -> Result<Option<Booking>, AppError> {
        let booking = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = $3, updated_at = NOW() \
             WHERE id = $1 AND status = $2 \
             RETURNING *",
        )
        .bind(id)
        .bind(expected)
        .bind(next)
        .fetch_optional(&self.pool)
        .await?;
        Ok(booking)
    }

    async fn set_payment(
        &self,
        id: Uuid,
        expected: PaymentStatus,
        update: PaymentUpdate,
    ) -> Result<Option<Booking>, AppError> {
        let booking = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET \
                payment_status = $3, \
                payment_method = COALESCE($4, payment_method), \
                payment_reference = COALESCE($5, payment_reference), \
                payment_date = COALESCE($6, payment_date), \
                updated_at = NOW() \
             WHERE id = $1 AND payment_status = $2 \
             RETURNING *",
        )
        .bind(id)
        .bind(expected)
        .bind(update.status)
        .bind(update.method)
        .bind(update.reference)
        .bind(update.paid_at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(booking)
    }

    async fn credit_inventory(&self, ticket_id: Uuid, quantity: i32) -> Result<(), AppError> {
        let updated = sqlx::query(
            "UPDATE tickets \
             SET available_quantity = available_quantity + $2, updated_at = NOW() \
             WHERE id = $1 AND available_quantity + $2 <= total_quantity",
        )
        .bind(ticket_id)
        .bind(quantity)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            let available: Option<i32> =
                sqlx::query_scalar("SELECT available_quantity FROM tickets WHERE id = $1")
                    .bind(ticket_id)
                    .fetch_optional(&self.pool)
                    .await?;
            return Err(match available {
                None => AppError::NotFound(format!("Ticket {ticket_id}")),
                Some(available) => AppError::InternalServerError(format!(
                    "crediting {quantity} to ticket {ticket_id} (available {available}) would exceed total_quantity"
                )),
            });
        }
        Ok(())
    }

    async fn delete_booking(&self, id: Uuid) -> Result<(), AppError> {
        let deleted = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Booking {id}")));
        }
        Ok(())
    }
}
