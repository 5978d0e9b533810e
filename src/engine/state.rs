use chrono::Utc;
use uuid::Uuid;

use crate::engine::BookingEngine;
use crate::models::{Booking, BookingStatus, PaymentStatus};
use crate::store::{PaymentUpdate, Store};
use crate::utils::AppError;

/// How many times a compare-and-swap update is retried against concurrent
/// mutation of the same booking before giving up.
const CAS_ATTEMPTS: u32 = 3;

impl<S: Store> BookingEngine<S> {
    /// Moves `status` along a legal edge. Requesting the current status is
    /// a no-op; a disallowed edge is `InvalidTransition`. Winning the flip
    /// to `cancelled` triggers inventory restoration exactly once.
    pub async fn update_status(
        &self,
        id: Uuid,
        next: BookingStatus,
    ) -> Result<Booking, AppError> {
        for _ in 0..CAS_ATTEMPTS {
            let current = self.fetch(id).await?;
            if current.status == next {
                return Ok(current);
            }
            if !current.status.can_transition_to(next) {
                return Err(AppError::InvalidTransition {
                    from: current.status.to_string(),
                    to: next.to_string(),
                });
            }
            if let Some(updated) = self.store.set_status(id, current.status, next).await? {
                if next == BookingStatus::Cancelled {
                    self.restore(&updated).await;
                }
                return Ok(updated);
            }
            // Lost the race against a concurrent update; re-read and retry.
        }
        Err(AppError::TransientContention)
    }

    /// Moves `payment_status` along a legal edge, independently of
    /// `status`. Reaching `paid` stamps `payment_date` and records the
    /// method/reference when provided.
    pub async fn update_payment(
        &self,
        id: Uuid,
        next: PaymentStatus,
        method: Option<String>,
        reference: Option<String>,
    ) -> Result<Booking, AppError> {
        for _ in 0..CAS_ATTEMPTS {
            let current = self.fetch(id).await?;
            if current.payment_status == next {
                return Ok(current);
            }
            if !current.payment_status.can_transition_to(next) {
                return Err(AppError::InvalidTransition {
                    from: current.payment_status.to_string(),
                    to: next.to_string(),
                });
            }
            let update = PaymentUpdate {
                status: next,
                method: method.clone(),
                reference: reference.clone(),
                paid_at: (next == PaymentStatus::Paid).then(Utc::now),
            };
            if let Some(updated) = self
                .store
                .set_payment(id, current.payment_status, update)
                .await?
            {
                return Ok(updated);
            }
        }
        Err(AppError::TransientContention)
    }

    /// `status -> cancelled`, restoring reserved inventory.
    pub async fn cancel(&self, id: Uuid) -> Result<Booking, AppError> {
        self.update_status(id, BookingStatus::Cancelled).await
    }

    /// Removes the booking, restoring inventory first unless a cancellation
    /// already did. Deleting twice is a `NotFound`, never a double credit.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let booking = self.fetch(id).await?;
        if booking.status != BookingStatus::Cancelled {
            self.update_status(id, BookingStatus::Cancelled).await?;
        }
        self.store.delete_booking(id).await
    }

    async fn fetch(&self, id: Uuid) -> Result<Booking, AppError> {
        self.store
            .booking(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking {id}")))
    }
}
