//! Booking state machine and restoration tests: transition closure,
//! independent payment axis, and exactly-once inventory restoration.

mod common;

use common::{available, direct_event_fixture, event_request, fixture, ticket_request};
use reserva_server::models::{BookingStatus, PaymentStatus};
use reserva_server::utils::AppError;

#[tokio::test]
async fn pending_confirms_then_cancels() {
    let fx = fixture(10, 10);
    let booking = fx.engine.reserve(ticket_request(&fx, 2, 0)).await.unwrap();

    let confirmed = fx
        .engine
        .update_status(booking.id, BookingStatus::Confirmed)
        .await
        .unwrap();
    assert_eq!(confirmed.status, BookingStatus::Confirmed);

    let cancelled = fx.engine.cancel(booking.id).await.unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    assert_eq!(available(&fx), 10, "cancellation restores the ledger");
}

#[tokio::test]
async fn cancelled_is_terminal() {
    let fx = fixture(10, 10);
    let booking = fx.engine.reserve(ticket_request(&fx, 1, 0)).await.unwrap();
    fx.engine.cancel(booking.id).await.unwrap();

    for next in [BookingStatus::Pending, BookingStatus::Confirmed] {
        let err = fx.engine.update_status(booking.id, next).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
    }
}

#[tokio::test]
async fn confirmed_cannot_return_to_pending() {
    let fx = fixture(10, 10);
    let booking = fx.engine.reserve(ticket_request(&fx, 1, 0)).await.unwrap();
    fx.engine
        .update_status(booking.id, BookingStatus::Confirmed)
        .await
        .unwrap();

    let err = fx
        .engine
        .update_status(booking.id, BookingStatus::Pending)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));
}

#[tokio::test]
async fn same_state_update_is_a_noop() {
    let fx = fixture(10, 10);
    let booking = fx.engine.reserve(ticket_request(&fx, 1, 0)).await.unwrap();

    let unchanged = fx
        .engine
        .update_status(booking.id, BookingStatus::Pending)
        .await
        .unwrap();
    assert_eq!(unchanged.status, BookingStatus::Pending);

    let unchanged = fx
        .engine
        .update_payment(booking.id, PaymentStatus::Pending, None, None)
        .await
        .unwrap();
    assert_eq!(unchanged.payment_status, PaymentStatus::Pending);
}

#[tokio::test]
async fn paid_stamps_payment_details_and_refunds() {
    let fx = fixture(10, 10);
    let booking = fx.engine.reserve(ticket_request(&fx, 1, 0)).await.unwrap();

    let paid = fx
        .engine
        .update_payment(
            booking.id,
            PaymentStatus::Paid,
            Some("pay_on_delivery".to_string()),
            Some("POD-1042".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(paid.payment_status, PaymentStatus::Paid);
    assert_eq!(paid.payment_method.as_deref(), Some("pay_on_delivery"));
    assert_eq!(paid.payment_reference.as_deref(), Some("POD-1042"));
    assert!(paid.payment_date.is_some());
    // The status axis is untouched by payment transitions.
    assert_eq!(paid.status, BookingStatus::Pending);

    let refunded = fx
        .engine
        .update_payment(booking.id, PaymentStatus::Refunded, None, None)
        .await
        .unwrap();
    assert_eq!(refunded.payment_status, PaymentStatus::Refunded);
    assert_eq!(refunded.payment_date, paid.payment_date);
}

#[tokio::test]
async fn illegal_payment_edges_are_rejected() {
    let fx = fixture(10, 10);
    let booking = fx.engine.reserve(ticket_request(&fx, 1, 0)).await.unwrap();

    // pending -> refunded skips paid.
    let err = fx
        .engine
        .update_payment(booking.id, PaymentStatus::Refunded, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));

    fx.engine
        .update_payment(booking.id, PaymentStatus::Failed, None, None)
        .await
        .unwrap();
    let err = fx
        .engine
        .update_payment(booking.id, PaymentStatus::Paid, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));
}

#[tokio::test]
async fn cancelling_twice_restores_only_once() {
    let fx = fixture(10, 10);
    let booking = fx.engine.reserve(ticket_request(&fx, 2, 1)).await.unwrap();
    assert_eq!(available(&fx), 7);

    fx.engine.cancel(booking.id).await.unwrap();
    assert_eq!(available(&fx), 10);

    // Second cancel is a no-op, not a double credit.
    let again = fx.engine.cancel(booking.id).await.unwrap();
    assert_eq!(again.status, BookingStatus::Cancelled);
    assert_eq!(available(&fx), 10);
}

#[tokio::test]
async fn cancellation_restores_even_when_paid() {
    let fx = fixture(10, 10);
    let booking = fx.engine.reserve(ticket_request(&fx, 3, 0)).await.unwrap();
    fx.engine
        .update_payment(booking.id, PaymentStatus::Paid, None, None)
        .await
        .unwrap();

    fx.engine.cancel(booking.id).await.unwrap();
    assert_eq!(available(&fx), 10);
}

#[tokio::test]
async fn delete_restores_then_removes() {
    let fx = fixture(10, 10);
    let booking = fx.engine.reserve(ticket_request(&fx, 2, 0)).await.unwrap();
    assert_eq!(available(&fx), 8);

    fx.engine.delete(booking.id).await.unwrap();
    assert_eq!(available(&fx), 10);

    let err = fx
        .engine
        .lookup_by_reference(&booking.booking_reference)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn deleting_a_cancelled_booking_restores_nothing_further() {
    let fx = fixture(10, 10);
    let booking = fx.engine.reserve(ticket_request(&fx, 2, 0)).await.unwrap();

    fx.engine.cancel(booking.id).await.unwrap();
    assert_eq!(available(&fx), 10);

    fx.engine.delete(booking.id).await.unwrap();
    assert_eq!(available(&fx), 10);

    // Gone for good.
    let err = fx.engine.delete(booking.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn failed_restoration_still_leaves_the_booking_cancelled() {
    let fx = fixture(10, 10);
    let booking = fx.engine.reserve(ticket_request(&fx, 2, 0)).await.unwrap();
    assert_eq!(available(&fx), 8);

    // Shrink the ledger so crediting the 2 seats back would exceed
    // total_quantity: the credit must fail, the cancellation must not.
    let mut ticket = fx.engine.store().ticket_snapshot(fx.ticket_id).unwrap();
    ticket.total_quantity = 9;
    fx.engine.store().insert_ticket(ticket);

    let cancelled = fx.engine.cancel(booking.id).await.unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    assert_eq!(available(&fx), 8, "a refused credit leaves the ledger unchanged");

    let found = fx
        .engine
        .lookup_by_reference(&booking.booking_reference)
        .await
        .unwrap();
    assert_eq!(found.status, BookingStatus::Cancelled);
}

#[tokio::test]
async fn direct_event_cancellation_touches_no_ledger() {
    let fx = direct_event_fixture();
    let booking = fx.engine.reserve(event_request(&fx, 1, 1)).await.unwrap();

    let cancelled = fx.engine.cancel(booking.id).await.unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
}

#[tokio::test]
async fn lookup_by_reference_round_trips() {
    let fx = fixture(10, 10);
    let booking = fx.engine.reserve(ticket_request(&fx, 1, 0)).await.unwrap();

    let found = fx
        .engine
        .lookup_by_reference(&booking.booking_reference)
        .await
        .unwrap();
    assert_eq!(found.id, booking.id);

    let err = fx
        .engine
        .lookup_by_reference("BK000000000000")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
