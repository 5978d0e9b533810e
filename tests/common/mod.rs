#![allow(dead_code)]

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use reserva_server::engine::{BookingEngine, ReserveRequest};
use reserva_server::models::{Country, Event, Ticket, TicketPricing};
use reserva_server::store::MemoryStore;

pub const ADULT_PRICE: i64 = 50;
pub const CHILD_PRICE: i64 = 30;

pub struct Fixture {
    pub engine: BookingEngine<MemoryStore>,
    pub country_id: Uuid,
    pub event_id: Uuid,
    pub ticket_id: Uuid,
}

/// Engine over a seeded store: one open event, one active ticket bound to
/// it with `available` of `total` seats left, priced 50/30 for the seeded
/// country.
pub fn fixture(total: i32, available: i32) -> Fixture {
    let engine = BookingEngine::new(MemoryStore::new());
    let country = country();
    let event = open_event(None, None);
    let ticket = ticket(Some(event.id), total, available);
    let country_id = country.id;
    let event_id = event.id;
    let ticket_id = ticket.id;

    engine.store().insert_country(country);
    engine.store().insert_event(event);
    engine.store().insert_ticket(ticket);
    engine.store().insert_pricing(pricing(
        ticket_id,
        country_id,
        Decimal::from(ADULT_PRICE),
        Decimal::from(CHILD_PRICE),
    ));

    Fixture {
        engine,
        country_id,
        event_id,
        ticket_id,
    }
}

/// Engine seeded for direct event bookings: an open event with flat
/// prices and no tickets at all.
pub fn direct_event_fixture() -> Fixture {
    let engine = BookingEngine::new(MemoryStore::new());
    let country = country();
    let event = open_event(Some(Decimal::from(40)), Some(Decimal::from(25)));
    let country_id = country.id;
    let event_id = event.id;

    engine.store().insert_country(country);
    engine.store().insert_event(event);

    Fixture {
        engine,
        country_id,
        event_id,
        ticket_id: Uuid::nil(),
    }
}

pub fn country() -> Country {
    let now = Utc::now();
    Country {
        id: Uuid::new_v4(),
        name: "United Kingdom".to_string(),
        code: "UK".to_string(),
        currency_code: "GBP".to_string(),
        currency_symbol: "£".to_string(),
        created_at: now,
        updated_at: now,
    }
}

pub fn open_event(adult_price: Option<Decimal>, child_price: Option<Decimal>) -> Event {
    let now = Utc::now();
    Event {
        id: Uuid::new_v4(),
        title: "Harbour Lights Festival".to_string(),
        event_date: now + Duration::days(30),
        booking_start_date: None,
        booking_end_date: None,
        adult_price,
        child_price,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn ticket(event_id: Option<Uuid>, total: i32, available: i32) -> Ticket {
    let now = Utc::now();
    Ticket {
        id: Uuid::new_v4(),
        event_id,
        name: "General Admission".to_string(),
        total_quantity: total,
        available_quantity: available,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn pricing(
    ticket_id: Uuid,
    country_id: Uuid,
    adult_price: Decimal,
    child_price: Decimal,
) -> TicketPricing {
    let now = Utc::now();
    TicketPricing {
        id: Uuid::new_v4(),
        ticket_id,
        country_id,
        adult_price,
        child_price,
        created_at: now,
        updated_at: now,
    }
}

pub fn ticket_request(fx: &Fixture, adult: i32, child: i32) -> ReserveRequest {
    ReserveRequest {
        event_id: None,
        ticket_id: Some(fx.ticket_id),
        country_id: fx.country_id,
        customer_name: "Nia Okafor".to_string(),
        customer_email: "nia@example.com".to_string(),
        customer_phone: None,
        adult_tickets: adult,
        child_tickets: child,
    }
}

pub fn event_request(fx: &Fixture, adult: i32, child: i32) -> ReserveRequest {
    ReserveRequest {
        event_id: Some(fx.event_id),
        ticket_id: None,
        country_id: fx.country_id,
        customer_name: "Nia Okafor".to_string(),
        customer_email: "nia@example.com".to_string(),
        customer_phone: Some("+44 20 7946 0000".to_string()),
        adult_tickets: adult,
        child_tickets: child,
    }
}

pub fn available(fx: &Fixture) -> i32 {
    fx.engine
        .store()
        .ticket_snapshot(fx.ticket_id)
        .expect("ticket should exist")
        .available_quantity
}
