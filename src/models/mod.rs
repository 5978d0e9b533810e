pub mod booking;
pub mod country;
pub mod event;
pub mod ticket;

pub use booking::{Booking, BookingKind, BookingStatus, CustomerInfo, NewBooking, PaymentStatus};
pub use country::Country;
pub use event::Event;
pub use ticket::{Ticket, TicketPricing, TicketType};
