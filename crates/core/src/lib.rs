pub mod config;
pub mod domain;
pub mod errors;

pub use domain::customer::{Customer, CustomerId, CustomerRecord, NO_NOTES_FALLBACK};
pub use domain::reservation::{Reservation, ReservationId};
pub use errors::{ApplicationError, DomainError, InterfaceError};
