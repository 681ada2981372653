use async_trait::async_trait;
use thiserror::Error;

use lunchly_core::domain::customer::{Customer, CustomerId};
use lunchly_core::domain::reservation::{Reservation, ReservationId};
use lunchly_core::errors::{ApplicationError, DomainError};

pub mod customer;
pub mod memory;
mod name_pattern;
pub mod reservation;

pub use customer::SqlCustomerRepository;
pub use memory::{InMemoryCustomerRepository, InMemoryReservationRepository};
pub use reservation::SqlReservationRepository;

/// Number of customers returned by `best_customers` when the caller has no preference.
pub const DEFAULT_BEST_CUSTOMER_LIMIT: u32 = 10;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("No such {entity}: {id}")]
    NotFound { entity: &'static str, id: i64 },
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl RepositoryError {
    /// HTTP-equivalent status for errors the outer layer should surface as-is.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            _ => None,
        }
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound { .. } => Self::NotFound(value.to_string()),
            RepositoryError::Domain(error) => Self::Domain(error),
            RepositoryError::Database(_) | RepositoryError::Decode(_) => {
                Self::Persistence(value.to_string())
            }
        }
    }
}

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Every customer, ordered by last name then first name.
    async fn all(&self) -> Result<Vec<Customer>, RepositoryError>;

    async fn get(&self, id: CustomerId) -> Result<Customer, RepositoryError>;

    /// Case-insensitive `LIKE` match on `"{first_name} {last_name}"`, in store order.
    /// Case folding is Unicode-aware; `%` and `_` in `search_name` act as wildcards.
    async fn search(&self, search_name: &str) -> Result<Vec<Customer>, RepositoryError>;

    /// Up to `list_size` customers with at least one reservation, most reservations first.
    async fn best_customers(&self, list_size: u32) -> Result<Vec<Customer>, RepositoryError>;

    /// Inserts a transient customer (assigning its id) or overwrites a persisted one.
    async fn save(&self, customer: &mut Customer) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    async fn reservations_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Reservation>, RepositoryError>;

    async fn get(&self, id: ReservationId) -> Result<Reservation, RepositoryError>;

    async fn save(&self, reservation: &mut Reservation) -> Result<(), RepositoryError>;
}

/// Reservations belonging to a persisted customer.
pub async fn customer_reservations<R>(
    reservations: &R,
    customer: &Customer,
) -> Result<Vec<Reservation>, RepositoryError>
where
    R: ReservationRepository + ?Sized,
{
    let customer_id = customer.require_id()?;
    reservations.reservations_for_customer(customer_id).await
}
