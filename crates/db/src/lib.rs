pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;

pub use connection::{connect, connect_with_settings, DbPool};
pub use fixtures::{CustomerSeedInfo, SeedDataset, SeedResult, VerificationResult};
pub use repositories::{
    customer_reservations, CustomerRepository, InMemoryCustomerRepository,
    InMemoryReservationRepository, RepositoryError, ReservationRepository, SqlCustomerRepository,
    SqlReservationRepository, DEFAULT_BEST_CUSTOMER_LIMIT,
};
