use sqlx::Executor;

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

/// Canonical seed customers and the number of reservations each one owns.
const SEED_CUSTOMERS: &[SeedCustomerContract] = &[
    SeedCustomerContract {
        id: 1,
        first_name: "Anita",
        last_name: "Harris",
        has_notes: true,
        reservation_count: 4,
    },
    SeedCustomerContract {
        id: 2,
        first_name: "Bradley",
        last_name: "Chen",
        has_notes: false,
        reservation_count: 2,
    },
    SeedCustomerContract {
        id: 3,
        first_name: "Carmen",
        last_name: "Diaz",
        has_notes: true,
        reservation_count: 1,
    },
    SeedCustomerContract {
        id: 4,
        first_name: "Derek",
        last_name: "Evans",
        has_notes: false,
        reservation_count: 0,
    },
    SeedCustomerContract {
        id: 5,
        first_name: "Elena",
        last_name: "Fischer",
        has_notes: true,
        reservation_count: 3,
    },
];

const SEED_RESERVATION_TOTAL: i64 = 10;

/// Deterministic customers and reservations for demos and end-to-end checks.
pub struct SeedDataset;

impl SeedDataset {
    pub const SQL: &str = include_str!("../../../config/fixtures/seed_data.sql");

    /// Loads the fixture rows; rows that already exist are left untouched.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;

        tx.execute(sqlx::query(Self::SQL)).await?;
        tx.commit().await?;

        let customers_seeded = SEED_CUSTOMERS
            .iter()
            .map(|customer| CustomerSeedInfo {
                id: customer.id,
                full_name: format!("{} {}", customer.first_name, customer.last_name),
                reservation_count: customer.reservation_count,
            })
            .collect::<Vec<_>>();

        Ok(SeedResult { customers_seeded, reservations_seeded: SEED_RESERVATION_TOTAL })
    }

    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();

        for customer in SEED_CUSTOMERS {
            let exists: i64 = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM customers WHERE id = ?1 AND first_name = ?2 AND last_name = ?3)",
            )
            .bind(customer.id)
            .bind(customer.first_name)
            .bind(customer.last_name)
            .fetch_one(pool)
            .await?;
            checks.push((customer.exists_label(), exists == 1));

            let notes_present: i64 =
                sqlx::query_scalar("SELECT COUNT(1) FROM customers WHERE id = ?1 AND notes <> ''")
                    .bind(customer.id)
                    .fetch_one(pool)
                    .await?;
            checks.push((customer.notes_label(), (notes_present == 1) == customer.has_notes));

            let reservation_count: i64 =
                sqlx::query_scalar("SELECT COUNT(1) FROM reservations WHERE customer_id = ?1")
                    .bind(customer.id)
                    .fetch_one(pool)
                    .await?;
            checks.push((
                customer.reservations_label(),
                reservation_count == customer.reservation_count,
            ));
        }

        let total: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM reservations WHERE id <= ?1")
            .bind(SEED_RESERVATION_TOTAL)
            .fetch_one(pool)
            .await?;
        checks.push(("reservations-total", total == SEED_RESERVATION_TOTAL));

        let all_present = checks.iter().all(|(_, passed)| *passed);
        Ok(VerificationResult { all_present, checks })
    }

    /// Removes the fixture rows from a test database.
    pub async fn clean(pool: &DbPool) -> Result<(), RepositoryError> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM reservations WHERE id <= ?1")
            .bind(SEED_RESERVATION_TOTAL)
            .execute(&mut *tx)
            .await?;
        for customer in SEED_CUSTOMERS {
            sqlx::query("DELETE FROM customers WHERE id = ?1")
                .bind(customer.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct SeedCustomerContract {
    id: i64,
    first_name: &'static str,
    last_name: &'static str,
    has_notes: bool,
    reservation_count: i64,
}

impl SeedCustomerContract {
    fn exists_label(&self) -> &'static str {
        match self.id {
            1 => "customer-1-exists",
            2 => "customer-2-exists",
            3 => "customer-3-exists",
            4 => "customer-4-exists",
            _ => "customer-5-exists",
        }
    }

    fn notes_label(&self) -> &'static str {
        match self.id {
            1 => "customer-1-notes",
            2 => "customer-2-notes",
            3 => "customer-3-notes",
            4 => "customer-4-notes",
            _ => "customer-5-notes",
        }
    }

    fn reservations_label(&self) -> &'static str {
        match self.id {
            1 => "customer-1-reservations",
            2 => "customer-2-reservations",
            3 => "customer-3-reservations",
            4 => "customer-4-reservations",
            _ => "customer-5-reservations",
        }
    }
}

#[derive(Debug)]
pub struct SeedResult {
    pub customers_seeded: Vec<CustomerSeedInfo>,
    pub reservations_seeded: i64,
}

#[derive(Debug)]
pub struct CustomerSeedInfo {
    pub id: i64,
    pub full_name: String,
    pub reservation_count: i64,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}
