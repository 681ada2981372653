use sqlx::Row;
use tracing::{debug, info, warn};

use lunchly_core::domain::customer::{Customer, CustomerId, CustomerRecord};

use super::name_pattern::NamePattern;
use super::{CustomerRepository, RepositoryError};
use crate::DbPool;

const CUSTOMER_COLUMNS: &str = r#"SELECT id,
            first_name AS "firstName",
            last_name  AS "lastName",
            phone,
            notes
     FROM customers"#;

pub struct SqlCustomerRepository {
    pool: DbPool,
}

impl SqlCustomerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_customer(row: &sqlx::sqlite::SqliteRow) -> Result<Customer, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let first_name: String =
        row.try_get("firstName").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let last_name: String =
        row.try_get("lastName").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let phone: Option<String> =
        row.try_get("phone").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let notes: Option<String> =
        row.try_get("notes").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(Customer::from_record(CustomerRecord { id: Some(id), first_name, last_name, phone, notes }))
}

#[async_trait::async_trait]
impl CustomerRepository for SqlCustomerRepository {
    async fn all(&self) -> Result<Vec<Customer>, RepositoryError> {
        let rows: Vec<sqlx::sqlite::SqliteRow> =
            sqlx::query(&format!("{CUSTOMER_COLUMNS} ORDER BY last_name, first_name"))
                .fetch_all(&self.pool)
                .await?;

        rows.iter().map(row_to_customer).collect::<Result<Vec<_>, _>>()
    }

    async fn get(&self, id: CustomerId) -> Result<Customer, RepositoryError> {
        let row = sqlx::query(&format!("{CUSTOMER_COLUMNS} WHERE id = ?"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(ref r) => row_to_customer(r),
            None => Err(RepositoryError::NotFound { entity: "customer", id: id.0 }),
        }
    }

    async fn search(&self, search_name: &str) -> Result<Vec<Customer>, RepositoryError> {
        // SQLite `LIKE` folds ASCII only, so the pattern is applied here, in scan order.
        let rows: Vec<sqlx::sqlite::SqliteRow> =
            sqlx::query(CUSTOMER_COLUMNS).fetch_all(&self.pool).await?;

        let pattern = NamePattern::new(search_name);
        let mut matches = Vec::new();
        for row in &rows {
            let customer = row_to_customer(row)?;
            if pattern.matches(&customer.full_name()) {
                matches.push(customer);
            }
        }

        debug!(
            event_name = "db.customer.search",
            search_name,
            scanned = rows.len(),
            matches = matches.len(),
            "customer search executed"
        );
        Ok(matches)
    }

    async fn best_customers(&self, list_size: u32) -> Result<Vec<Customer>, RepositoryError> {
        let rows: Vec<sqlx::sqlite::SqliteRow> = sqlx::query(
            r#"SELECT c.id,
                      c.first_name AS "firstName",
                      c.last_name  AS "lastName",
                      c.phone,
                      c.notes,
                      COUNT(r.id)  AS "reservationCount"
               FROM reservations AS r
                 JOIN customers AS c
                 ON r.customer_id = c.id
               GROUP BY c.id, c.first_name, c.last_name, c.phone, c.notes
               ORDER BY COUNT(r.id) DESC
               LIMIT ?"#,
        )
        .bind(list_size)
        .fetch_all(&self.pool)
        .await?;

        for row in &rows {
            let id: i64 = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
            let reservation_count: i64 = row
                .try_get("reservationCount")
                .map_err(|e| RepositoryError::Decode(e.to_string()))?;
            debug!(
                event_name = "db.customer.ranked",
                customer_id = id,
                reservation_count,
                "best customer row"
            );
        }

        rows.iter().map(row_to_customer).collect::<Result<Vec<_>, _>>()
    }

    async fn save(&self, customer: &mut Customer) -> Result<(), RepositoryError> {
        match customer.id {
            None => {
                let id: i64 = sqlx::query_scalar(
                    "INSERT INTO customers (first_name, last_name, phone, notes)
                     VALUES (?, ?, ?, ?)
                     RETURNING id",
                )
                .bind(&customer.first_name)
                .bind(&customer.last_name)
                .bind(&customer.phone)
                .bind(customer.notes())
                .fetch_one(&self.pool)
                .await?;

                customer.id = Some(CustomerId(id));
                info!(event_name = "db.customer.inserted", customer_id = id, "customer inserted");
            }
            Some(id) => {
                let result = sqlx::query(
                    "UPDATE customers
                     SET first_name = ?,
                         last_name = ?,
                         phone = ?,
                         notes = ?
                     WHERE id = ?",
                )
                .bind(&customer.first_name)
                .bind(&customer.last_name)
                .bind(&customer.phone)
                .bind(customer.notes())
                .bind(id.0)
                .execute(&self.pool)
                .await?;

                if result.rows_affected() == 0 {
                    warn!(
                        event_name = "db.customer.update_missed",
                        customer_id = id.0,
                        "update matched no customer row"
                    );
                } else {
                    info!(event_name = "db.customer.updated", customer_id = id.0, "customer updated");
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use lunchly_core::domain::customer::{Customer, CustomerId, NO_NOTES_FALLBACK};
    use lunchly_core::domain::reservation::Reservation;

    use super::SqlCustomerRepository;
    use crate::repositories::{
        customer_reservations, CustomerRepository, InMemoryCustomerRepository, RepositoryError,
        ReservationRepository, SqlReservationRepository,
    };
    use crate::{connect_with_settings, migrations};

    async fn setup() -> sqlx::SqlitePool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    async fn insert(repo: &SqlCustomerRepository, first: &str, last: &str) -> Customer {
        let mut customer = Customer::new(first, last, None, None);
        repo.save(&mut customer).await.expect("save customer");
        customer
    }

    async fn book(pool: &sqlx::SqlitePool, customer: &Customer, count: i64) {
        let repo = SqlReservationRepository::new(pool.clone());
        let base = Utc.with_ymd_and_hms(2026, 3, 1, 18, 0, 0).single().expect("valid timestamp");
        for offset in 0..count {
            let mut reservation = Reservation::new(
                customer.id.expect("persisted customer"),
                2,
                base + Duration::days(offset),
                None,
            );
            repo.save(&mut reservation).await.expect("save reservation");
        }
    }

    #[tokio::test]
    async fn save_inserts_transient_customer_and_assigns_id() {
        let pool = setup().await;
        let repo = SqlCustomerRepository::new(pool);

        let mut customer =
            Customer::new("Ada", "Lovelace", Some("555-0100".to_string()), Some("vip".to_string()));
        repo.save(&mut customer).await.expect("save");

        let id = customer.id.expect("id assigned on insert");
        let found = repo.get(id).await.expect("get");
        assert_eq!(found, customer);
        assert_eq!(found.phone.as_deref(), Some("555-0100"));
        assert_eq!(found.notes(), "vip");
    }

    #[tokio::test]
    async fn save_persists_fallback_notes() {
        let pool = setup().await;
        let repo = SqlCustomerRepository::new(pool);

        let customer = insert(&repo, "Grace", "Hopper").await;
        let found = repo.get(customer.id.expect("id")).await.expect("get");

        assert_eq!(found.notes(), NO_NOTES_FALLBACK);
    }

    #[tokio::test]
    async fn blank_notes_in_store_are_read_back_as_fallback() {
        let pool = setup().await;
        sqlx::query("INSERT INTO customers (first_name, last_name) VALUES ('Legacy', 'Row')")
            .execute(&pool)
            .await
            .expect("insert raw row");

        let repo = SqlCustomerRepository::new(pool);
        let all = repo.all().await.expect("all");

        assert_eq!(all.len(), 1);
        assert_eq!(all[0].notes(), NO_NOTES_FALLBACK);
    }

    #[tokio::test]
    async fn save_updates_persisted_customer_in_place() {
        let pool = setup().await;
        let repo = SqlCustomerRepository::new(pool.clone());

        let mut customer = insert(&repo, "Alan", "Turing").await;
        let id = customer.id.expect("id");

        customer.first_name = "Alan M.".to_string();
        customer.phone = Some("555-0199".to_string());
        customer.set_notes(Some("prefers the patio"));
        repo.save(&mut customer).await.expect("update");

        assert_eq!(customer.id, Some(id));
        let found = repo.get(id).await.expect("get");
        assert_eq!(found.first_name, "Alan M.");
        assert_eq!(found.phone.as_deref(), Some("555-0199"));
        assert_eq!(found.notes(), "prefers the patio");

        let (rows,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM customers WHERE id = ?")
            .bind(id.0)
            .fetch_one(&pool)
            .await
            .expect("count");
        assert_eq!(rows, 1);
        assert_eq!(repo.all().await.expect("all").len(), 1);
    }

    #[tokio::test]
    async fn get_missing_customer_is_not_found_with_404() {
        let pool = setup().await;
        let repo = SqlCustomerRepository::new(pool);

        let error = repo.get(CustomerId(4242)).await.expect_err("missing customer");

        assert!(matches!(error, RepositoryError::NotFound { entity: "customer", id: 4242 }));
        assert_eq!(error.status_code(), Some(404));
        assert!(error.to_string().contains("4242"));
    }

    #[tokio::test]
    async fn all_orders_by_last_then_first_name() {
        let pool = setup().await;
        let repo = SqlCustomerRepository::new(pool);

        insert(&repo, "Zed", "Adams").await;
        insert(&repo, "Bea", "Carter").await;
        insert(&repo, "Amy", "Adams").await;
        insert(&repo, "Cal", "Baker").await;

        let names: Vec<String> =
            repo.all().await.expect("all").iter().map(Customer::full_name).collect();

        assert_eq!(names, vec!["Amy Adams", "Zed Adams", "Cal Baker", "Bea Carter"]);
    }

    #[tokio::test]
    async fn all_on_empty_store_is_empty() {
        let pool = setup().await;
        let repo = SqlCustomerRepository::new(pool);

        assert!(repo.all().await.expect("all").is_empty());
    }

    #[tokio::test]
    async fn search_matches_full_name_case_insensitively() {
        let pool = setup().await;
        let repo = SqlCustomerRepository::new(pool);

        insert(&repo, "Mary", "Shelley").await;
        insert(&repo, "Percy", "Shelley").await;
        insert(&repo, "Jane", "Austen").await;

        let mut shelleys: Vec<String> =
            repo.search("shell").await.expect("search").iter().map(Customer::full_name).collect();
        shelleys.sort();
        assert_eq!(shelleys, vec!["Mary Shelley", "Percy Shelley"]);

        let across_space = repo.search("Y SHE").await.expect("search");
        assert_eq!(across_space.len(), 2, "pattern spans the first/last name boundary");

        assert!(repo.search("tolkien").await.expect("search").is_empty());
    }

    #[tokio::test]
    async fn search_folds_case_beyond_ascii() {
        let pool = setup().await;
        let repo = SqlCustomerRepository::new(pool);

        insert(&repo, "Émile", "Zola").await;
        insert(&repo, "Ann", "Lee").await;

        let found = repo.search("émile").await.expect("search");
        assert_eq!(found.iter().map(Customer::full_name).collect::<Vec<_>>(), vec!["Émile Zola"]);
        assert_eq!(repo.search("ÉMILE ZO").await.expect("search").len(), 1);
    }

    #[tokio::test]
    async fn search_treats_percent_and_underscore_as_wildcards() {
        let pool = setup().await;
        let repo = SqlCustomerRepository::new(pool);

        insert(&repo, "Émile", "Zola").await;
        insert(&repo, "Ann", "Lee").await;

        assert_eq!(repo.search("%").await.expect("search").len(), 2);
        assert_eq!(repo.search("_").await.expect("search").len(), 2);

        let found = repo.search("A_n").await.expect("search");
        assert_eq!(found.iter().map(Customer::full_name).collect::<Vec<_>>(), vec!["Ann Lee"]);
        assert!(repo.search("z%a%x").await.expect("search").is_empty());
    }

    #[tokio::test]
    async fn search_agrees_with_in_memory_store() {
        let pool = setup().await;
        let sql = SqlCustomerRepository::new(pool);
        let memory = InMemoryCustomerRepository::default();

        for (first, last) in [("Émile", "Zola"), ("Ann", "Lee"), ("Mary", "Shelley"), ("Øyvind", "Berg")] {
            insert(&sql, first, last).await;
            let mut customer = Customer::new(first, last, None, None);
            memory.save(&mut customer).await.expect("save in memory");
        }

        for query in ["émile", "ÉMILE", "%", "_", "A_n", "e%e", "øy", "Y SHE", "", " ", "nobody"] {
            let from_sql = sql.search(query).await.expect("sql search");
            let from_memory = memory.search(query).await.expect("memory search");
            assert_eq!(from_sql, from_memory, "stores disagree on `{query}`");
        }
    }

    #[tokio::test]
    async fn empty_search_matches_everyone() {
        let pool = setup().await;
        let repo = SqlCustomerRepository::new(pool);

        insert(&repo, "Mary", "Shelley").await;
        insert(&repo, "Jane", "Austen").await;

        assert_eq!(repo.search("").await.expect("search").len(), 2);
        assert_eq!(repo.search(" ").await.expect("search").len(), 2);
    }

    #[tokio::test]
    async fn best_customers_ranks_by_reservation_count_and_skips_zero() {
        let pool = setup().await;
        let repo = SqlCustomerRepository::new(pool.clone());

        let a = insert(&repo, "Anna", "Able").await;
        let b = insert(&repo, "Ben", "Baker").await;
        let c = insert(&repo, "Cleo", "Cole").await;
        book(&pool, &a, 3).await;
        book(&pool, &b, 1).await;

        let top_two = repo.best_customers(2).await.expect("best");
        assert_eq!(top_two, vec![a.clone(), b.clone()]);

        let top_ten = repo.best_customers(10).await.expect("best");
        assert_eq!(top_ten.len(), 2);
        assert!(!top_ten.contains(&c));

        let top_one = repo.best_customers(1).await.expect("best");
        assert_eq!(top_one, vec![a]);
    }

    #[tokio::test]
    async fn customer_reservations_delegates_to_reservation_store() {
        let pool = setup().await;
        let customers = SqlCustomerRepository::new(pool.clone());
        let reservations = SqlReservationRepository::new(pool.clone());

        let a = insert(&customers, "Anna", "Able").await;
        let b = insert(&customers, "Ben", "Baker").await;
        book(&pool, &a, 2).await;
        book(&pool, &b, 1).await;

        let found = customer_reservations(&reservations, &a).await.expect("reservations");
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|r| Some(r.customer_id) == a.id));
    }
}
