use chrono::{DateTime, Utc};
use sqlx::Row;
use tracing::info;

use lunchly_core::domain::customer::CustomerId;
use lunchly_core::domain::reservation::{Reservation, ReservationId};

use super::{RepositoryError, ReservationRepository};
use crate::DbPool;

pub struct SqlReservationRepository {
    pool: DbPool,
}

impl SqlReservationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_reservation(row: &sqlx::sqlite::SqliteRow) -> Result<Reservation, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let customer_id: i64 =
        row.try_get("customerId").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let num_guests: i64 =
        row.try_get("numGuests").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let start_at_str: String =
        row.try_get("startAt").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let notes: Option<String> =
        row.try_get("notes").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let start_at = DateTime::parse_from_rfc3339(&start_at_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Decode(format!("reservation {id} start_at: {e}")))?;

    Ok(Reservation {
        id: Some(ReservationId(id)),
        customer_id: CustomerId(customer_id),
        num_guests,
        start_at,
        notes,
    })
}

#[async_trait::async_trait]
impl ReservationRepository for SqlReservationRepository {
    async fn reservations_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Reservation>, RepositoryError> {
        let rows: Vec<sqlx::sqlite::SqliteRow> = sqlx::query(
            r#"SELECT id,
                      customer_id AS "customerId",
                      num_guests  AS "numGuests",
                      start_at    AS "startAt",
                      notes
               FROM reservations
               WHERE customer_id = ?
               ORDER BY start_at, id"#,
        )
        .bind(customer_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_reservation).collect::<Result<Vec<_>, _>>()
    }

    async fn get(&self, id: ReservationId) -> Result<Reservation, RepositoryError> {
        let row = sqlx::query(
            r#"SELECT id,
                      customer_id AS "customerId",
                      num_guests  AS "numGuests",
                      start_at    AS "startAt",
                      notes
               FROM reservations
               WHERE id = ?"#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => row_to_reservation(r),
            None => Err(RepositoryError::NotFound { entity: "reservation", id: id.0 }),
        }
    }

    async fn save(&self, reservation: &mut Reservation) -> Result<(), RepositoryError> {
        let start_at = reservation.start_at.to_rfc3339();

        match reservation.id {
            None => {
                let id: i64 = sqlx::query_scalar(
                    "INSERT INTO reservations (customer_id, start_at, num_guests, notes)
                     VALUES (?, ?, ?, ?)
                     RETURNING id",
                )
                .bind(reservation.customer_id.0)
                .bind(&start_at)
                .bind(reservation.num_guests)
                .bind(&reservation.notes)
                .fetch_one(&self.pool)
                .await?;

                reservation.id = Some(ReservationId(id));
                info!(
                    event_name = "db.reservation.inserted",
                    reservation_id = id,
                    customer_id = reservation.customer_id.0,
                    "reservation inserted"
                );
            }
            Some(id) => {
                sqlx::query(
                    "UPDATE reservations
                     SET customer_id = ?,
                         start_at = ?,
                         num_guests = ?,
                         notes = ?
                     WHERE id = ?",
                )
                .bind(reservation.customer_id.0)
                .bind(&start_at)
                .bind(reservation.num_guests)
                .bind(&reservation.notes)
                .bind(id.0)
                .execute(&self.pool)
                .await?;

                info!(event_name = "db.reservation.updated", reservation_id = id.0, "reservation updated");
            }
        }

        Ok(())
    }
}
