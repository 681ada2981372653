use chrono::{DateTime, Utc};
use lunchly_core::config::LoadOptions;
use lunchly_core::domain::customer::CustomerId;
use lunchly_core::domain::reservation::Reservation;
use lunchly_db::{CustomerRepository, ReservationRepository, SqlCustomerRepository, SqlReservationRepository};

use crate::commands::{repository_failure, to_data, with_database, CommandResult};

pub struct ReserveArgs {
    pub customer_id: i64,
    pub start_at: String,
    pub num_guests: i64,
    pub notes: Option<String>,
}

pub fn run(options: LoadOptions, args: ReserveArgs) -> CommandResult {
    let start_at = match parse_start_at(&args.start_at) {
        Ok(start_at) => start_at,
        Err(message) => return CommandResult::failure("reserve", "invalid_argument", message, 2),
    };

    let result = with_database("reserve", options, |pool| async move {
        let failed = |error| repository_failure("reserve", error);

        let customer_id = CustomerId(args.customer_id);
        let customer =
            SqlCustomerRepository::new(pool.clone()).get(customer_id).await.map_err(failed)?;

        let mut reservation = Reservation::new(customer_id, args.num_guests, start_at, args.notes);
        SqlReservationRepository::new(pool).save(&mut reservation).await.map_err(failed)?;

        Ok((format!("reserved for {}", customer.full_name()), to_data(&reservation)?))
    });

    match result {
        Ok((message, data)) => CommandResult::success_with_data("reserve", message, Some(data)),
        Err(result) => result,
    }
}

fn parse_start_at(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|error| format!("--start-at must be an RFC 3339 timestamp: {error}"))
}
