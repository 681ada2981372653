use lunchly_core::config::LoadOptions;
use lunchly_db::{CustomerSeedInfo, SeedDataset};

use crate::commands::{with_database, CommandResult};

pub fn run(options: LoadOptions) -> CommandResult {
    let result = with_database("seed", options, |pool| async move {
        let seed_result = SeedDataset::load(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;

        let verification = SeedDataset::verify(&pool)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;

        if !verification.all_present {
            let failed_checks = verification
                .checks
                .iter()
                .filter_map(|(check, passed)| (!passed).then_some(*check))
                .collect::<Vec<_>>();
            return Err(("seed_verification", verification_message(&failed_checks), 6u8));
        }

        Ok(SeedOutput {
            customers: seed_result.customers_seeded,
            reservations: seed_result.reservations_seeded,
        })
    });

    match result {
        Ok(output) => {
            let customer_lines: Vec<String> = output
                .customers
                .iter()
                .map(|c| format!("  - {}: {} ({} reservations)", c.id, c.full_name, c.reservation_count))
                .collect();
            let message = format!(
                "seed dataset loaded: {} customers, {} reservations:\n{}",
                output.customers.len(),
                output.reservations,
                customer_lines.join("\n")
            );
            CommandResult::success("seed", message)
        }
        Err(result) => result,
    }
}

fn verification_message(failed_checks: &[&str]) -> String {
    if failed_checks.is_empty() {
        "Some seed data failed to load".to_string()
    } else {
        format!("Seed verification failed for checks: {}", failed_checks.join(", "))
    }
}

struct SeedOutput {
    customers: Vec<CustomerSeedInfo>,
    reservations: i64,
}

#[cfg(test)]
mod tests {
    use super::verification_message;

    #[test]
    fn verification_error_message_targets_failed_checks() {
        let message = verification_message(&["customer-2-notes", "reservations-total"]);

        assert_eq!(
            message,
            "Seed verification failed for checks: customer-2-notes, reservations-total"
        );
    }

    #[test]
    fn verification_error_message_falls_back_to_generic_when_no_labels() {
        assert_eq!(verification_message(&[]), "Some seed data failed to load");
    }
}
