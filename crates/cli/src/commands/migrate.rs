use lunchly_core::config::LoadOptions;

use crate::commands::{with_database, CommandResult};

pub fn run(options: LoadOptions) -> CommandResult {
    // Migrations are applied while the database is opened; nothing else to do here.
    match with_database("migrate", options, |_pool| async { Ok(()) }) {
        Ok(()) => CommandResult::success("migrate", "applied pending migrations"),
        Err(result) => result,
    }
}
