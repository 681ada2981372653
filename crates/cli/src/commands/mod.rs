pub mod config;
pub mod customers;
pub mod migrate;
pub mod reserve;
pub mod seed;

use std::future::Future;

use lunchly_core::config::{AppConfig, ConfigError, LoadOptions};
use lunchly_core::errors::ApplicationError;
use lunchly_db::{connect_with_settings, migrations, DbPool, RepositoryError};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

/// Error class, message and exit code of a failed command step.
pub type CommandFailure = (&'static str, String, u8);

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::success_with_data(command, message, None)
    }

    pub fn success_with_data(command: &str, message: impl Into<String>, data: Option<Value>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    fn from_failure(command: &str, (error_class, message, exit_code): CommandFailure) -> Self {
        Self::failure(command, error_class, message, exit_code)
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub fn config_failure(command: &str, error: ConfigError) -> CommandResult {
    let error = ApplicationError::Configuration(error.to_string());
    CommandResult::failure(command, "config_validation", error.to_string(), 2)
}

/// Classifies a repository error the way the interface layer reports it.
pub fn repository_failure(command: &str, error: RepositoryError) -> CommandFailure {
    let interface = ApplicationError::from(error).into_interface(command);
    match interface.status_code() {
        404 => ("not_found", interface.to_string(), 7),
        400 => ("precondition", interface.to_string(), 6),
        _ => ("query", interface.to_string(), 6),
    }
}

pub fn to_data<T: Serialize>(value: &T) -> Result<Value, CommandFailure> {
    serde_json::to_value(value).map_err(|error| ("serialization", error.to_string(), 6u8))
}

/// Loads config, connects, applies migrations, then runs `op` against the pool.
pub(crate) fn with_database<T, F, Fut>(
    command: &str,
    options: LoadOptions,
    op: F,
) -> Result<T, CommandResult>
where
    F: FnOnce(DbPool) -> Fut,
    Fut: Future<Output = Result<T, CommandFailure>>,
{
    let config = AppConfig::load(options).map_err(|error| config_failure(command, error))?;

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(
        |error| {
            CommandResult::failure(
                command,
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            )
        },
    )?;

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let outcome = op(pool.clone()).await;
        pool.close().await;
        outcome
    });

    result.map_err(|failure| {
        tracing::warn!(
            event_name = "cli.command.failed",
            command,
            error_class = failure.0,
            "command failed"
        );
        CommandResult::from_failure(command, failure)
    })
}
