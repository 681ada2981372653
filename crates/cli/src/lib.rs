pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use lunchly_core::config::{AppConfig, LoadOptions, LogFormat};

use crate::commands::customers::CustomersCommand;
use crate::commands::reserve::ReserveArgs;

#[derive(Debug, Parser)]
#[command(
    name = "lunchly",
    about = "Lunchly customer store CLI",
    long_about = "Manage Lunchly customers and reservations: migrations, fixtures, lookups and edits.",
    after_help = "Examples:\n  lunchly migrate\n  lunchly customers search --name smi\n  lunchly customers best --limit 5"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a lunchly.toml config file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the deterministic customer/reservation fixtures")]
    Seed,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(subcommand, about = "Look up, search, rank and edit customers")]
    Customers(CustomersCommand),
    #[command(about = "Book a reservation for an existing customer")]
    Reserve {
        #[arg(long)]
        customer_id: i64,
        #[arg(long, help = "RFC 3339 timestamp, e.g. 2026-03-01T19:30:00Z")]
        start_at: String,
        #[arg(long, default_value_t = 2)]
        num_guests: i64,
        #[arg(long)]
        notes: Option<String>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = LoadOptions { config_path: cli.config, ..LoadOptions::default() };

    if let Ok(config) = AppConfig::load(options.clone()) {
        if let Err(error) = init_logging(&config) {
            eprintln!("lunchly: logging disabled: {error}");
        }
    }

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(options),
        Command::Seed => commands::seed::run(options),
        Command::Config => commands::config::run(options),
        Command::Customers(command) => commands::customers::run(options, command),
        Command::Reserve { customer_id, start_at, num_guests, notes } => {
            commands::reserve::run(options, ReserveArgs { customer_id, start_at, num_guests, notes })
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Logs go to stderr; stdout carries the JSON command outcome.
fn init_logging(config: &AppConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
}
