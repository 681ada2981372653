use clap::Subcommand;
use lunchly_core::config::LoadOptions;
use lunchly_core::domain::customer::{Customer, CustomerId};
use lunchly_db::{
    customer_reservations, CustomerRepository, SqlCustomerRepository, SqlReservationRepository,
    DEFAULT_BEST_CUSTOMER_LIMIT,
};

use crate::commands::{repository_failure, to_data, with_database, CommandResult};

#[derive(Debug, Subcommand)]
pub enum CustomersCommand {
    #[command(about = "List every customer ordered by last name, then first name")]
    List,
    #[command(about = "Show one customer by id")]
    Get {
        #[arg(long)]
        id: i64,
    },
    #[command(about = "Case-insensitive search over `first last` names")]
    Search {
        #[arg(long, default_value = "", help = "Substring to look for; empty matches everyone")]
        name: String,
    },
    #[command(about = "Customers with the most reservations")]
    Best {
        #[arg(long, default_value_t = DEFAULT_BEST_CUSTOMER_LIMIT)]
        limit: u32,
    },
    #[command(about = "Create a customer")]
    Add {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    #[command(about = "Change fields of an existing customer and save it")]
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long, help = "New notes; an empty value resets them to the default text")]
        notes: Option<String>,
    },
    #[command(about = "List a customer's reservations")]
    Reservations {
        #[arg(long)]
        id: i64,
    },
}

pub fn run(options: LoadOptions, command: CustomersCommand) -> CommandResult {
    let result = with_database("customers", options, |pool| async move {
        let customers = SqlCustomerRepository::new(pool.clone());
        let failed = |error| repository_failure("customers", error);

        match command {
            CustomersCommand::List => {
                let all = customers.all().await.map_err(failed)?;
                Ok((format!("{} customers", all.len()), to_data(&all)?))
            }
            CustomersCommand::Get { id } => {
                let customer = customers.get(CustomerId(id)).await.map_err(failed)?;
                Ok((customer.full_name(), to_data(&customer)?))
            }
            CustomersCommand::Search { name } => {
                let found = customers.search(&name).await.map_err(failed)?;
                Ok((format!("{} customers match `{name}`", found.len()), to_data(&found)?))
            }
            CustomersCommand::Best { limit } => {
                let best = customers.best_customers(limit).await.map_err(failed)?;
                Ok((format!("top {} customers by reservations", best.len()), to_data(&best)?))
            }
            CustomersCommand::Add { first_name, last_name, phone, notes } => {
                let mut customer = Customer::new(first_name, last_name, phone, notes);
                customers.save(&mut customer).await.map_err(failed)?;
                Ok((format!("added {}", customer.full_name()), to_data(&customer)?))
            }
            CustomersCommand::Update { id, first_name, last_name, phone, notes } => {
                let mut customer = customers.get(CustomerId(id)).await.map_err(failed)?;
                if let Some(first_name) = first_name {
                    customer.first_name = first_name;
                }
                if let Some(last_name) = last_name {
                    customer.last_name = last_name;
                }
                if let Some(phone) = phone {
                    customer.phone = Some(phone);
                }
                if notes.is_some() {
                    customer.set_notes(notes);
                }
                customers.save(&mut customer).await.map_err(failed)?;
                Ok((format!("updated {}", customer.full_name()), to_data(&customer)?))
            }
            CustomersCommand::Reservations { id } => {
                let customer = customers.get(CustomerId(id)).await.map_err(failed)?;
                let reservations = SqlReservationRepository::new(pool);
                let found =
                    customer_reservations(&reservations, &customer).await.map_err(failed)?;
                Ok((
                    format!("{} reservations for {}", found.len(), customer.full_name()),
                    to_data(&found)?,
                ))
            }
        }
    });

    match result {
        Ok((message, data)) => CommandResult::success_with_data("customers", message, Some(data)),
        Err(result) => result,
    }
}
