use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::RwLock;

use lunchly_core::domain::customer::{Customer, CustomerId};
use lunchly_core::domain::reservation::{Reservation, ReservationId};

use super::name_pattern::NamePattern;
use super::{CustomerRepository, RepositoryError, ReservationRepository};

struct Table<T> {
    rows: BTreeMap<i64, T>,
    last_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self { rows: BTreeMap::new(), last_id: 0 }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

/// Customer store backed by process memory; shares reservation data for ranking.
#[derive(Default)]
pub struct InMemoryCustomerRepository {
    customers: RwLock<Table<Customer>>,
    reservations: Arc<InMemoryReservationRepository>,
}

impl InMemoryCustomerRepository {
    pub fn with_reservations(reservations: Arc<InMemoryReservationRepository>) -> Self {
        Self { customers: RwLock::default(), reservations }
    }
}

#[async_trait::async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn all(&self) -> Result<Vec<Customer>, RepositoryError> {
        let customers = self.customers.read().await;
        let mut all: Vec<Customer> = customers.rows.values().cloned().collect();
        all.sort_by(|a, b| {
            (a.last_name.as_str(), a.first_name.as_str())
                .cmp(&(b.last_name.as_str(), b.first_name.as_str()))
        });
        Ok(all)
    }

    async fn get(&self, id: CustomerId) -> Result<Customer, RepositoryError> {
        let customers = self.customers.read().await;
        customers
            .rows
            .get(&id.0)
            .cloned()
            .ok_or(RepositoryError::NotFound { entity: "customer", id: id.0 })
    }

    async fn search(&self, search_name: &str) -> Result<Vec<Customer>, RepositoryError> {
        let pattern = NamePattern::new(search_name);
        let customers = self.customers.read().await;
        Ok(customers
            .rows
            .values()
            .filter(|customer| pattern.matches(&customer.full_name()))
            .cloned()
            .collect())
    }

    async fn best_customers(&self, list_size: u32) -> Result<Vec<Customer>, RepositoryError> {
        let counts = self.reservations.counts_by_customer().await;
        let customers = self.customers.read().await;

        let mut ranked: Vec<(usize, &Customer)> = customers
            .rows
            .iter()
            .filter_map(|(id, customer)| {
                counts.get(id).copied().filter(|count| *count > 0).map(|count| (count, customer))
            })
            .collect();
        // Stable sort keeps id order among ties.
        ranked.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(ranked.into_iter().take(list_size as usize).map(|(_, c)| c.clone()).collect())
    }

    async fn save(&self, customer: &mut Customer) -> Result<(), RepositoryError> {
        let mut customers = self.customers.write().await;
        let id = match customer.id {
            Some(id) => id.0,
            None => {
                let id = customers.next_id();
                customer.id = Some(CustomerId(id));
                id
            }
        };
        customers.rows.insert(id, customer.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryReservationRepository {
    reservations: RwLock<Table<Reservation>>,
}

impl InMemoryReservationRepository {
    async fn counts_by_customer(&self) -> HashMap<i64, usize> {
        let reservations = self.reservations.read().await;
        let mut counts = HashMap::new();
        for reservation in reservations.rows.values() {
            *counts.entry(reservation.customer_id.0).or_insert(0) += 1;
        }
        counts
    }
}

#[async_trait::async_trait]
impl ReservationRepository for InMemoryReservationRepository {
    async fn reservations_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Reservation>, RepositoryError> {
        let reservations = self.reservations.read().await;
        let mut found: Vec<Reservation> = reservations
            .rows
            .values()
            .filter(|reservation| reservation.customer_id == customer_id)
            .cloned()
            .collect();
        found.sort_by_key(|reservation| reservation.start_at);
        Ok(found)
    }

    async fn get(&self, id: ReservationId) -> Result<Reservation, RepositoryError> {
        let reservations = self.reservations.read().await;
        reservations
            .rows
            .get(&id.0)
            .cloned()
            .ok_or(RepositoryError::NotFound { entity: "reservation", id: id.0 })
    }

    async fn save(&self, reservation: &mut Reservation) -> Result<(), RepositoryError> {
        let mut reservations = self.reservations.write().await;
        let id = match reservation.id {
            Some(id) => id.0,
            None => {
                let id = reservations.next_id();
                reservation.id = Some(ReservationId(id));
                id
            }
        };
        reservations.rows.insert(id, reservation.clone());
        Ok(())
    }
}
