use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::customer::CustomerId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId(pub i64);

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: Option<ReservationId>,
    pub customer_id: CustomerId,
    pub num_guests: i64,
    pub start_at: DateTime<Utc>,
    pub notes: Option<String>,
}

impl Reservation {
    pub fn new(
        customer_id: CustomerId,
        num_guests: i64,
        start_at: DateTime<Utc>,
        notes: Option<String>,
    ) -> Self {
        Self { id: None, customer_id, num_guests, start_at, notes }
    }
}
