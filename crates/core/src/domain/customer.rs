use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::errors::DomainError;

/// Stored in place of any empty notes value.
pub const NO_NOTES_FALLBACK: &str = "THIS PERSON HAS NO NOTES";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub i64);

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Row-shaped customer data, keyed the way the store aliases its columns.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRecord {
    #[serde(default)]
    pub id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A restaurant customer.
///
/// `notes` is only reachable through [`Customer::notes`] and
/// [`Customer::set_notes`], so it can never hold an empty value.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "CustomerRecord")]
pub struct Customer {
    pub id: Option<CustomerId>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    notes: String,
}

impl Customer {
    /// Builds a transient customer; it has no id until it is saved.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        phone: Option<String>,
        notes: Option<String>,
    ) -> Self {
        let mut customer = Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone,
            notes: String::new(),
        };
        customer.set_notes(notes);
        customer
    }

    pub fn from_record(record: CustomerRecord) -> Self {
        let mut customer = Self::new(record.first_name, record.last_name, record.phone, None);
        customer.id = record.id.map(CustomerId);
        customer.set_notes(record.notes);
        customer
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn set_notes<S: Into<String>>(&mut self, notes: Option<S>) {
        self.notes = match notes.map(Into::into) {
            Some(value) if !value.is_empty() => value,
            _ => NO_NOTES_FALLBACK.to_string(),
        };
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Returns the store-assigned id, failing for a customer that was never saved.
    pub fn require_id(&self) -> Result<CustomerId, DomainError> {
        self.id.ok_or_else(|| DomainError::Transient {
            entity: "customer",
            detail: format!("`{}` has no id", self.full_name()),
        })
    }
}

impl From<CustomerRecord> for Customer {
    fn from(record: CustomerRecord) -> Self {
        Self::from_record(record)
    }
}

impl Serialize for Customer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Wire<'a> {
            id: Option<CustomerId>,
            first_name: &'a str,
            last_name: &'a str,
            full_name: String,
            phone: Option<&'a str>,
            notes: &'a str,
        }

        Wire {
            id: self.id,
            first_name: &self.first_name,
            last_name: &self.last_name,
            full_name: self.full_name(),
            phone: self.phone.as_deref(),
            notes: &self.notes,
        }
        .serialize(serializer)
    }
}
