//! Customer domain types.

use accounts_shared::types::CustomerId;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A registered customer. Owns zero or more accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Unique identifier.
    pub id: CustomerId,
    /// Full name.
    pub name: String,
    /// Gender as declared at registration.
    pub gender: String,
    /// Age in years.
    pub age: u16,
    /// National identification code, unique across customers.
    pub identification: String,
    /// Postal address.
    pub address: String,
    /// Contact phone number.
    pub phone: String,
    /// Whether the customer is active.
    pub is_active: bool,
    /// Registration timestamp.
    pub created_at: NaiveDateTime,
    /// Last modification timestamp.
    pub updated_at: NaiveDateTime,
}

/// Input for registering a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    /// Full name.
    pub name: String,
    /// Gender.
    pub gender: String,
    /// Age in years.
    pub age: u16,
    /// National identification code.
    pub identification: String,
    /// Postal address.
    pub address: String,
    /// Contact phone number.
    pub phone: String,
    /// Whether the customer starts active.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Partial update of a customer. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerPatch {
    /// New name.
    pub name: Option<String>,
    /// New gender.
    pub gender: Option<String>,
    /// New age.
    pub age: Option<u16>,
    /// New identification code.
    pub identification: Option<String>,
    /// New address.
    pub address: Option<String>,
    /// New phone number.
    pub phone: Option<String>,
    /// New status.
    pub is_active: Option<bool>,
}

impl Customer {
    /// Builds a customer from registration input.
    #[must_use]
    pub fn register(input: NewCustomer, now: NaiveDateTime) -> Self {
        Self {
            id: CustomerId::new(),
            name: input.name,
            gender: input.gender,
            age: input.age,
            identification: input.identification,
            address: input.address,
            phone: input.phone,
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces every mutable field with `input`.
    pub fn replace(&mut self, input: NewCustomer, now: NaiveDateTime) {
        self.name = input.name;
        self.gender = input.gender;
        self.age = input.age;
        self.identification = input.identification;
        self.address = input.address;
        self.phone = input.phone;
        self.is_active = input.is_active;
        self.updated_at = now;
    }

    /// Applies the fields present in `patch`.
    pub fn apply(&mut self, patch: CustomerPatch, now: NaiveDateTime) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(gender) = patch.gender {
            self.gender = gender;
        }
        if let Some(age) = patch.age {
            self.age = age;
        }
        if let Some(identification) = patch.identification {
            self.identification = identification;
        }
        if let Some(address) = patch.address {
            self.address = address;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        self.updated_at = now;
    }

    /// Case-insensitive match on name or identification.
    #[must_use]
    pub fn matches(&self, search: &str) -> bool {
        let needle = search.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.identification.to_lowercase().contains(&needle)
    }
}
