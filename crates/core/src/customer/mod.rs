//! Customer registry.

mod service;
mod types;

pub use service::CustomerService;
pub use types::{Customer, CustomerPatch, NewCustomer};
