//! `SeaORM` entities.

pub mod accounts;
pub mod customers;
pub mod movements;
