//! Customer statements over a date range.
//!
//! The aggregator reads accounts and movements and folds them into a
//! [`Statement`] value; renderers encode that value into a document.

mod error;
mod render;
mod service;
mod types;


pub use error::StatementError;
pub use render::{JsonRenderer, ReportFormat, ReportRenderer, TextRenderer};
pub use service::{StatementAggregator, day_bounds};
pub use types::{AccountStatement, DateRange, Statement, StatementCustomer, StatementTotals};
