//! Statement error types.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use accounts_shared::AppError;

use crate::store::StoreError;

/// Errors that can occur while building or rendering a statement.
#[derive(Debug, Error)]
pub enum StatementError {
    /// Customer not found.
    #[error("Customer not found: {0}")]
    CustomerNotFound(Uuid),

    /// Invalid date range.
    #[error("Invalid date range: start {from} is after end {to}")]
    InvalidRange {
        /// Start date.
        from: NaiveDate,
        /// End date.
        to: NaiveDate,
    },

    /// Unknown report format.
    #[error("Unsupported report format: {0}")]
    UnsupportedFormat(String),

    /// Rendering failed.
    #[error("Failed to render statement: {0}")]
    Render(String),

    /// Store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl StatementError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::CustomerNotFound(_) => "CUSTOMER_NOT_FOUND",
            Self::InvalidRange { .. } => "INVALID_RANGE",
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::Render(_) => "RENDER_ERROR",
            Self::Store(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::UnsupportedFormat(_) => 400,
            Self::CustomerNotFound(_) => 404,
            Self::InvalidRange { .. } => 422,
            Self::Render(_) | Self::Store(_) => 500,
        }
    }
}

impl From<StatementError> for AppError {
    fn from(err: StatementError) -> Self {
        let message = err.to_string();
        match err {
            StatementError::CustomerNotFound(_) => Self::NotFound(message),
            StatementError::InvalidRange { .. } => Self::BusinessRule(message),
            StatementError::UnsupportedFormat(_) => Self::Validation(message),
            StatementError::Render(_) => Self::Internal(message),
            StatementError::Store(_) => Self::Database(message),
        }
    }
}
