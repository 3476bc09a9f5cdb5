//! Statement renderers.
//!
//! A renderer turns a [`Statement`] into an opaque byte document. The
//! aggregator never depends on a renderer's layout.

use std::fmt::Write as _;
use std::str::FromStr;

use super::error::StatementError;
use super::types::{AccountStatement, Statement};

/// Encodes a statement into a document.
pub trait ReportRenderer: Send + Sync {
    /// MIME type of the produced document.
    fn content_type(&self) -> &'static str;

    /// Renders `statement`.
    fn render(&self, statement: &Statement) -> Result<Vec<u8>, StatementError>;
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// JSON document.
    Json,
    /// Plain-text account statement.
    Text,
}

impl ReportFormat {
    /// Renderer for this format.
    #[must_use]
    pub fn renderer(self) -> Box<dyn ReportRenderer> {
        match self {
            Self::Json => Box::new(JsonRenderer),
            Self::Text => Box::new(TextRenderer),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = StatementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "txt" => Ok(Self::Text),
            _ => Err(StatementError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Pretty-printed JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl ReportRenderer for JsonRenderer {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn render(&self, statement: &Statement) -> Result<Vec<u8>, StatementError> {
        serde_json::to_vec_pretty(statement).map_err(|e| StatementError::Render(e.to_string()))
    }
}

/// Fixed-width plain text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl TextRenderer {
    fn write_statement(out: &mut String, statement: &Statement) -> std::fmt::Result {
        writeln!(out, "ACCOUNT STATEMENT")?;
        writeln!(
            out,
            "Customer: {} ({})",
            statement.customer.name, statement.customer.identification
        )?;
        writeln!(
            out,
            "Period:   {} to {}",
            statement.range.from, statement.range.to
        )?;
        for account in &statement.accounts {
            Self::write_account(out, account)?;
        }
        Ok(())
    }

    fn write_account(out: &mut String, account: &AccountStatement) -> std::fmt::Result {
        writeln!(out)?;
        writeln!(
            out,
            "Account {} ({}){}",
            account.number,
            account.kind,
            if account.is_active { "" } else { " [inactive]" }
        )?;
        writeln!(
            out,
            "  Initial balance: {:>12}   Current balance: {:>12}",
            account.initial_balance, account.current_balance
        )?;

        if account.movements.is_empty() {
            writeln!(out, "  No movements in period")?;
        } else {
            writeln!(
                out,
                "  {:<19}  {:<6}  {:>12}  {:>12}  Description",
                "Date", "Kind", "Amount", "Balance"
            )?;
            for m in &account.movements {
                writeln!(
                    out,
                    "  {:<19}  {:<6}  {:>12}  {:>12}  {}",
                    m.occurred_at.format("%Y-%m-%d %H:%M:%S"),
                    m.kind,
                    m.amount,
                    m.balance,
                    m.description
                )?;
            }
        }

        writeln!(out, "  Total credits: {:>12}", account.totals.credits)?;
        writeln!(out, "  Total debits:  {:>12}", account.totals.debits)
    }
}

impl ReportRenderer for TextRenderer {
    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn render(&self, statement: &Statement) -> Result<Vec<u8>, StatementError> {
        let mut out = String::new();
        Self::write_statement(&mut out, statement)
            .map_err(|e| StatementError::Render(e.to_string()))?;
        Ok(out.into_bytes())
    }
}
