//! Prints a customer's account statement.
//!
//! Usage:
//!   statement <customer-id> <from> <to> [json|text]
//!
//! Dates are `YYYY-MM-DD` and both ends are inclusive. The rendered document
//! is written to stdout.

use std::io::Write;
use std::sync::Arc;

use accounts_core::statement::{ReportFormat, StatementAggregator};
use accounts_db::PgLedgerStore;
use accounts_shared::AppConfig;
use accounts_shared::types::CustomerId;
use anyhow::{Context, bail};
use chrono::NaiveDate;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

struct Args {
    customer_id: CustomerId,
    from: NaiveDate,
    to: NaiveDate,
    format: ReportFormat,
}

fn parse_args(args: &[String]) -> anyhow::Result<Args> {
    let [customer_id, from, to, rest @ ..] = args else {
        bail!("usage: statement <customer-id> <from> <to> [json|text]");
    };
    let format = match rest {
        [] => ReportFormat::Json,
        [format] => format.parse()?,
        _ => bail!("unexpected trailing arguments"),
    };

    Ok(Args {
        customer_id: customer_id
            .parse()
            .with_context(|| format!("invalid customer id: {customer_id}"))?,
        from: from
            .parse()
            .with_context(|| format!("invalid start date: {from}"))?,
        to: to.parse().with_context(|| format!("invalid end date: {to}"))?,
        format,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "accounts=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let args = parse_args(&argv)?;

    let config = AppConfig::load().context("failed to load configuration")?;
    let db = accounts_db::connect_with(&config.database)
        .await
        .context("failed to connect to database")?;
    let store = Arc::new(PgLedgerStore::new(db));

    let statement = StatementAggregator::new(store)
        .build_statement(args.customer_id, args.from, args.to)
        .await?;
    let renderer = args.format.renderer();
    let bytes = renderer.render(&statement)?;

    info!(
        customer_id = %args.customer_id,
        accounts = statement.accounts.len(),
        content_type = renderer.content_type(),
        "statement rendered"
    );

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&bytes)?;
    stdout.flush()?;
    Ok(())
}
