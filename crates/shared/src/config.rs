//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Ledger business limits and allocation policy.
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// How new account numbers are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountNumberPolicy {
    /// Highest existing numeric account number plus one.
    #[default]
    Numeric,
    /// Random fixed-width numeric account number.
    Random,
}

/// Ledger configuration, one value per deployment.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Maximum sum of debits per account per calendar day.
    #[serde(default = "default_daily_withdrawal_limit")]
    pub daily_withdrawal_limit: Decimal,
    /// Account number generation policy.
    #[serde(default)]
    pub account_number_policy: AccountNumberPolicy,
    /// Attempts before account number allocation gives up.
    #[serde(default = "default_allocation_attempts")]
    pub allocation_attempts: u32,
    /// First number handed out by the numeric policy.
    #[serde(default = "default_numeric_start")]
    pub numeric_start: u64,
}

fn default_daily_withdrawal_limit() -> Decimal {
    Decimal::from(1000)
}

fn default_allocation_attempts() -> u32 {
    10
}

fn default_numeric_start() -> u64 {
    100_000
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            daily_withdrawal_limit: default_daily_withdrawal_limit(),
            account_number_policy: AccountNumberPolicy::default(),
            allocation_attempts: default_allocation_attempts(),
            numeric_start: default_numeric_start(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("ACCOUNTS").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
