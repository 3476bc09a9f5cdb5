//! Unique account number allocation.
//!
//! The allocator proposes candidates from a [`NumberGenerator`] and checks each
//! against the store, giving up after a fixed number of attempts. The check and
//! the later insert are not atomic; the store's unique constraint is the final
//! word at commit time.

use std::sync::Arc;

use accounts_shared::{AccountNumberPolicy, LedgerConfig};
use rand::Rng;
use tracing::{debug, warn};

use crate::ledger::LedgerError;
use crate::store::StoreTx;

/// Source of candidate account numbers.
pub trait NumberGenerator: Send + Sync {
    /// Proposes a candidate given every existing number and the zero-based attempt.
    fn propose(&self, existing: &[String], attempt: u32) -> String;

    /// Whether `propose` reads the existing numbers.
    fn needs_existing(&self) -> bool {
        true
    }
}

/// Monotonic policy: highest existing number plus one.
///
/// Non-numeric numbers count as zero, so a store holding only non-numeric
/// numbers yields `1` rather than `start`. Only an empty store yields `start`.
#[derive(Debug, Clone, Copy)]
pub struct NumericGenerator {
    start: u64,
}

impl NumericGenerator {
    /// Creates a generator that begins at `start` on an empty store.
    #[must_use]
    pub const fn new(start: u64) -> Self {
        Self { start }
    }

    fn base(&self, existing: &[String]) -> u64 {
        existing
            .iter()
            .map(|n| n.parse::<u64>().unwrap_or(0))
            .max()
            .map_or(self.start, |max| max.saturating_add(1))
    }
}

impl NumberGenerator for NumericGenerator {
    fn propose(&self, existing: &[String], attempt: u32) -> String {
        self.base(existing)
            .saturating_add(u64::from(attempt))
            .to_string()
    }
}

/// Random six-digit numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomGenerator;

impl NumberGenerator for RandomGenerator {
    fn propose(&self, _existing: &[String], _attempt: u32) -> String {
        rand::rng().random_range(100_000u32..1_000_000).to_string()
    }

    fn needs_existing(&self) -> bool {
        false
    }
}

/// Allocates account numbers unique among existing accounts.
#[derive(Clone)]
pub struct AccountNumberAllocator {
    generator: Arc<dyn NumberGenerator>,
    max_attempts: u32,
}

impl AccountNumberAllocator {
    /// Creates an allocator over `generator`.
    pub fn new(generator: Arc<dyn NumberGenerator>, max_attempts: u32) -> Self {
        Self {
            generator,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Builds the allocator selected by the ledger configuration.
    #[must_use]
    pub fn from_config(config: &LedgerConfig) -> Self {
        let generator: Arc<dyn NumberGenerator> = match config.account_number_policy {
            AccountNumberPolicy::Numeric => Arc::new(NumericGenerator::new(config.numeric_start)),
            AccountNumberPolicy::Random => Arc::new(RandomGenerator),
        };
        Self::new(generator, config.allocation_attempts)
    }

    /// Returns a number no existing account carries.
    pub async fn allocate<T: StoreTx>(&self, tx: &mut T) -> Result<String, LedgerError> {
        let existing = if self.generator.needs_existing() {
            tx.list_account_numbers().await?
        } else {
            Vec::new()
        };

        for attempt in 0..self.max_attempts {
            let candidate = self.generator.propose(&existing, attempt);
            if !tx.account_exists_by_number(&candidate).await? {
                return Ok(candidate);
            }
            debug!(%candidate, attempt, "account number collision");
        }

        warn!(attempts = self.max_attempts, "account number allocation exhausted");
        Err(LedgerError::AllocationExhausted {
            attempts: self.max_attempts,
        })
    }
}
