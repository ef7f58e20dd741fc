mod amount;
mod date;
mod error;
mod fingerprint;
pub mod pricing;

use serde::{Deserialize, Serialize};

pub use amount::{Usd, format_cost};
pub use date::{DayRange, UsageDate};
pub use error::{AmountError, CostError, RangeError};
pub use fingerprint::{CredentialFingerprint, FINGERPRINT_LEN};
pub use pricing::{
    CostBreakdown, MatchKind, PriceInput, PricingEntry, PricingMatch, PricingTable, Rates,
    calculate_cost,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCounts {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_read_tokens: u64,
    pub cache_creation_tokens: u64,
}

impl TokenCounts {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
            ..Self::default()
        }
    }

    pub fn with_cache(mut self, cache_read_tokens: u64, cache_creation_tokens: u64) -> Self {
        self.cache_read_tokens = cache_read_tokens;
        self.cache_creation_tokens = cache_creation_tokens;
        self
    }

    pub fn add(self, other: TokenCounts) -> TokenCounts {
        TokenCounts {
            input_tokens: self.input_tokens.saturating_add(other.input_tokens),
            output_tokens: self.output_tokens.saturating_add(other.output_tokens),
            cache_read_tokens: self.cache_read_tokens.saturating_add(other.cache_read_tokens),
            cache_creation_tokens: self
                .cache_creation_tokens
                .saturating_add(other.cache_creation_tokens),
        }
    }

    pub fn total(&self) -> u64 {
        self.input_tokens
            .saturating_add(self.output_tokens)
            .saturating_add(self.cache_read_tokens)
            .saturating_add(self.cache_creation_tokens)
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Usage to add to one ledger row.
///
/// Built from the raw credential, which is fingerprinted immediately and
/// never kept.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageDelta {
    pub date: UsageDate,
    pub provider: String,
    pub credential: CredentialFingerprint,
    pub model: String,
    pub tokens: TokenCounts,
    pub cost: Usd,
}

impl UsageDelta {
    pub fn new(
        date: UsageDate,
        provider: impl Into<String>,
        credential: &str,
        model: impl Into<String>,
        tokens: TokenCounts,
        cost: Usd,
    ) -> Self {
        Self {
            date,
            provider: provider.into(),
            credential: CredentialFingerprint::of(credential),
            model: model.into(),
            tokens,
            cost,
        }
    }
}

/// One stored ledger row, identified by (date, provider, credential, model).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageRecord {
    pub date: UsageDate,
    pub provider: String,
    pub credential: CredentialFingerprint,
    pub model: String,
    pub tokens: TokenCounts,
    pub cost: Usd,
}

/// Usage summed over credentials for one (date, provider, model).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageRow {
    pub date: UsageDate,
    pub provider: String,
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_read_tokens: u64,
    pub cache_creation_tokens: u64,
    pub cost: Usd,
}

impl UsageRow {
    pub fn tokens(&self) -> TokenCounts {
        TokenCounts {
            input_tokens: self.input_tokens,
            output_tokens: self.output_tokens,
            cache_read_tokens: self.cache_read_tokens,
            cache_creation_tokens: self.cache_creation_tokens,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCost {
    pub date: UsageDate,
    pub cost: Usd,
}
