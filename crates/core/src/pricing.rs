//! Static model pricing and the cost calculator.
//!
//! Prices are published per million tokens and kept here per token. A model
//! id resolves to an exact entry first, then to the longest entry that is a
//! prefix of it at a `-`, `@` or `:` boundary, so dated snapshots such as
//! `claude-3-opus-20240229` bill at their base model rate.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::TokenCounts;
use crate::amount::Usd;
use crate::error::CostError;

const TOKENS_PER_MILLION: f64 = 1_000_000.0;
const NANOS_PER_DOLLAR: f64 = 1_000_000_000.0;

/// (model, input, output, cache read, cache write) in USD per million tokens.
const BUILTIN_PRICES: &[(&str, f64, f64, f64, f64)] = &[
    // Anthropic
    ("claude-opus-4", 15.0, 75.0, 1.5, 18.75),
    ("claude-sonnet-4", 3.0, 15.0, 0.3, 3.75),
    ("claude-3-7-sonnet", 3.0, 15.0, 0.3, 3.75),
    ("claude-3-5-sonnet", 3.0, 15.0, 0.3, 3.75),
    ("claude-3-5-haiku", 0.8, 4.0, 0.08, 1.0),
    ("claude-3-opus", 15.0, 75.0, 1.5, 18.75),
    ("claude-3-sonnet", 3.0, 15.0, 0.3, 3.75),
    ("claude-3-haiku", 0.25, 1.25, 0.03, 0.3),
    // OpenAI
    ("gpt-4.1", 2.0, 8.0, 0.5, 0.0),
    ("gpt-4.1-mini", 0.4, 1.6, 0.1, 0.0),
    ("gpt-4o", 2.5, 10.0, 1.25, 0.0),
    ("gpt-4o-mini", 0.15, 0.6, 0.075, 0.0),
    ("gpt-4-turbo", 10.0, 30.0, 0.0, 0.0),
    ("gpt-4", 30.0, 60.0, 0.0, 0.0),
    ("gpt-3.5-turbo", 0.5, 1.5, 0.0, 0.0),
    ("o1", 15.0, 60.0, 7.5, 0.0),
    ("o1-mini", 3.0, 12.0, 1.5, 0.0),
    ("o3-mini", 1.1, 4.4, 0.55, 0.0),
];

/// USD per single token for each billed token category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rates {
    pub input: f64,
    pub output: f64,
    pub cache_read: f64,
    pub cache_write: f64,
}

/// Pricing as published, per million tokens. Providers without prompt
/// caching leave the cache rates out; they bill as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceInput {
    pub model: String,
    pub input_per_1m: f64,
    pub output_per_1m: f64,
    #[serde(default)]
    pub cache_read_per_1m: Option<f64>,
    #[serde(default)]
    pub cache_write_per_1m: Option<f64>,
}

impl PriceInput {
    pub fn rates(&self) -> Rates {
        Rates {
            input: self.input_per_1m / TOKENS_PER_MILLION,
            output: self.output_per_1m / TOKENS_PER_MILLION,
            cache_read: self.cache_read_per_1m.unwrap_or(0.0) / TOKENS_PER_MILLION,
            cache_write: self.cache_write_per_1m.unwrap_or(0.0) / TOKENS_PER_MILLION,
        }
    }

    fn is_valid(&self) -> bool {
        let values = [
            Some(self.input_per_1m),
            Some(self.output_per_1m),
            self.cache_read_per_1m,
            self.cache_write_per_1m,
        ];
        !self.model.trim().is_empty()
            && values
                .into_iter()
                .flatten()
                .all(|value| value.is_finite() && value >= 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingEntry {
    pub model: String,
    pub rates: Rates,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Prefix,
}

#[derive(Debug, Clone, Copy)]
pub struct PricingMatch<'a> {
    pub entry: &'a PricingEntry,
    pub kind: MatchKind,
}

/// Per-category cost of one usage line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CostBreakdown {
    pub input: Usd,
    pub output: Usd,
    pub cache_read: Usd,
    pub cache_write: Usd,
    pub total: Usd,
}

/// Immutable lookup from model id to rates.
#[derive(Debug, Clone, Default)]
pub struct PricingTable {
    entries: BTreeMap<String, PricingEntry>,
}

impl PricingTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut table = Self::empty();
        for (model, input, output, cache_read, cache_write) in BUILTIN_PRICES {
            table.put(&PriceInput {
                model: (*model).to_string(),
                input_per_1m: *input,
                output_per_1m: *output,
                cache_read_per_1m: Some(*cache_read),
                cache_write_per_1m: Some(*cache_write),
            });
        }
        table
    }

    /// Built-in prices with `overrides` replacing or adding entries.
    pub fn with_overrides(overrides: &[PriceInput]) -> Result<Self, CostError> {
        let mut table = Self::builtin();
        for input in overrides {
            table.insert(input)?;
        }
        Ok(table)
    }

    pub fn insert(&mut self, input: &PriceInput) -> Result<(), CostError> {
        if !input.is_valid() {
            return Err(CostError::InvalidRate {
                model: input.model.clone(),
            });
        }
        self.put(input);
        Ok(())
    }

    fn put(&mut self, input: &PriceInput) {
        let key = normalize_model(&input.model);
        self.entries.insert(
            key.clone(),
            PricingEntry {
                model: key,
                rates: input.rates(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &PricingEntry> {
        self.entries.values()
    }

    pub fn lookup(&self, model: &str) -> Option<&PricingEntry> {
        self.resolve(model).map(|found| found.entry)
    }

    pub fn resolve(&self, model: &str) -> Option<PricingMatch<'_>> {
        let model = normalize_model(model);
        if let Some(entry) = self.entries.get(&model) {
            return Some(PricingMatch {
                entry,
                kind: MatchKind::Exact,
            });
        }
        self.entries
            .iter()
            .filter(|(key, _)| is_prefix_at_boundary(key, &model))
            .max_by_key(|(key, _)| key.len())
            .map(|(_, entry)| PricingMatch {
                entry,
                kind: MatchKind::Prefix,
            })
    }

    pub fn is_priced(&self, model: &str) -> bool {
        self.resolve(model).is_some()
    }

    pub fn calculate_cost(&self, model: &str, tokens: &TokenCounts) -> Result<Usd, CostError> {
        self.cost_breakdown(model, tokens)
            .map(|breakdown| breakdown.total)
    }

    pub fn cost_breakdown(
        &self,
        model: &str,
        tokens: &TokenCounts,
    ) -> Result<CostBreakdown, CostError> {
        let entry = self.lookup(model).ok_or_else(|| CostError::UnknownPricing {
            model: model.to_string(),
        })?;
        Ok(cost_from_rates(&entry.rates, tokens))
    }
}

pub fn cost_from_rates(rates: &Rates, tokens: &TokenCounts) -> CostBreakdown {
    let input = token_cost(tokens.input_tokens, rates.input);
    let output = token_cost(tokens.output_tokens, rates.output);
    let cache_read = token_cost(tokens.cache_read_tokens, rates.cache_read);
    let cache_write = token_cost(tokens.cache_creation_tokens, rates.cache_write);
    CostBreakdown {
        input,
        output,
        cache_read,
        cache_write,
        total: input + output + cache_read + cache_write,
    }
}

fn token_cost(tokens: u64, rate: f64) -> Usd {
    // Float to int casts saturate, so absurd counts clamp instead of wrapping.
    Usd::from_nanos((tokens as f64 * rate * NANOS_PER_DOLLAR).round() as u64)
}

fn normalize_model(model: &str) -> String {
    model.trim().to_ascii_lowercase()
}

fn is_prefix_at_boundary(prefix: &str, model: &str) -> bool {
    model.len() > prefix.len()
        && model.starts_with(prefix)
        && matches!(model.as_bytes()[prefix.len()], b'-' | b'@' | b':')
}

static PRICING: OnceLock<PricingTable> = OnceLock::new();

/// Installs the process-wide table. Only the first call wins; the rejected
/// table is handed back.
pub fn install(table: PricingTable) -> Result<(), PricingTable> {
    PRICING.set(table)
}

/// The process-wide table, falling back to the built-in prices when
/// nothing was installed at startup.
pub fn global() -> &'static PricingTable {
    PRICING.get_or_init(PricingTable::builtin)
}

/// Cost of a usage line at the process-wide prices.
pub fn calculate_cost(model: &str, tokens: &TokenCounts) -> Result<Usd, CostError> {
    global().calculate_cost(model, tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: u64, output: u64, cache_read: u64, cache_creation: u64) -> TokenCounts {
        TokenCounts {
            input_tokens: input,
            output_tokens: output,
            cache_read_tokens: cache_read,
            cache_creation_tokens: cache_creation,
        }
    }

    #[test]
    fn exact_match_prices_all_categories() {
        let table = PricingTable::builtin();
        let cost = table
            .cost_breakdown("claude-3-opus", &tokens(1_000, 500, 2_000, 400))
            .expect("priced");
        assert_eq!(cost.input, Usd::from_dollars(0.015).expect("amount"));
        assert_eq!(cost.output, Usd::from_dollars(0.0375).expect("amount"));
        assert_eq!(cost.cache_read, Usd::from_dollars(0.003).expect("amount"));
        assert_eq!(cost.cache_write, Usd::from_dollars(0.0075).expect("amount"));
        assert_eq!(cost.total, Usd::from_dollars(0.063).expect("amount"));
    }

    #[test]
    fn dated_snapshot_resolves_to_base_rate() {
        let mut table = PricingTable::empty();
        table
            .insert(&PriceInput {
                model: "claude-3-opus".to_string(),
                input_per_1m: 15.0,
                output_per_1m: 75.0,
                cache_read_per_1m: None,
                cache_write_per_1m: None,
            })
            .expect("insert");
        let found = table.resolve("claude-3-opus-20240229").expect("prefix match");
        assert_eq!(found.kind, MatchKind::Prefix);
        assert_eq!(found.entry.model, "claude-3-opus");
        let usage = tokens(1_000, 500, 0, 0);
        assert_eq!(
            table.calculate_cost("claude-3-opus-20240229", &usage),
            table.calculate_cost("claude-3-opus", &usage)
        );
    }

    #[test]
    fn longest_prefix_wins() {
        let table = PricingTable::builtin();
        let mini = table.lookup("gpt-4o-mini-2024-07-18").expect("priced");
        assert_eq!(mini.model, "gpt-4o-mini");
        let turbo = table.lookup("gpt-4-turbo-2024-04-09").expect("priced");
        assert_eq!(turbo.model, "gpt-4-turbo");
        let base = table.lookup("gpt-4-0613").expect("priced");
        assert_eq!(base.model, "gpt-4");
    }

    #[test]
    fn prefix_requires_a_boundary() {
        let mut table = PricingTable::empty();
        table
            .insert(&PriceInput {
                model: "gpt-4".to_string(),
                input_per_1m: 30.0,
                output_per_1m: 60.0,
                cache_read_per_1m: None,
                cache_write_per_1m: None,
            })
            .expect("insert");
        assert!(table.lookup("gpt-4o").is_none());
        assert!(table.lookup("gpt-4.5-preview").is_none());
        assert!(table.lookup("gpt-4-0314").is_some());
    }

    #[test]
    fn unknown_model_is_not_zero_cost() {
        let table = PricingTable::builtin();
        let result = table.calculate_cost("totally-unknown-model-xyz", &tokens(100, 100, 0, 0));
        assert_eq!(
            result,
            Err(CostError::UnknownPricing {
                model: "totally-unknown-model-xyz".to_string()
            })
        );
    }

    #[test]
    fn missing_cache_rates_bill_as_zero() {
        let mut table = PricingTable::empty();
        table
            .insert(&PriceInput {
                model: "local-model".to_string(),
                input_per_1m: 1.0,
                output_per_1m: 2.0,
                cache_read_per_1m: None,
                cache_write_per_1m: None,
            })
            .expect("insert");
        let cost = table
            .cost_breakdown("local-model", &tokens(1_000_000, 0, 5_000, 5_000))
            .expect("priced");
        assert_eq!(cost.cache_read, Usd::ZERO);
        assert_eq!(cost.cache_write, Usd::ZERO);
        assert_eq!(cost.total, Usd::from_dollars(1.0).expect("amount"));
    }

    #[test]
    fn lookup_ignores_case_and_whitespace() {
        let table = PricingTable::builtin();
        assert!(table.is_priced(" Claude-3-Haiku-20240307 "));
    }

    #[test]
    fn overrides_replace_builtin_rates() {
        let table = PricingTable::with_overrides(&[PriceInput {
            model: "gpt-4o".to_string(),
            input_per_1m: 5.0,
            output_per_1m: 15.0,
            cache_read_per_1m: None,
            cache_write_per_1m: None,
        }])
        .expect("table");
        let entry = table.lookup("gpt-4o").expect("priced");
        assert!((entry.rates.input - 5.0e-6).abs() < 1e-15);
        assert_eq!(entry.rates.cache_read, 0.0);
    }

    #[test]
    fn negative_rates_are_rejected() {
        let result = PricingTable::with_overrides(&[PriceInput {
            model: "bad".to_string(),
            input_per_1m: -1.0,
            output_per_1m: 1.0,
            cache_read_per_1m: None,
            cache_write_per_1m: None,
        }]);
        assert!(matches!(result, Err(CostError::InvalidRate { .. })));
    }
}
