use thiserror::Error;

/// Raised by the cost calculator when no rate matches a model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CostError {
    #[error("no pricing available for model {model}")]
    UnknownPricing { model: String },
    #[error("pricing for model {model:?} must use finite non-negative rates")]
    InvalidRate { model: String },
}

/// Raised when a date or date range cannot be used for a ledger query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("malformed date {value:?}, expected YYYY-MM-DD")]
    Malformed { value: String },
    #[error("end date {end} precedes start date {start}")]
    Inverted { start: String, end: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AmountError {
    #[error("amount must be a finite non-negative number, got {0}")]
    Invalid(f64),
    #[error("amount {0} is too large to track")]
    Overflow(f64),
}
