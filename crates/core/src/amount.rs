use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::error::AmountError;

const NANOS_PER_DOLLAR: f64 = 1_000_000_000.0;

/// A non-negative US dollar amount held as whole nanodollars.
///
/// Integer storage keeps accumulation exact: summing the same deltas in any
/// order, or splitting a range in two and adding the halves, always yields
/// the same amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Usd {
    nanos: u64,
}

impl Usd {
    pub const ZERO: Usd = Usd { nanos: 0 };

    pub const fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }

    /// Rounds to the nearest nanodollar.
    pub fn from_dollars(value: f64) -> Result<Self, AmountError> {
        if !value.is_finite() || value < 0.0 {
            return Err(AmountError::Invalid(value));
        }
        let nanos = (value * NANOS_PER_DOLLAR).round();
        if nanos >= u64::MAX as f64 {
            return Err(AmountError::Overflow(value));
        }
        Ok(Self {
            nanos: nanos as u64,
        })
    }

    pub const fn nanos(self) -> u64 {
        self.nanos
    }

    pub fn dollars(self) -> f64 {
        self.nanos as f64 / NANOS_PER_DOLLAR
    }

    pub const fn is_zero(self) -> bool {
        self.nanos == 0
    }

    pub const fn saturating_add(self, other: Usd) -> Usd {
        Usd {
            nanos: self.nanos.saturating_add(other.nanos),
        }
    }

    /// Share of `total` in percent, 0 when `total` is zero.
    pub fn percent_of(self, total: Usd) -> f64 {
        if total.is_zero() {
            return 0.0;
        }
        self.nanos as f64 / total.nanos as f64 * 100.0
    }
}

impl Add for Usd {
    type Output = Usd;

    fn add(self, rhs: Usd) -> Usd {
        self.saturating_add(rhs)
    }
}

impl AddAssign for Usd {
    fn add_assign(&mut self, rhs: Usd) {
        *self = self.saturating_add(rhs);
    }
}

impl Sum for Usd {
    fn sum<I: Iterator<Item = Usd>>(iter: I) -> Usd {
        iter.fold(Usd::ZERO, Usd::saturating_add)
    }
}

impl TryFrom<f64> for Usd {
    type Error = AmountError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Usd::from_dollars(value)
    }
}

impl From<Usd> for f64 {
    fn from(value: Usd) -> f64 {
        value.dollars()
    }
}

impl fmt::Display for Usd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_cost(*self))
    }
}

/// Formats a cost for people: two decimals from one dollar up, four below.
pub fn format_cost(cost: Usd) -> String {
    let dollars = cost.dollars();
    if dollars >= 1.0 {
        format!("${:.2}", dollars)
    } else {
        format!("${:.4}", dollars)
    }
}
